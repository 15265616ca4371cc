/*
[INPUT]:  Contract enum encodings (uint8 on the wire)
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for node communication
[UPDATE]: When the contract adds task states
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Task lifecycle state as stored by the contract.
///
/// Valid transitions are Open -> InProgress -> Completed and Open -> Cancelled.
/// The contract enforces them; this crate only decodes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskStatus {
    Open = 0,
    InProgress = 1,
    Completed = 2,
    Cancelled = 3,
}

impl TaskStatus {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }

    /// Open and InProgress tasks can still change state.
    pub fn is_active(self) -> bool {
        matches!(self, TaskStatus::Open | TaskStatus::InProgress)
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskStatus::Open),
            1 => Ok(TaskStatus::InProgress),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Cancelled),
            other => Err(other),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire_value() {
        assert_eq!(TaskStatus::try_from(0), Ok(TaskStatus::Open));
        assert_eq!(TaskStatus::try_from(3), Ok(TaskStatus::Cancelled));
        assert_eq!(TaskStatus::try_from(4), Err(4));
    }

    #[test]
    fn test_status_wire_value_roundtrip() {
        for status in [
            TaskStatus::Open,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStatus::try_from(status.as_u8()), Ok(status));
        }
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
