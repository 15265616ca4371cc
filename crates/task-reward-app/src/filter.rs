/*
[INPUT]:  Snapshot task list, view mode, connected account
[OUTPUT]: Order-preserving subsequence for display
[POS]:    Domain layer - identity-aware view filtering
[UPDATE]: When adding view modes
*/

use std::fmt;
use std::str::FromStr;

use task_reward_adapter::Address;
use thiserror::Error;

use crate::task::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    All,
    CreatedByMe,
    TakenByMe,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::All, ViewMode::CreatedByMe, ViewMode::TakenByMe];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::CreatedByMe => "created-by-me",
            ViewMode::TakenByMe => "taken-by-me",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::All => "All Tasks",
            ViewMode::CreatedByMe => "Created by Me",
            ViewMode::TakenByMe => "Taken by Me",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::All => ViewMode::CreatedByMe,
            ViewMode::CreatedByMe => ViewMode::TakenByMe,
            ViewMode::TakenByMe => ViewMode::All,
        }
    }

    fn matches(self, task: &TaskRecord, account: Address) -> bool {
        match self {
            ViewMode::All => true,
            ViewMode::CreatedByMe => task.is_created_by(account),
            ViewMode::TakenByMe => task.is_taken_by(account),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown view mode {0:?} (expected all, created-by-me or taken-by-me)")]
pub struct ParseViewModeError(String);

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseViewModeError(s.to_string()))
    }
}

/// Select the tasks visible under `mode` for `account`.
///
/// Without an account every mode shows the whole snapshot. Addresses compare
/// as bytes, so textual casing never matters.
pub fn filter<'a, I>(tasks: I, mode: ViewMode, account: Option<Address>) -> Vec<&'a TaskRecord>
where
    I: IntoIterator<Item = &'a TaskRecord>,
{
    match account {
        None => tasks.into_iter().collect(),
        Some(account) => tasks
            .into_iter()
            .filter(|task| mode.matches(task, account))
            .collect(),
    }
}
