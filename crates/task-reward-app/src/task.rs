/*
[INPUT]:  Positional task tuples from the gateway, connected account, wall clock
[OUTPUT]: TaskRecord view-model, expiry and action eligibility, display helpers
[POS]:    Domain layer - task decoding and per-task derived state
[UPDATE]: When the task tuple layout or eligibility rules change
*/

use chrono::{DateTime, Local, Utc};
use task_reward_adapter::{Address, RawTask, TaskStatus, U256, format_ether};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("task id must be positive")]
    ZeroId,

    #[error("task {id}: unknown status {status}")]
    UnknownStatus { id: u64, status: u8 },

    #[error("task {id}: deadline {deadline} does not fit in 64 bits")]
    DeadlineOutOfRange { id: u64, deadline: U256 },
}

/// Decoded view of one on-chain task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// 1-based id assigned by the contract
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,
    /// Escrowed reward in wei; any `uint256` is representable
    pub reward_wei: U256,
    /// Unix seconds; `None` when the contract stored 0
    pub deadline: Option<u64>,
    pub status: TaskStatus,
    /// `None` until someone takes the task
    pub solver: Option<Address>,
}

impl TaskRecord {
    /// Decode the positional tuple fetched for `id`.
    pub fn decode(id: u64, raw: RawTask) -> Result<Self, DecodeError> {
        if id == 0 {
            return Err(DecodeError::ZeroId);
        }
        let RawTask(creator, title, description, reward_wei, deadline, status, solver) = raw;

        let status =
            TaskStatus::try_from(status).map_err(|status| DecodeError::UnknownStatus { id, status })?;
        let deadline = u64::try_from(deadline)
            .map_err(|_| DecodeError::DeadlineOutOfRange { id, deadline })?;

        Ok(Self {
            id,
            creator,
            title,
            description,
            reward_wei,
            deadline: (deadline != 0).then_some(deadline),
            status,
            solver: (!solver.is_zero()).then_some(solver),
        })
    }

    /// Re-encode into the contract's tuple layout.
    pub fn to_raw(&self) -> RawTask {
        RawTask(
            self.creator,
            self.title.clone(),
            self.description.clone(),
            self.reward_wei,
            U256::from(self.deadline.unwrap_or(0)),
            self.status.as_u8(),
            self.solver.unwrap_or(Address::ZERO),
        )
    }

    /// Expired when no deadline is recorded or the deadline has passed.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.deadline {
            None => true,
            Some(deadline) => deadline < now,
        }
    }

    /// Badge only matters while the task can still change state.
    pub fn shows_expired_badge(&self, now: u64) -> bool {
        self.status.is_active() && self.is_expired_at(now)
    }

    pub fn is_created_by(&self, account: Address) -> bool {
        self.creator == account
    }

    pub fn is_taken_by(&self, account: Address) -> bool {
        self.solver == Some(account)
    }

    pub fn can_take(&self, account: Option<Address>, now: u64) -> bool {
        account.is_some_and(|account| {
            self.status == TaskStatus::Open
                && !self.is_expired_at(now)
                && !self.is_created_by(account)
        })
    }

    pub fn can_submit(&self, account: Option<Address>) -> bool {
        account.is_some_and(|account| {
            self.status == TaskStatus::InProgress && self.is_taken_by(account)
        })
    }

    pub fn can_cancel(&self, account: Option<Address>) -> bool {
        account.is_some_and(|account| {
            self.status == TaskStatus::Open && self.is_created_by(account)
        })
    }

    /// Actions to offer for this task, in display order.
    pub fn available_actions(&self, account: Option<Address>, now: u64) -> Vec<TaskAction> {
        let mut actions = Vec::new();
        if self.can_take(account, now) {
            actions.push(TaskAction::Take);
        }
        if self.can_submit(account) {
            actions.push(TaskAction::Submit);
        }
        if self.can_cancel(account) {
            actions.push(TaskAction::Cancel);
        }
        actions
    }

    pub fn is_eligible(&self, action: TaskAction, account: Option<Address>, now: u64) -> bool {
        match action {
            TaskAction::Take => self.can_take(account, now),
            TaskAction::Submit => self.can_submit(account),
            TaskAction::Cancel => self.can_cancel(account),
        }
    }

    pub fn reward_label(&self) -> String {
        format!("{} ETH", format_ether(self.reward_wei))
    }

    pub fn solver_label(&self) -> String {
        self.solver
            .map(short_address)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn deadline_label(&self) -> String {
        self.deadline
            .map(format_timestamp)
            .unwrap_or_else(|| "none".to_string())
    }

    pub fn status_label(&self, now: u64) -> String {
        if self.shows_expired_badge(now) {
            format!("{} (expired)", self.status.label())
        } else {
            self.status.label().to_string()
        }
    }
}

/// Per-task actions gated by eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    Take,
    Submit,
    Cancel,
}

impl TaskAction {
    pub fn label(self) -> &'static str {
        match self {
            TaskAction::Take => "Take",
            TaskAction::Submit => "Submit",
            TaskAction::Cancel => "Cancel",
        }
    }
}

/// `0x1234...abcd`
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Local date-time of a unix timestamp
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| format!("@{secs}"))
}

pub fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
