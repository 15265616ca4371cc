/*
[INPUT]:  Create-task form input or a task id, connected account, TaskGateway
[OUTPUT]: Confirmed transaction plus the follow-up resynchronization result
[POS]:    Domain layer - state-changing actions (invalidate-and-refetch)
[UPDATE]: When contract actions or form fields change
*/

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use task_reward_adapter::{
    Address, B256, GatewayError, NewTaskRequest, TaskGateway, TransactionReceipt, UnitsError,
    parse_ether,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::sync::{SyncError, synchronize};
use crate::task::{TaskAction, TaskRecord};

const LOCAL_DEADLINE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("title is required")]
    EmptyTitle,

    #[error("reward is required")]
    EmptyReward,

    #[error("invalid reward: {0}")]
    InvalidReward(#[from] UnitsError),

    #[error("deadline is required")]
    EmptyDeadline,

    #[error("invalid deadline {0:?} (use YYYY-MM-DD HH:MM, RFC 3339 or unix seconds)")]
    InvalidDeadline(String),

    #[error("deadline {0:?} is before 1970")]
    DeadlineOutOfRange(String),
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("wallet not connected")]
    NotConnected,

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Raw text of the create-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskForm {
    pub title: String,
    pub reward: String,
    pub description: String,
    pub deadline: String,
}

impl CreateTaskForm {
    /// Validate and convert to contract arguments.
    ///
    /// Past deadlines are accepted; only a warning is logged.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewTaskRequest, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        if self.reward.trim().is_empty() {
            return Err(FormError::EmptyReward);
        }
        let reward_wei = parse_ether(&self.reward)?;
        let deadline = parse_deadline(&self.deadline)?;

        if i64::try_from(deadline).is_ok_and(|deadline| deadline < now.timestamp()) {
            warn!(deadline, "creating task with a deadline in the past");
        }

        Ok(NewTaskRequest {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            deadline,
            reward_wei,
        })
    }
}

/// Parse a deadline as unix seconds, RFC 3339, or a local date-time.
pub fn parse_deadline(input: &str) -> Result<u64, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormError::EmptyDeadline);
    }
    if input.chars().all(|ch| ch.is_ascii_digit()) {
        return input
            .parse::<u64>()
            .map_err(|_| FormError::InvalidDeadline(input.to_string()));
    }

    let timestamp = if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        parsed.timestamp()
    } else {
        let naive = LOCAL_DEADLINE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .ok_or_else(|| FormError::InvalidDeadline(input.to_string()))?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| FormError::InvalidDeadline(input.to_string()))?
            .timestamp()
    };
    u64::try_from(timestamp).map_err(|_| FormError::DeadlineOutOfRange(input.to_string()))
}

/// A state-changing request against the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create(NewTaskRequest),
    Take(u64),
    Submit(u64),
    Cancel(u64),
}

impl Action {
    pub fn for_task(action: TaskAction, id: u64) -> Self {
        match action {
            TaskAction::Take => Action::Take(id),
            TaskAction::Submit => Action::Submit(id),
            TaskAction::Cancel => Action::Cancel(id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Create(_) => "create",
            Action::Take(_) => "take",
            Action::Submit(_) => "submit",
            Action::Cancel(_) => "cancel",
        }
    }

    pub fn task_id(&self) -> Option<u64> {
        match self {
            Action::Create(_) => None,
            Action::Take(id) | Action::Submit(id) | Action::Cancel(id) => Some(*id),
        }
    }
}

/// A confirmed action. `refresh` is the follow-up resynchronization, which
/// can fail independently of the action itself.
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: &'static str,
    pub tx_hash: B256,
    pub receipt: TransactionReceipt,
    pub refresh: Result<Vec<TaskRecord>, SyncError>,
}

/// Send `action` from `from`, wait for confirmation, then resynchronize.
///
/// Any failure before confirmation returns an error and skips the refresh.
pub async fn dispatch<G>(
    gateway: &G,
    from: Address,
    action: &Action,
) -> Result<ActionOutcome, DispatchError>
where
    G: TaskGateway + ?Sized,
{
    let tx_hash = match action {
        Action::Create(request) => gateway.create_task(from, request).await?,
        Action::Take(id) => gateway.take_task(from, *id).await?,
        Action::Submit(id) => gateway.submit_task(from, *id).await?,
        Action::Cancel(id) => gateway.cancel_task(from, *id).await?,
    };
    info!(action = action.name(), task_id = ?action.task_id(), %tx_hash, "awaiting confirmation");

    let receipt = gateway.wait_for_confirmation(tx_hash).await?;
    info!(action = action.name(), %tx_hash, block = ?receipt.block_number, "transaction confirmed");

    let refresh = synchronize(gateway).await;
    if let Err(err) = &refresh {
        warn!(action = action.name(), error = %err, "refresh after action failed");
    }

    Ok(ActionOutcome {
        action: action.name(),
        tx_hash,
        receipt,
        refresh,
    })
}
