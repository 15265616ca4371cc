/*
[INPUT]:  TaskGateway (count + per-id reads)
[OUTPUT]: Complete, id-descending task snapshot or a single failure
[POS]:    Domain layer - read-after-write resynchronization
[UPDATE]: When the read protocol or snapshot ordering changes
*/

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use task_reward_adapter::{GatewayError, TaskGateway, U256};
use thiserror::Error;
use tracing::debug;

use crate::task::{DecodeError, TaskRecord};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("read task count failed: {0}")]
    Count(#[source] GatewayError),

    #[error("task count {0} out of range")]
    CountOutOfRange(U256),

    #[error("read task {id} failed: {source}")]
    Read {
        id: u64,
        #[source]
        source: GatewayError,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl SyncError {
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            SyncError::Count(source) | SyncError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Published, point-in-time task list.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tasks: Vec<TaskRecord>,
    pub synced_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            tasks,
            synced_at: Utc::now(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Fetch every task and return them sorted by id, newest first.
///
/// All record reads are issued together and awaited as a unit; the first
/// failure fails the whole call.
pub async fn synchronize<G>(gateway: &G) -> Result<Vec<TaskRecord>, SyncError>
where
    G: TaskGateway + ?Sized,
{
    let count = gateway.task_count().await.map_err(SyncError::Count)?;
    let count = u64::try_from(count).map_err(|_| SyncError::CountOutOfRange(count))?;
    if count == 0 {
        debug!("no tasks on contract");
        return Ok(Vec::new());
    }

    let reads = (1..=count).map(|id| async move {
        let raw = gateway
            .task(id)
            .await
            .map_err(|source| SyncError::Read { id, source })?;
        Ok::<_, SyncError>(TaskRecord::decode(id, raw)?)
    });
    let mut tasks = try_join_all(reads).await?;
    tasks.sort_by(|a, b| b.id.cmp(&a.id));

    debug!(count, "tasks synchronized");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use task_reward_adapter::{Address, MockTaskGateway, RawTask};

    fn seeded(n: u64) -> MockTaskGateway {
        let creator = Address::repeat_byte(0x11);
        let tasks = (1..=n)
            .map(|i| {
                RawTask(
                    creator,
                    format!("task {i}"),
                    String::new(),
                    U256::from(i),
                    U256::from(4_102_444_800u64),
                    (i % 4) as u8,
                    Address::ZERO,
                )
            })
            .collect();
        MockTaskGateway::new(vec![creator]).with_tasks(tasks)
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    #[case(40)]
    #[tokio::test]
    async fn test_reads_each_record_once_sorted_descending(#[case] n: u64) {
        let gateway = seeded(n);

        let tasks = synchronize(&gateway).await.unwrap();

        assert_eq!(gateway.count_reads(), 1);
        assert_eq!(gateway.task_reads(), n as usize);
        assert_eq!(tasks.len(), n as usize);
        let ids: Vec<u64> = tasks.iter().map(|task| task.id).collect();
        let expected: Vec<u64> = (1..=n).rev().collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_reads_are_issued_concurrently() {
        let gateway = seeded(5);

        synchronize(&gateway).await.unwrap();

        assert_eq!(gateway.max_in_flight(), 5);
    }

    #[tokio::test]
    async fn test_any_failed_read_fails_the_whole_sync() {
        let gateway = seeded(3);
        gateway.fail_task_read(2);

        let err = synchronize(&gateway).await.unwrap_err();
        assert!(matches!(err, SyncError::Read { id: 2, .. }));
    }

    #[tokio::test]
    async fn test_count_failure_skips_record_reads() {
        let gateway = seeded(3);
        gateway.fail_count_read();

        let err = synchronize(&gateway).await.unwrap_err();
        assert!(matches!(err, SyncError::Count(_)));
        assert_eq!(gateway.task_reads(), 0);
    }

    #[tokio::test]
    async fn test_large_reward_does_not_block_listing() {
        let gateway = seeded(2);
        let mut tasks = gateway.tasks();
        tasks[1].3 = U256::from(1u64) << 100;
        gateway.set_tasks(tasks);

        let tasks = synchronize(&gateway).await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 2);
        assert_eq!(tasks[0].reward_wei, U256::from(1u64) << 100);
    }

    #[tokio::test]
    async fn test_malformed_record_fails_sync() {
        let gateway = seeded(2);
        let mut tasks = gateway.tasks();
        tasks[0].5 = 9;
        gateway.set_tasks(tasks);

        let err = synchronize(&gateway).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Decode(DecodeError::UnknownStatus { id: 1, status: 9 })
        ));
    }
}
