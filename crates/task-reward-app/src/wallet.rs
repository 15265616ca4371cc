/*
[INPUT]:  TaskGateway account queries, poll interval, shutdown token
[OUTPUT]: AccountsChanged events whenever the wallet's account list changes
[POS]:    Wallet layer - accounts-changed notifications over plain HTTP
[UPDATE]: When the node gains push subscriptions or events are added
*/

use std::sync::Arc;
use std::time::Duration;

use task_reward_adapter::{Address, TaskGateway};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// New account list; empty means the wallet disconnected.
    AccountsChanged(Vec<Address>),
}

/// Polls `eth_accounts` and reports changes.
pub struct AccountWatcher {
    gateway: Arc<dyn TaskGateway>,
    interval: Duration,
    last_seen: Option<Vec<Address>>,
}

impl AccountWatcher {
    pub fn new(gateway: Arc<dyn TaskGateway>, interval: Duration) -> Self {
        Self {
            gateway,
            interval,
            last_seen: None,
        }
    }

    /// Treat `accounts` as already observed.
    pub fn with_baseline(mut self, accounts: Vec<Address>) -> Self {
        self.last_seen = Some(accounts);
        self
    }

    /// One poll. The first successful poll without a baseline only records it.
    pub async fn poll_once(&mut self) -> Option<WalletEvent> {
        let accounts = match self.gateway.accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(error = %err, "account poll failed");
                return None;
            }
        };

        match self.last_seen.replace(accounts.clone()) {
            None => None,
            Some(previous) if previous == accounts => None,
            Some(_) => {
                debug!(count = accounts.len(), "wallet accounts changed");
                Some(WalletEvent::AccountsChanged(accounts))
            }
        }
    }

    /// Poll until `shutdown` fires or the receiver goes away.
    pub async fn run(mut self, events: mpsc::UnboundedSender<WalletEvent>, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Some(event) = self.poll_once().await {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                }
            }
        }
        debug!("account watcher stopped");
    }

    pub fn spawn(
        self,
        events: mpsc::UnboundedSender<WalletEvent>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(events, shutdown))
    }
}
