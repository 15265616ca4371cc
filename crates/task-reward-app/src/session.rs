/*
[INPUT]:  TaskGateway handle, wallet account lists, sync and action results
[OUTPUT]: Session state: connected account, published snapshot, view mode
[POS]:    Domain layer - explicit owner of UI-visible state
[UPDATE]: When connection lifecycle or refresh publication rules change
*/

use std::fmt;
use std::sync::Arc;

use task_reward_adapter::{Address, B256, GatewayError, TaskGateway};
use tracing::{debug, info, warn};

use crate::dispatcher::{Action, ActionOutcome, DispatchError, dispatch};
use crate::filter::{ViewMode, filter};
use crate::sync::{Snapshot, SyncError, synchronize};
use crate::task::TaskRecord;

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Connectivity,
    ContractRejection,
    Validation,
    Other,
}

impl NoticeKind {
    pub fn of_gateway(err: &GatewayError) -> Self {
        if err.is_contract_rejection() {
            NoticeKind::ContractRejection
        } else if err.is_connectivity() {
            NoticeKind::Connectivity
        } else {
            NoticeKind::Other
        }
    }

    pub fn of_sync(err: &SyncError) -> Self {
        err.gateway_error()
            .map(NoticeKind::of_gateway)
            .unwrap_or(NoticeKind::Other)
    }

    pub fn of_dispatch(err: &DispatchError) -> Self {
        match err {
            DispatchError::NotConnected => NoticeKind::Connectivity,
            DispatchError::Form(_) => NoticeKind::Validation,
            DispatchError::Gateway(err) => NoticeKind::of_gateway(err),
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, NoticeKind::Info | NoticeKind::Success)
    }

    pub fn prefix(self) -> &'static str {
        match self {
            NoticeKind::Info | NoticeKind::Success => "",
            NoticeKind::Connectivity => "connection problem: ",
            NoticeKind::ContractRejection => "rejected by contract: ",
            NoticeKind::Validation => "invalid input: ",
            NoticeKind::Other => "error: ",
        }
    }
}

/// User-visible status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.message)
    }
}

/// What happened to a finished synchronization.
#[derive(Debug)]
pub enum RefreshOutcome {
    Published { count: usize },
    /// Belonged to an earlier connection; dropped.
    Stale,
    /// Prior snapshot kept.
    Failed(SyncError),
}

impl RefreshOutcome {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            RefreshOutcome::Published { count } => {
                Some(Notice::info(format!("{count} task(s) loaded")))
            }
            RefreshOutcome::Stale => None,
            RefreshOutcome::Failed(err) => Some(Notice::new(
                NoticeKind::of_sync(err),
                format!("refresh failed: {err}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    Disconnected,
    Connected(Address),
}

/// Confirmed action with its follow-up refresh already applied.
#[derive(Debug)]
pub struct ActionReport {
    pub action: &'static str,
    pub tx_hash: B256,
    pub refresh: RefreshOutcome,
}

/// Connected account, published snapshot and view mode.
///
/// Created disconnected; `connect`/`connected` start a connection and
/// `teardown` ends it. Every start or end bumps the epoch so results that
/// were in flight for an earlier connection are discarded.
pub struct Session {
    gateway: Arc<dyn TaskGateway>,
    preferred_account: Option<Address>,
    account: Option<Address>,
    snapshot: Option<Snapshot>,
    view_mode: ViewMode,
    epoch: u64,
}

impl Session {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            preferred_account: None,
            account: None,
            snapshot: None,
            view_mode: ViewMode::All,
            epoch: 0,
        }
    }

    pub fn with_preferred_account(mut self, account: Option<Address>) -> Self {
        self.preferred_account = account;
        self
    }

    pub fn gateway(&self) -> Arc<dyn TaskGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn cycle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.next();
        self.view_mode
    }

    /// Snapshot filtered by the current view mode and account.
    pub fn visible_tasks(&self) -> Vec<&TaskRecord> {
        match &self.snapshot {
            Some(snapshot) => filter(&snapshot.tasks, self.view_mode, self.account),
            None => Vec::new(),
        }
    }

    pub fn task(&self, id: u64) -> Option<&TaskRecord> {
        self.snapshot.as_ref().and_then(|snapshot| snapshot.get(id))
    }

    pub fn require_account(&self) -> Result<Address, DispatchError> {
        self.account.ok_or(DispatchError::NotConnected)
    }

    /// Preferred account when the wallet exposes it, else the first.
    fn choose_account(&self, accounts: &[Address]) -> Option<Address> {
        self.preferred_account
            .filter(|preferred| accounts.contains(preferred))
            .or_else(|| accounts.first().copied())
    }

    /// Apply the wallet's answer to a connect request.
    pub fn connected(&mut self, accounts: &[Address]) -> Option<Address> {
        let chosen = self.choose_account(accounts);
        match chosen {
            Some(account) => {
                self.epoch += 1;
                self.account = Some(account);
                info!(%account, epoch = self.epoch, "wallet connected");
            }
            None => self.teardown(),
        }
        chosen
    }

    /// Request accounts from the wallet, then run the initial synchronization.
    pub async fn connect(&mut self) -> Result<RefreshOutcome, GatewayError> {
        let accounts = self.gateway.request_accounts().await?;
        self.connected(&accounts).ok_or(GatewayError::NoAccounts)?;
        Ok(self.refresh().await)
    }

    /// Wallet reported a new account list. Empty means disconnected.
    pub fn on_accounts_changed(&mut self, accounts: &[Address]) -> AccountChange {
        match self.choose_account(accounts) {
            None => {
                self.teardown();
                AccountChange::Disconnected
            }
            Some(account) => {
                self.epoch += 1;
                self.account = Some(account);
                info!(%account, epoch = self.epoch, "wallet account changed");
                AccountChange::Connected(account)
            }
        }
    }

    /// Drop the account and the snapshot.
    pub fn teardown(&mut self) {
        self.epoch += 1;
        self.account = None;
        self.snapshot = None;
        info!(epoch = self.epoch, "wallet disconnected");
    }

    /// Synchronize now and publish the result.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let epoch = self.epoch;
        let result = synchronize(self.gateway.as_ref()).await;
        self.apply_refresh(epoch, result)
    }

    /// Publish a finished synchronization started during `epoch`.
    ///
    /// The snapshot is replaced wholesale on success; on failure or for a
    /// stale epoch it is left untouched.
    pub fn apply_refresh(
        &mut self,
        epoch: u64,
        result: Result<Vec<TaskRecord>, SyncError>,
    ) -> RefreshOutcome {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding stale refresh");
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(tasks) => {
                let count = tasks.len();
                self.snapshot = Some(Snapshot::new(tasks));
                debug!(count, "snapshot published");
                RefreshOutcome::Published { count }
            }
            Err(err) => {
                warn!(error = %err, "refresh failed; keeping previous snapshot");
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// Publish a confirmed action's follow-up refresh.
    pub fn apply_action(&mut self, epoch: u64, outcome: ActionOutcome) -> ActionReport {
        let ActionOutcome {
            action,
            tx_hash,
            refresh,
            ..
        } = outcome;
        ActionReport {
            action,
            tx_hash,
            refresh: self.apply_refresh(epoch, refresh),
        }
    }

    /// Run `action` from the connected account and publish the refresh.
    pub async fn dispatch(&mut self, action: &Action) -> Result<ActionReport, DispatchError> {
        let from = self.require_account()?;
        let epoch = self.epoch;
        let outcome = dispatch(self.gateway.as_ref(), from, action).await?;
        Ok(self.apply_action(epoch, outcome))
    }
}
