/*
[INPUT]:  Session, log buffer, completed operations, wallet events
[OUTPUT]: AppState driving rendering and the single in-flight operation
[POS]:    TUI app state and operation management
[UPDATE]: When adding operations, tabs, or modals
*/

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use chrono::Utc;
use ratatui::widgets::ListState;
use task_reward_adapter::{Address, GatewayError};
use tracing::{info, warn};

use task_reward_app::session::{AccountChange, Notice, NoticeKind};
use task_reward_app::task::{short_address, unix_now};
use task_reward_app::{
    Action, ActionOutcome, DispatchError, Session, SyncError, TaskAction, TaskRecord, WalletEvent,
    dispatch, synchronize,
};

use crate::tui::LogBufferHandle;
use crate::tui::ui::modal::CreateTaskModal;

pub(super) enum ActiveModal {
    CreateTask(CreateTaskModal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Tasks,
    Logs,
}

/// Result of an in-flight operation, applied to the session by the loop.
pub(super) enum OpResult {
    Connected(Result<Vec<Address>, GatewayError>),
    Refreshed {
        epoch: u64,
        result: Result<Vec<TaskRecord>, SyncError>,
    },
    Action {
        epoch: u64,
        result: Result<ActionOutcome, DispatchError>,
    },
}

pub(super) struct PendingOp {
    pub(super) label: String,
    pub(super) started: Instant,
    pub(super) future: Pin<Box<dyn Future<Output = OpResult>>>,
}

pub(super) struct AppState {
    pub(super) session: Session,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) list_state: ListState,
    pub(super) current_tab: Tab,
    pub(super) notice: Notice,
    pub(super) active_modal: Option<ActiveModal>,
    pub(super) pending: Option<PendingOp>,
    refresh_interval: Option<Duration>,
    last_refresh: Instant,
    refresh_queued: bool,
}

impl AppState {
    pub(super) fn new(
        session: Session,
        log_buffer: LogBufferHandle,
        refresh_interval: Option<Duration>,
    ) -> Self {
        Self {
            session,
            log_buffer,
            list_state: ListState::default(),
            current_tab: Tab::Tasks,
            notice: Notice::info("Connecting to wallet..."),
            active_modal: None,
            pending: None,
            refresh_interval,
            last_refresh: Instant::now(),
            refresh_queued: false,
        }
    }

    pub(super) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn begin(&mut self, label: impl Into<String>, future: impl Future<Output = OpResult> + 'static) {
        self.pending = Some(PendingOp {
            label: label.into(),
            started: Instant::now(),
            future: Box::pin(future),
        });
    }

    fn refuse_busy(&mut self) {
        let label = self
            .pending
            .as_ref()
            .map(|op| op.label.clone())
            .unwrap_or_default();
        self.notice = Notice::info(format!("busy: {label} in progress"));
    }

    pub(super) fn start_connect(&mut self) {
        if self.is_busy() {
            self.refuse_busy();
            return;
        }
        let gateway = self.session.gateway();
        self.begin("connecting", async move {
            OpResult::Connected(gateway.request_accounts().await)
        });
    }

    /// Returns false when another operation is still running.
    pub(super) fn start_refresh(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        let gateway = self.session.gateway();
        let epoch = self.session.epoch();
        self.refresh_queued = false;
        self.last_refresh = Instant::now();
        self.begin("refreshing", async move {
            let result = synchronize(gateway.as_ref()).await;
            OpResult::Refreshed { epoch, result }
        });
        true
    }

    pub(super) fn request_refresh(&mut self) {
        if !self.session.is_connected() {
            self.start_connect();
        } else if !self.start_refresh() {
            self.refuse_busy();
        }
    }

    pub(super) fn start_action(&mut self, action: Action) {
        if self.is_busy() {
            self.refuse_busy();
            return;
        }
        let from = match self.session.require_account() {
            Ok(from) => from,
            Err(err) => {
                self.notice = Notice::new(NoticeKind::of_dispatch(&err), err.to_string());
                return;
            }
        };
        let gateway = self.session.gateway();
        let epoch = self.session.epoch();
        let label = match action.task_id() {
            Some(id) => format!("{} #{id}", action.name()),
            None => action.name().to_string(),
        };
        self.notice = Notice::info(format!("{label}: waiting for confirmation..."));
        self.begin(label, async move {
            let result = dispatch(gateway.as_ref(), from, &action).await;
            OpResult::Action { epoch, result }
        });
    }

    /// Run `action` on the selected task if it is currently offered.
    pub(super) fn start_task_action(&mut self, action: TaskAction) {
        let Some(task) = self.selected_task() else {
            self.notice = Notice::info("no task selected");
            return;
        };
        let id = task.id;
        if !task.is_eligible(action, self.session.account(), unix_now()) {
            self.notice = Notice::new(
                NoticeKind::Validation,
                format!("{} is not available for task #{id}", action.label()),
            );
            return;
        }
        self.start_action(Action::for_task(action, id));
    }

    pub(super) fn submit_create_task(&mut self) {
        let Some(ActiveModal::CreateTask(modal)) = self.active_modal.as_ref() else {
            return;
        };
        let validated = modal.form().validate(Utc::now());
        match validated {
            Ok(request) => self.start_action(Action::Create(request)),
            Err(err) => self.notice = Notice::new(NoticeKind::Validation, err.to_string()),
        }
    }

    pub(super) fn apply_result(&mut self, result: OpResult) {
        match result {
            OpResult::Connected(Ok(accounts)) => match self.session.connected(&accounts) {
                Some(account) => {
                    self.notice = Notice::success(format!("connected as {}", short_address(account)));
                    self.start_refresh();
                }
                None => {
                    self.notice = Notice::new(NoticeKind::Connectivity, "wallet exposes no accounts");
                }
            },
            OpResult::Connected(Err(err)) => {
                warn!(error = %err, "wallet connection failed");
                self.notice = Notice::new(NoticeKind::of_gateway(&err), format!("connect failed: {err}"));
            }
            OpResult::Refreshed { epoch, result } => {
                let outcome = self.session.apply_refresh(epoch, result);
                if let Some(notice) = outcome.notice() {
                    self.notice = notice;
                }
                self.clamp_selection();
            }
            OpResult::Action { epoch, result } => match result {
                Ok(outcome) => {
                    let report = self.session.apply_action(epoch, outcome);
                    info!(action = report.action, tx_hash = %report.tx_hash, "action confirmed");
                    if report.action == "create" {
                        self.close_modal();
                    }
                    self.notice = match report.refresh.notice() {
                        Some(refresh) if refresh.kind.is_error() => Notice::new(
                            refresh.kind,
                            format!("{} confirmed, but {}", report.action, refresh.message),
                        ),
                        _ => Notice::success(format!("{} confirmed", report.action)),
                    };
                    self.last_refresh = Instant::now();
                    self.clamp_selection();
                }
                Err(err) => {
                    warn!(error = %err, "action failed");
                    self.notice = Notice::new(NoticeKind::of_dispatch(&err), err.to_string());
                }
            },
        }
    }

    pub(super) fn on_wallet_event(&mut self, event: WalletEvent) {
        let WalletEvent::AccountsChanged(accounts) = event;
        match self.session.on_accounts_changed(&accounts) {
            AccountChange::Disconnected => {
                self.notice = Notice::new(NoticeKind::Connectivity, "wallet disconnected");
                self.list_state.select(None);
            }
            AccountChange::Connected(account) => {
                self.notice = Notice::info(format!("account changed to {}", short_address(account)));
                if !self.start_refresh() {
                    self.refresh_queued = true;
                }
            }
        }
    }

    pub(super) fn on_tick(&mut self) {
        if self.is_busy() || !self.session.is_connected() {
            return;
        }
        let periodic_due = self
            .refresh_interval
            .is_some_and(|interval| self.last_refresh.elapsed() >= interval);
        if self.refresh_queued || periodic_due {
            self.start_refresh();
        }
    }

    pub(super) fn visible_tasks(&self) -> Vec<&TaskRecord> {
        self.session.visible_tasks()
    }

    pub(super) fn selected_task(&self) -> Option<&TaskRecord> {
        let index = self.list_state.selected()?;
        self.visible_tasks().get(index).copied()
    }

    pub(super) fn move_selection(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, (len - 1) as isize) as usize;
        self.list_state.select(Some(next));
    }

    pub(super) fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
            Some(selected) if selected >= len => self.list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    pub(super) fn cycle_view_mode(&mut self) {
        let mode = self.session.cycle_view_mode();
        self.list_state.select(None);
        self.clamp_selection();
        self.notice = Notice::info(format!("view: {}", mode.label()));
    }

    pub(super) fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub(super) fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Tasks => Tab::Logs,
            Tab::Logs => Tab::Tasks,
        };
    }

    pub(super) fn open_create_task(&mut self) {
        if !self.session.is_connected() {
            self.notice = Notice::new(NoticeKind::Connectivity, "connect a wallet first");
            return;
        }
        self.active_modal = Some(ActiveModal::CreateTask(CreateTaskModal::new()));
    }

    pub(super) fn active_modal_mut(&mut self) -> Option<&mut ActiveModal> {
        self.active_modal.as_mut()
    }

    pub(super) fn close_modal(&mut self) {
        self.active_modal = None;
    }
}
