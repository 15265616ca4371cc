/*
[INPUT]:  Public API exports for task-reward-app crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod dispatcher;
pub mod filter;
pub mod session;
pub mod sync;
pub mod task;
pub mod wallet;

// Re-export main types for convenience
pub use config::AppConfig;
pub use dispatcher::{Action, ActionOutcome, CreateTaskForm, DispatchError, dispatch};
pub use filter::{ViewMode, filter};
pub use session::{AccountChange, ActionReport, Notice, NoticeKind, RefreshOutcome, Session};
pub use sync::{Snapshot, SyncError, synchronize};
pub use task::{DecodeError, TaskAction, TaskRecord};
pub use wallet::{AccountWatcher, WalletEvent};
