/*
[INPUT]:  Session over the contract gateway, wallet events, log buffer
[OUTPUT]: Ratatui-based TUI for browsing tasks and running task actions
[POS]:    TUI module for the task-reward binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory, run_tui_with_log};
