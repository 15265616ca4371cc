/*
[INPUT]:  AppConfig, log buffer, crossterm input, wallet account events
[OUTPUT]: Ratatui-based TUI run loop, rendering, and log buffer utilities
[POS]:    TUI runtime loop and shared helpers
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

use task_reward_adapter::TaskGateway;
use task_reward_app::session::NoticeKind;
use task_reward_app::{AccountWatcher, AppConfig, Session, WalletEvent};

use super::app::{ActiveModal, AppState, OpResult, PendingOp, Tab};
use super::events::handle_key_event;
use super::terminal::TerminalGuard;
use super::ui::modal::draw_modal;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const LOG_BUFFER_CAPACITY: usize = 2000;

pub type LogBufferHandle = Arc<StdMutex<LogBuffer>>;

#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(start).cloned().collect()
    }
}

#[derive(Clone)]
pub struct LogWriterFactory {
    buffer: LogBufferHandle,
}

impl LogWriterFactory {
    pub fn new(buffer: LogBufferHandle) -> Self {
        Self { buffer }
    }
}

pub struct LogWriter {
    buffer: LogBufferHandle,
    partial: String,
}

impl LogWriter {
    fn push(&self, line: String) {
        let mut guard = self.buffer.lock().expect("log buffer lock");
        guard.push_line(line);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let rest = self.partial.split_off(pos + 1);
            let line = std::mem::replace(&mut self.partial, rest);
            self.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push(line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

enum UiEvent {
    Input(CrosstermEvent),
}

enum LoopEvent {
    Tick,
    Ui(UiEvent),
    Wallet(WalletEvent),
    Completed(OpResult),
}

/// Resolves when the in-flight operation finishes; never resolves when idle.
async fn next_completion(pending: &mut Option<PendingOp>) -> OpResult {
    match pending {
        Some(op) => {
            let result = (&mut op.future).await;
            *pending = None;
            result
        }
        None => std::future::pending().await,
    }
}

pub async fn run_tui_with_log(config: AppConfig, log_buffer: LogBufferHandle) -> Result<()> {
    let gateway: Arc<dyn TaskGateway> = Arc::new(config.build_contract()?);
    let session =
        Session::new(gateway.clone()).with_preferred_account(config.preferred_account()?);

    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let input_shutdown = shutdown.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = event_tx.send(UiEvent::Input(event));
                }
            }
        }
    });

    let (wallet_tx, mut wallet_rx) = mpsc::unbounded_channel();
    let watcher = AccountWatcher::new(gateway, config.account_poll_interval())
        .spawn(wallet_tx, shutdown.clone());

    let mut app = AppState::new(session, log_buffer, config.refresh_interval());
    app.start_connect();
    info!(rpc_url = %config.rpc_url, "tui started");

    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        let event = tokio::select! {
            _ = tick.tick() => LoopEvent::Tick,
            Some(event) = event_rx.recv() => LoopEvent::Ui(event),
            Some(event) = wallet_rx.recv() => LoopEvent::Wallet(event),
            result = next_completion(&mut app.pending) => LoopEvent::Completed(result),
        };

        match event {
            LoopEvent::Tick => app.on_tick(),
            LoopEvent::Ui(UiEvent::Input(CrosstermEvent::Key(key))) => {
                if key.kind == KeyEventKind::Press && handle_key_event(&mut app, key.code) {
                    should_quit = true;
                }
            }
            LoopEvent::Ui(_) => {}
            LoopEvent::Wallet(event) => app.on_wallet_event(event),
            LoopEvent::Completed(result) => app.apply_result(result),
        }

        terminal.draw(|frame| draw_ui(frame, &mut app))?;
    }

    shutdown.cancel();
    let _ = watcher.await;
    Ok(())
}

pub(super) fn draw_footer(frame: &mut ratatui::Frame, area: ratatui::layout::Rect, app: &AppState) {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let line1 = Line::from(vec![
        Span::styled("[Up/Down]", key_style),
        Span::raw(" Select  "),
        Span::styled("[Tab/1/2]", key_style),
        Span::raw(" Tabs  "),
        Span::styled("[v]", key_style),
        Span::raw(" View  "),
        Span::styled("[n]", key_style),
        Span::raw(" New task  "),
        Span::styled("[r]", key_style),
        Span::raw(" Refresh  "),
        Span::styled("[q]", key_style),
        Span::raw(" Quit"),
    ]);
    let line2 = Line::from(vec![
        Span::styled("[t]", key_style),
        Span::raw(" Take  "),
        Span::styled("[s]", key_style),
        Span::raw(" Submit  "),
        Span::styled("[x]", key_style),
        Span::raw(" Cancel  "),
        Span::styled(
            format!("{}{}", app.notice.kind.prefix(), app.notice.message),
            notice_style(app.notice.kind),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let text = Text::from(vec![line1, line2]);
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => Style::default(),
        NoticeKind::Success => Style::default().fg(Color::Green),
        NoticeKind::Validation => Style::default().fg(Color::Yellow),
        NoticeKind::Connectivity | NoticeKind::ContractRejection | NoticeKind::Other => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
    }
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    draw_header(frame, layout[0], app);
    draw_tabs(frame, layout[2], app.current_tab);

    match app.current_tab {
        Tab::Tasks => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(layout[1]);
            draw_task_list(frame, body[0], app);
            draw_task_detail(frame, body[1], app);
        }
        Tab::Logs => {
            draw_logs(frame, layout[1], &app.log_buffer);
        }
    }

    draw_footer(frame, layout[3], app);

    if let Some(ActiveModal::CreateTask(modal)) = app.active_modal.as_ref() {
        let modal_area = centered_rect(area, 60, 50);
        draw_modal(frame, modal_area, &modal.to_modal());
    }
}

fn centered_rect(
    area: ratatui::layout::Rect,
    percent_x: u16,
    percent_y: u16,
) -> ratatui::layout::Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_buffer_drops_oldest_line() {
        let mut buffer = LogBuffer::new(2);
        buffer.push_line("a".into());
        buffer.push_line("b".into());
        buffer.push_line("c".into());
        assert_eq!(buffer.tail(10), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_default_log_buffer_holds_capacity_lines() {
        let mut buffer = crate::tui::LogBuffer::new(crate::tui::LOG_BUFFER_CAPACITY);
        for i in 0..=LOG_BUFFER_CAPACITY {
            buffer.push_line(i.to_string());
        }
        let lines = buffer.tail(usize::MAX);
        assert_eq!(lines.len(), LOG_BUFFER_CAPACITY);
        assert_eq!(lines[0], "1");
    }

    #[test]
    fn test_log_writer_splits_lines_and_flushes_partial() {
        let handle: LogBufferHandle = Arc::new(StdMutex::new(LogBuffer::new(8)));
        let factory = LogWriterFactory::new(handle.clone());
        {
            let mut writer = factory.make_writer();
            writer.write_all(b"first\r\nsec").expect("write");
            writer.write_all(b"ond\nthird").expect("write");
        }
        let lines = handle.lock().expect("lock").tail(8);
        assert_eq!(lines, vec!["first", "second", "third"]);
    }
}
