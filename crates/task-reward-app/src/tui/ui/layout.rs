/*
[INPUT]:  Current tab, session identity, pending operation
[OUTPUT]: Tab bar and status header
[POS]:    TUI UI layout chrome
[UPDATE]: When adding tabs or header fields
*/

use chrono::Local;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use task_reward_app::task::short_address;

use crate::tui::app::{AppState, Tab};
use crate::tui::runtime::{border_style, header_style};

pub(in crate::tui) fn draw_tabs(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    current_tab: Tab,
) {
    let titles = vec![Line::from("Tasks"), Line::from("Logs")];
    let selected = match current_tab {
        Tab::Tasks => 0,
        Tab::Logs => 1,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title("Tabs"),
        )
        .highlight_style(header_style())
        .select(selected);

    frame.render_widget(tabs, area);
}

pub(in crate::tui) fn draw_header(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
) {
    let account = match app.session.account() {
        Some(account) => Span::styled(short_address(account), Style::default().fg(Color::Green)),
        None => Span::styled("not connected", Style::default().fg(Color::Red)),
    };
    let synced = app
        .session
        .snapshot()
        .map(|snapshot| {
            snapshot
                .synced_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());

    let mut spans = vec![
        Span::raw("Account: "),
        account,
        Span::raw(format!("  View: {}", app.session.view_mode().label())),
        Span::raw(format!("  Synced: {synced}")),
    ];
    if let Some(op) = app.pending.as_ref() {
        spans.push(Span::styled(
            format!("  [{}... {}s]", op.label, op.started.elapsed().as_secs()),
            Style::default().fg(Color::Yellow),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title("Task Reward"),
    );
    frame.render_widget(widget, area);
}
