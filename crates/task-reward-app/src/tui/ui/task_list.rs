/*
[INPUT]:  Visible tasks from the session under the current view mode
[OUTPUT]: Task list rendered into Ratatui frame
[POS]:    TUI UI task list rendering
[UPDATE]: When changing task row contents
*/

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};

use task_reward_app::task::unix_now;

use crate::tui::app::AppState;
use crate::tui::runtime::border_style;

pub(in crate::tui) fn draw_task_list(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &mut AppState,
) {
    let now = unix_now();
    let items = if !app.session.is_connected() {
        vec![ListItem::new("Wallet not connected. Press [r] to connect.")]
    } else {
        let tasks = app.visible_tasks();
        if tasks.is_empty() {
            vec![ListItem::new("No tasks found")]
        } else {
            tasks
                .iter()
                .map(|task| {
                    let mut spans = vec![Span::raw(format!(
                        "#{} {} | {} | {}",
                        task.id,
                        task.title,
                        task.reward_label(),
                        task.status.label()
                    ))];
                    if task.shows_expired_badge(now) {
                        spans.push(Span::styled(" expired", Style::default().fg(Color::Red)));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect()
        }
    };

    let title = format!("Tasks ({})", app.session.view_mode().label());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}
