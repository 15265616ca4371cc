/*
[INPUT]:  Selected task and the connected account
[OUTPUT]: Task detail panel with the actions currently offered
[POS]:    TUI UI task detail rendering
[UPDATE]: When changing which task fields are shown
*/

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use task_reward_app::TaskAction;
use task_reward_app::task::{short_address, unix_now};

use crate::tui::app::AppState;
use crate::tui::runtime::border_style;

fn action_key(action: TaskAction) -> &'static str {
    match action {
        TaskAction::Take => "[t]",
        TaskAction::Submit => "[s]",
        TaskAction::Cancel => "[x]",
    }
}

pub(in crate::tui) fn draw_task_detail(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Details");

    let Some(task) = app.selected_task() else {
        frame.render_widget(Paragraph::new("Select a task").block(block), area);
        return;
    };

    let now = unix_now();
    let label = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<12}"), label), Span::raw(value)])
    };

    let mut lines = vec![
        field("Task", format!("#{} {}", task.id, task.title)),
        field("Reward", task.reward_label()),
        field("Status", task.status_label(now)),
        field("Creator", short_address(task.creator)),
        field("Solver", task.solver_label()),
        field("Deadline", task.deadline_label()),
        Line::from(""),
    ];
    if task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no description)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(task.description.clone()));
    }
    lines.push(Line::from(""));

    let actions = task.available_actions(app.session.account(), now);
    if actions.is_empty() {
        lines.push(Line::from(Span::styled(
            "No actions available",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let mut spans = vec![Span::styled("Actions: ", label)];
        for action in actions {
            spans.push(Span::styled(
                action_key(action),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ));
            spans.push(Span::raw(format!(" {}  ", action.label())));
        }
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}
