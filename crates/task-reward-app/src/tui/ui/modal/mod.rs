/*
[INPUT]:  Modal state, fields, and key events
[OUTPUT]: Modal rendering output and modal action results
[POS]:    TUI UI modal module root
[UPDATE]: When adding field kinds or modals
*/

mod create_task;

pub(in crate::tui) use create_task::CreateTaskModal;

use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::runtime::border_style;

pub(in crate::tui) struct Modal {
    pub(super) title: String,
    pub(super) focus_index: usize,
    pub(super) fields: Vec<Field>,
    pub(super) hint: Option<String>,
}

pub(in crate::tui) enum Field {
    TextInput { label: String, value: String },
    Button { label: String, action: ModalAction },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui) enum ModalAction {
    Submit,
    Cancel,
    None,
}

pub(in crate::tui) fn draw_modal(frame: &mut ratatui::Frame, area: Rect, modal: &Modal) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(modal.title.as_str());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = modal
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let focused = index == modal.focus_index;
            let content = match field {
                Field::TextInput { label, value } if focused => format!("{label}: {value}_"),
                Field::TextInput { label, value } => format!("{label}: {value}"),
                Field::Button { label, .. } => format!("[{label}]"),
            };
            let style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(Span::styled(content, style))
        })
        .collect();

    if let Some(hint) = modal.hint.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

pub(in crate::tui) fn handle_modal_key(modal: &mut Modal, key: KeyCode) -> ModalAction {
    let len = modal.fields.len();
    match key {
        KeyCode::Esc => ModalAction::Cancel,
        KeyCode::Tab | KeyCode::Down => {
            if len > 0 {
                modal.focus_index = (modal.focus_index + 1) % len;
            }
            ModalAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            if len > 0 {
                modal.focus_index = (modal.focus_index + len - 1) % len;
            }
            ModalAction::None
        }
        KeyCode::Backspace => {
            if let Some(Field::TextInput { value, .. }) = modal.fields.get_mut(modal.focus_index) {
                value.pop();
            }
            ModalAction::None
        }
        KeyCode::Char(ch) => {
            if let Some(Field::TextInput { value, .. }) = modal.fields.get_mut(modal.focus_index) {
                value.push(ch);
            }
            ModalAction::None
        }
        KeyCode::Enter => match modal.fields.get(modal.focus_index) {
            Some(Field::Button { action, .. }) => *action,
            Some(Field::TextInput { .. }) => {
                modal.focus_index = (modal.focus_index + 1) % len;
                ModalAction::None
            }
            None => ModalAction::None,
        },
        _ => ModalAction::None,
    }
}
