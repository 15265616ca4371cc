/*
[INPUT]:  Key presses from the runtime loop
[OUTPUT]: AppState mutations and the quit signal
[POS]:    TUI keyboard handling
[UPDATE]: When changing keybindings
*/

use crossterm::event::KeyCode;

use task_reward_app::TaskAction;

use super::app::{ActiveModal, AppState, Tab};
use super::ui::modal::ModalAction;

/// Returns true when the TUI should exit.
pub(super) fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    if let Some(active_modal) = app.active_modal_mut() {
        let action = match active_modal {
            ActiveModal::CreateTask(modal) => modal.handle_key(key),
        };
        match action {
            ModalAction::Submit => app.submit_create_task(),
            ModalAction::Cancel => app.close_modal(),
            ModalAction::None => {}
        }
        return false;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('1') => app.set_tab(Tab::Tasks),
        KeyCode::Char('2') => app.set_tab(Tab::Logs),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Char('r') => app.request_refresh(),
        KeyCode::Char('v') => app.cycle_view_mode(),
        KeyCode::Char('n') => app.open_create_task(),
        KeyCode::Char('t') => app.start_task_action(TaskAction::Take),
        KeyCode::Char('s') => app.start_task_action(TaskAction::Submit),
        KeyCode::Char('x') => app.start_task_action(TaskAction::Cancel),
        _ => {}
    }
    false
}
