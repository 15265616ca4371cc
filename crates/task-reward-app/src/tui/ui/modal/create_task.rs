/*
[INPUT]:  Task creation form input
[OUTPUT]: Create task modal and the CreateTaskForm it produces
[POS]:    TUI UI modal for creating a task
[UPDATE]: When changing create task fields
*/

use crossterm::event::KeyCode;

use task_reward_app::CreateTaskForm;

use super::{Field, Modal, ModalAction, handle_modal_key};

const TITLE: usize = 0;
const REWARD: usize = 1;
const DESCRIPTION: usize = 2;
const DEADLINE: usize = 3;

pub(in crate::tui) struct CreateTaskModal {
    form: CreateTaskForm,
    focus_index: usize,
}

impl CreateTaskModal {
    pub(in crate::tui) fn new() -> Self {
        Self {
            form: CreateTaskForm::default(),
            focus_index: 0,
        }
    }

    pub(in crate::tui) fn form(&self) -> &CreateTaskForm {
        &self.form
    }

    #[cfg(test)]
    pub(in crate::tui) fn set_form(
        &mut self,
        title: &str,
        reward: &str,
        description: &str,
        deadline: &str,
    ) {
        self.form = CreateTaskForm {
            title: title.to_string(),
            reward: reward.to_string(),
            description: description.to_string(),
            deadline: deadline.to_string(),
        };
    }

    pub(in crate::tui) fn to_modal(&self) -> Modal {
        let input = |label: &str, value: &str| Field::TextInput {
            label: label.to_string(),
            value: value.to_string(),
        };
        Modal {
            title: String::from("Create Task"),
            focus_index: self.focus_index,
            fields: vec![
                input("Title", &self.form.title),
                input("Reward (ETH)", &self.form.reward),
                input("Description", &self.form.description),
                input("Deadline", &self.form.deadline),
                Field::Button {
                    label: String::from("Create"),
                    action: ModalAction::Submit,
                },
                Field::Button {
                    label: String::from("Cancel"),
                    action: ModalAction::Cancel,
                },
            ],
            hint: Some(String::from(
                "Deadline: unix seconds, RFC 3339, or YYYY-MM-DD HH:MM (local)",
            )),
        }
    }

    pub(in crate::tui) fn handle_key(&mut self, key: KeyCode) -> ModalAction {
        let mut modal = self.to_modal();
        let action = handle_modal_key(&mut modal, key);
        self.apply_modal_state(modal);
        action
    }

    fn apply_modal_state(&mut self, modal: Modal) {
        self.focus_index = modal.focus_index;
        for (index, field) in modal.fields.into_iter().enumerate() {
            let Field::TextInput { value, .. } = field else {
                continue;
            };
            match index {
                TITLE => self.form.title = value,
                REWARD => self.form.reward = value,
                DESCRIPTION => self.form.description = value,
                DEADLINE => self.form.deadline = value,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(modal: &mut CreateTaskModal, text: &str) {
        for ch in text.chars() {
            modal.handle_key(KeyCode::Char(ch));
        }
    }

    #[test]
    fn test_keys_fill_form_fields_in_order() {
        let mut modal = CreateTaskModal::new();
        type_text(&mut modal, "Audit");
        modal.handle_key(KeyCode::Tab);
        type_text(&mut modal, "0.5");
        modal.handle_key(KeyCode::Enter);
        modal.handle_key(KeyCode::Enter);
        type_text(&mut modal, "4102444800");

        let form = modal.form();
        assert_eq!(form.title, "Audit");
        assert_eq!(form.reward, "0.5");
        assert_eq!(form.description, "");
        assert_eq!(form.deadline, "4102444800");
    }

    #[test]
    fn test_create_button_submits() {
        let mut modal = CreateTaskModal::new();
        for _ in 0..4 {
            modal.handle_key(KeyCode::Tab);
        }
        assert_eq!(modal.handle_key(KeyCode::Enter), ModalAction::Submit);
        modal.handle_key(KeyCode::Tab);
        assert_eq!(modal.handle_key(KeyCode::Enter), ModalAction::Cancel);
    }
}
