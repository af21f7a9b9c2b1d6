//! Input mode methods for App: the create and rename forms.

use std::path::PathBuf;
use std::time::Instant;

use tui_input::Input;

use crate::api::Draft;

use super::{App, Command, FormState, InputMode, Mutation};

impl App {
    /// Start input mode for text entry.
    pub fn start_input_mode(&mut self, mode: InputMode) {
        self.input_mode = Some(mode);
        self.input.reset();
    }

    /// Start input mode with the buffer pre-filled.
    fn start_input_with(&mut self, mode: InputMode, value: String) {
        self.input_mode = Some(mode);
        self.input = Input::new(value);
    }

    /// Cancel input mode and discard the form.
    pub fn cancel_input_mode(&mut self) {
        self.input_mode = None;
        self.input.reset();
        self.form = None;
        self.refresh.clear_form_error();
    }

    /// Check if currently in input mode.
    pub fn is_input_mode(&self) -> bool {
        self.input_mode.is_some()
    }

    /// The form being filled in, if any.
    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    /// Open the create form for the active tab.
    pub fn start_create(&mut self) {
        self.form = Some(FormState {
            kind: self.tab,
            target: None,
            draft: Draft::default(),
        });
        self.refresh.clear_form_error();
        self.start_input_mode(InputMode::Name);
    }

    /// Open the rename form for the selected entity.
    pub fn start_rename(&mut self) {
        let Some((id, draft)) = self.active_pane().selected_draft() else {
            return;
        };
        let name = draft.name.clone();
        self.form = Some(FormState {
            kind: self.tab,
            target: Some(id),
            draft,
        });
        self.refresh.clear_form_error();
        self.start_input_with(InputMode::Rename, name);
    }

    /// Submit the current input and move the form to its next step.
    pub fn submit_input(&mut self, now: Instant) {
        let Some(mode) = self.input_mode.take() else {
            return;
        };
        let value = self.input.value().trim().to_string();
        self.input.reset();

        let Some(form) = self.form.as_mut() else {
            return;
        };
        let kind = form.kind;
        let optional = |v: String| if v.is_empty() { None } else { Some(v) };
        let after_parent = if kind.accepts_image() {
            Some(InputMode::ImagePath)
        } else if kind.has_price() {
            Some(InputMode::Price)
        } else {
            None
        };

        let next = match mode {
            InputMode::Name => {
                form.draft.name = value;
                Some(InputMode::Description)
            }
            InputMode::Description => {
                form.draft.description = optional(value);
                if kind.parent_field().is_some() {
                    Some(InputMode::Parent)
                } else {
                    after_parent
                }
            }
            InputMode::Parent => {
                form.draft.parent = optional(value);
                after_parent
            }
            InputMode::ImagePath => {
                form.draft.image = optional(value).map(PathBuf::from);
                None
            }
            InputMode::Price => {
                form.draft.price = optional(value);
                None
            }
            InputMode::Rename => {
                form.draft.name = value;
                None
            }
        };

        match next {
            Some(mode) => self.start_input_mode(mode),
            None => self.submit_form(now),
        }
    }

    /// Validate the finished form and queue the write.
    fn submit_form(&mut self, now: Instant) {
        let Some(form) = self.form.take() else {
            return;
        };

        if let Err(e) = form.draft.validate(form.kind) {
            tracing::debug!(resource = form.kind.path(), error = %e, "form rejected");
            self.refresh.notify_error(e.user_message("Invalid input"), now);
            // Back to the first step with the entered values kept
            let mode = match form.target {
                Some(_) => InputMode::Rename,
                None => InputMode::Name,
            };
            let name = form.draft.name.clone();
            self.form = Some(form);
            self.start_input_with(mode, name);
            return;
        }

        self.refresh.clear_form_error();
        let mutation = match form.target {
            Some(id) => Mutation::Update {
                id,
                draft: form.draft,
            },
            None => Mutation::Create(form.draft),
        };
        self.queue(Command::Mutate {
            kind: form.kind,
            mutation,
        });
    }
}
