//! Write actions for App.

use super::{App, Command, ModalState, Mutation, PendingAction};

impl App {
    /// Show confirmation dialog for deleting the selected entity.
    pub fn show_delete_confirm(&mut self) {
        let pane = self.active_pane();
        if let (Some(id), Some(name)) = (pane.selected_id(), pane.selected_name()) {
            self.modal = ModalState::Confirm(PendingAction::Delete {
                kind: self.tab,
                id,
                name,
            });
        }
    }

    /// Confirm and queue the pending action.
    pub fn confirm_action(&mut self) {
        let action = match std::mem::take(&mut self.modal) {
            ModalState::Confirm(action) => action,
            ModalState::None => return,
        };

        match action {
            PendingAction::Delete { kind, id, .. } => {
                tracing::info!(resource = kind.path(), id, "delete confirmed");
                self.queue(Command::Mutate {
                    kind,
                    mutation: Mutation::Delete { id },
                });
            }
        }
    }
}
