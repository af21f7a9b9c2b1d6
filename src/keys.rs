//! Keyboard event handlers.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tui_input::backend::crossterm::EventHandler;

use crate::api::ResourceKind;
use crate::app::{App, View};

/// Handle key events in list view.
pub fn handle_list_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.select_first();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.select_last();
        }
        KeyCode::Enter => {
            app.open_detail();
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_down(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_up(10);
        }
        KeyCode::PageDown => {
            app.page_down(10);
        }
        KeyCode::PageUp => {
            app.page_up(10);
        }
        // Tabs
        KeyCode::Char('1') => app.show_tab(ResourceKind::Campaigns),
        KeyCode::Char('2') => app.show_tab(ResourceKind::Menus),
        KeyCode::Char('3') => app.show_tab(ResourceKind::Categories),
        KeyCode::Char('4') => app.show_tab(ResourceKind::Items),
        KeyCode::Tab => app.next_tab(),
        // Writes
        KeyCode::Char('n') => {
            app.start_create();
        }
        KeyCode::Char('e') => {
            app.start_rename();
        }
        KeyCode::Char('x') => {
            // Delete (with confirmation)
            app.show_delete_confirm();
        }
        KeyCode::Char('r') => {
            app.refresh_list();
        }
        _ => {}
    }
}

/// Handle key events in input mode.
pub fn handle_input_keys(app: &mut App, key: KeyEvent, event: &Event) {
    match key.code {
        KeyCode::Enter => {
            app.submit_input(Instant::now());
        }
        KeyCode::Esc => {
            app.cancel_input_mode();
        }
        _ => {
            // Pass other keys to tui-input
            app.input.handle_event(event);
        }
    }
}

/// Handle key events in modal dialog.
pub fn handle_modal_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.confirm_action();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.close_modal();
        }
        _ => {}
    }
}

/// Handle key events in detail view.
pub fn handle_detail_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.close_detail();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.detail_scroll_down(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.detail_scroll_up(1);
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.detail_scroll_down(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.detail_scroll_up(10);
        }
        KeyCode::PageDown => {
            app.detail_scroll_down(10);
        }
        KeyCode::PageUp => {
            app.detail_scroll_up(10);
        }
        _ => {}
    }
}

/// Dispatch key event to appropriate handler based on app state.
///
/// Returns `true` if the event was fully handled (e.g., help toggle),
/// meaning the caller should `continue` the event loop.
pub fn dispatch_key_event(app: &mut App, key: KeyEvent, event: &Event) -> bool {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return true;
    }

    // Handle ? key globally for help toggle, except while typing
    if key.code == KeyCode::Char('?') && !app.is_input_mode() {
        app.toggle_help();
        return true;
    }

    // If help is showing, close it and execute the command
    if app.show_help {
        if key.code == KeyCode::Esc {
            app.close_help();
            return true;
        }
        // Close help and fall through to execute the command
        app.close_help();
    }

    // Modal dialog takes highest priority
    if app.is_modal_open() {
        handle_modal_keys(app, key);
    } else if app.is_input_mode() {
        // Input mode takes second priority
        handle_input_keys(app, key, event);
    } else {
        // Any other key dismisses a notification early
        app.refresh.dismiss();
        match app.view {
            View::List => handle_list_keys(app, key),
            View::Detail => handle_detail_keys(app, key),
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Command, InputMode};
    use crate::paging::TriggerConfig;

    fn press(app: &mut App, code: KeyCode) -> bool {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        dispatch_key_event(app, key, &Event::Key(key))
    }

    fn make_app() -> App {
        let mut app = App::new(
            "http://localhost:8080/api".to_string(),
            10,
            TriggerConfig::default(),
            ResourceKind::Campaigns,
        );
        app.take_commands();
        app
    }

    #[test]
    fn test_help_toggle_is_consumed() {
        let mut app = make_app();
        assert!(press(&mut app, KeyCode::Char('?')));
        assert!(app.show_help);
        assert!(press(&mut app, KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_number_keys_switch_tabs() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.tab, ResourceKind::Items);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, ResourceKind::Campaigns);
    }

    #[test]
    fn test_typing_goes_to_input() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.input_mode, Some(InputMode::Name));

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('?'));
        assert!(!app.should_quit);
        assert!(!app.show_help);
        assert_eq!(app.input.value(), "q?");

        press(&mut app, KeyCode::Esc);
        assert!(!app.is_input_mode());
    }

    #[test]
    fn test_refresh_key() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('r'));
        assert!(
            app.take_commands()
                .iter()
                .any(|c| matches!(c, Command::FetchPage(_)))
        );
    }

    #[test]
    fn test_quit_key() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
