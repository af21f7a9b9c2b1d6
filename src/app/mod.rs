//! Application state management.

mod commands;
mod dispatch;
mod input;
mod list;
mod loading;
mod navigation;


use tui_input::Input;

use crate::api::{Campaign, Category, Draft, Menu, MenuItem, ResourceKind};
use crate::error::MenuboardError;
use crate::paging::{FetchRequest, MutationKind, RefreshCoordinator, TriggerConfig};
use crate::text::truncate_str;

pub use dispatch::Dispatcher;
use list::ListView;
pub use list::{Pane, Row};

/// Current view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    List,
    Detail,
}

/// Input mode for text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Name of a new entity.
    Name,
    /// Optional description of a new entity.
    Description,
    /// Optional id of the menu or category a new entity belongs to.
    Parent,
    /// Optional image file to upload.
    ImagePath,
    /// Price of a new menu item.
    Price,
    /// New name for the selected entity.
    Rename,
}

impl InputMode {
    /// Get the placeholder text for this input mode.
    pub fn placeholder(&self) -> &'static str {
        match self {
            InputMode::Name => "Enter name...",
            InputMode::Description => "Enter description (empty for none)...",
            InputMode::Parent => "Enter parent id (empty for none)...",
            InputMode::ImagePath => "Path to image file (empty for none)...",
            InputMode::Price => "Enter price, e.g. 4.50 (empty for none)...",
            InputMode::Rename => "Enter new name...",
        }
    }

    /// Title of the input box.
    pub fn title(&self) -> &'static str {
        match self {
            InputMode::Name => " Name ",
            InputMode::Description => " Description ",
            InputMode::Parent => " Parent ",
            InputMode::ImagePath => " Image ",
            InputMode::Price => " Price ",
            InputMode::Rename => " Rename ",
        }
    }
}

/// A create or update form being filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Resource being written.
    pub kind: ResourceKind,
    /// Entity being updated, None when creating.
    pub target: Option<i64>,
    /// Values entered so far.
    pub draft: Draft,
}

/// State for detail view.
#[derive(Debug, Clone)]
pub struct DetailState {
    /// Resource of the displayed entity.
    pub kind: ResourceKind,
    /// Labelled fields of the entity.
    pub fields: Vec<(&'static str, String)>,
    /// Vertical scroll offset.
    pub scroll: usize,
    /// Total content height (for scroll calculation).
    pub content_height: usize,
}

/// Pending action for confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Delete an entity.
    Delete {
        kind: ResourceKind,
        id: i64,
        name: String,
    },
}

impl PendingAction {
    /// Get the confirmation message for this action.
    pub fn confirm_message(&self) -> String {
        match self {
            PendingAction::Delete { kind, name, .. } => {
                format!(
                    "Delete {}: \"{}\"?",
                    kind.singular().to_lowercase(),
                    truncate_str(name, 40)
                )
            }
        }
    }
}

/// Modal dialog state.
#[derive(Debug, Clone, Default)]
pub enum ModalState {
    /// No modal is shown.
    #[default]
    None,
    /// Confirmation dialog for a pending action.
    Confirm(PendingAction),
}

/// A write to perform against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(Draft),
    Update { id: i64, draft: Draft },
    Delete { id: i64 },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }
}

/// Work the app asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch a page.
    FetchPage(FetchRequest),
    /// Create, update or delete an entity.
    Mutate {
        kind: ResourceKind,
        mutation: Mutation,
    },
    /// Drop cached reads of a resource.
    Invalidate(ResourceKind),
    /// Record a QR scan (fire-and-forget).
    TrackQr,
}

/// Results flowing back from the dispatcher.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A page fetch settled.
    PageLoaded {
        request: FetchRequest,
        result: Result<crate::api::LoadedPage, MenuboardError>,
    },
    /// A create/update/delete settled.
    MutationSettled {
        kind: ResourceKind,
        mutation: MutationKind,
        result: Result<(), MenuboardError>,
    },
}

/// Application state.
pub struct App {
    campaigns: ListView<Campaign>,
    menus: ListView<Menu>,
    categories: ListView<Category>,
    items: ListView<MenuItem>,
    /// Active resource tab.
    pub tab: ResourceKind,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// API base URL (shown in the title bar).
    pub api_base: String,
    /// Landing URL after QR marker stripping, if launched from one.
    pub landing_url: Option<String>,
    /// Current view mode.
    pub view: View,
    /// Detail view state.
    pub detail_state: Option<DetailState>,
    /// Whether the help modal is shown.
    pub show_help: bool,
    /// Modal dialog state.
    pub modal: ModalState,
    /// Current input mode (if any).
    pub input_mode: Option<InputMode>,
    /// Text input buffer.
    pub input: Input,
    /// Form being filled in.
    form: Option<FormState>,
    /// Notifications and post-mutation refreshes.
    pub refresh: RefreshCoordinator,
    /// Commands waiting for the dispatcher.
    commands: Vec<Command>,
}

impl App {
    /// Create a new App showing `tab`; the tab's first page is queued.
    pub fn new(api_base: String, page_size: u32, trigger: TriggerConfig, tab: ResourceKind) -> Self {
        let mut app = Self {
            campaigns: ListView::new(page_size, trigger),
            menus: ListView::new(page_size, trigger),
            categories: ListView::new(page_size, trigger),
            items: ListView::new(page_size, trigger),
            tab,
            should_quit: false,
            api_base,
            landing_url: None,
            view: View::default(),
            detail_state: None,
            show_help: false,
            modal: ModalState::default(),
            input_mode: None,
            input: Input::default(),
            form: None,
            refresh: RefreshCoordinator::new(),
            commands: Vec::new(),
        };
        app.show_tab(tab);
        app
    }

    /// List controller of a resource.
    pub fn pane(&self, kind: ResourceKind) -> &dyn Pane {
        match kind {
            ResourceKind::Campaigns => &self.campaigns,
            ResourceKind::Menus => &self.menus,
            ResourceKind::Categories => &self.categories,
            ResourceKind::Items => &self.items,
        }
    }

    /// Mutable list controller of a resource.
    pub fn pane_mut(&mut self, kind: ResourceKind) -> &mut dyn Pane {
        match kind {
            ResourceKind::Campaigns => &mut self.campaigns,
            ResourceKind::Menus => &mut self.menus,
            ResourceKind::Categories => &mut self.categories,
            ResourceKind::Items => &mut self.items,
        }
    }

    /// List controller of the active tab.
    pub fn active_pane(&self) -> &dyn Pane {
        self.pane(self.tab)
    }

    /// Mutable list controller of the active tab.
    pub fn active_pane_mut(&mut self) -> &mut dyn Pane {
        self.pane_mut(self.tab)
    }

    /// Typed campaign list.
    #[cfg(test)]
    pub fn campaigns(&self) -> &ListView<Campaign> {
        &self.campaigns
    }

    /// Queue a command for the dispatcher.
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Take all queued commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Request application quit. All lists stop accepting results.
    pub fn quit(&mut self) {
        self.should_quit = true;
        for kind in ResourceKind::ALL {
            self.pane_mut(kind).teardown();
        }
    }

    /// Toggle help modal visibility.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Close help modal.
    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    /// Check if a modal is currently shown.
    pub fn is_modal_open(&self) -> bool {
        !matches!(self.modal, ModalState::None)
    }

    /// Close the modal dialog without executing.
    pub fn close_modal(&mut self) {
        self.modal = ModalState::None;
    }

    /// Open detail view for the selected entity.
    pub fn open_detail(&mut self) {
        if let Some(fields) = self.active_pane().selected_detail() {
            self.detail_state = Some(DetailState {
                kind: self.tab,
                fields,
                scroll: 0,
                content_height: 0, // Calculated during render
            });
            self.view = View::Detail;
        }
    }

    /// Close detail view and return to the list.
    pub fn close_detail(&mut self) {
        self.view = View::List;
        self.detail_state = None;
    }

    /// Scroll detail view down.
    pub fn detail_scroll_down(&mut self, amount: usize) {
        if let Some(state) = &mut self.detail_state {
            state.scroll = state.scroll.saturating_add(amount);
        }
    }

    /// Scroll detail view up.
    pub fn detail_scroll_up(&mut self, amount: usize) {
        if let Some(state) = &mut self.detail_state {
            state.scroll = state.scroll.saturating_sub(amount);
        }
    }

    /// Set content height for detail view (called from render).
    pub fn set_detail_content_height(&mut self, height: usize) {
        if let Some(state) = &mut self.detail_state {
            state.content_height = height;
            // Clamp scroll to valid range
            if height > 0 && state.scroll >= height {
                state.scroll = height.saturating_sub(1);
            }
        }
    }
}
