//! Loading and event handling methods for App.

use std::time::Instant;

use crate::api::ResourceKind;

use super::{App, AppEvent, Command, View};

impl App {
    /// Switch to a resource tab. Its first page is requested on first show.
    pub fn show_tab(&mut self, kind: ResourceKind) {
        self.tab = kind;
        self.view = View::List;
        self.detail_state = None;
        if let Some(request) = self.pane_mut(kind).begin_load() {
            tracing::debug!(resource = kind.path(), "first load");
            self.queue(Command::FetchPage(request));
        }
    }

    /// Cycle to the next tab.
    pub fn next_tab(&mut self) {
        let all = ResourceKind::ALL;
        let index = all.iter().position(|k| *k == self.tab).unwrap_or(0);
        self.show_tab(all[(index + 1) % all.len()]);
    }

    /// Refetch the active list from page one, bypassing cached reads.
    pub fn refresh_list(&mut self) {
        let kind = self.tab;
        let pane = self.pane_mut(kind);
        pane.scroll_to_origin();
        if let Some(request) = pane.begin_refresh() {
            self.queue(Command::Invalidate(kind));
            self.queue(Command::FetchPage(request));
        }
    }

    /// Apply a result coming back from the dispatcher.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::PageLoaded { request, result } => {
                self.pane_mut(request.kind).on_page_loaded(request, result, now);
            }
            AppEvent::MutationSettled {
                kind,
                mutation,
                result,
            } => {
                if self.should_quit {
                    return;
                }
                let pane = match kind {
                    ResourceKind::Campaigns => &mut self.campaigns as &mut dyn super::Pane,
                    ResourceKind::Menus => &mut self.menus,
                    ResourceKind::Categories => &mut self.categories,
                    ResourceKind::Items => &mut self.items,
                };
                if let Some(request) =
                    self.refresh.on_mutation_settled(pane, mutation, result, now)
                {
                    self.queue(Command::Invalidate(kind));
                    self.queue(Command::FetchPage(request));
                }
            }
        }
    }

    /// Periodic work: expire messages and let the visible list ask for more.
    pub fn tick(&mut self, now: Instant) {
        self.refresh.tick(now);
        if self.should_quit || self.view != View::List {
            return;
        }
        // Only the shown tab has a visible sentinel
        if let Some(request) = self.active_pane_mut().poll_trigger(now) {
            self.queue(Command::FetchPage(request));
        }
    }
}
