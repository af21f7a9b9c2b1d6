//! Paginated list controller, one per resource tab.

use std::time::{Duration, Instant};

use crate::api::{Draft, Entity, LoadedPage, ResourceKind};
use crate::error::MenuboardError;
use crate::paging::{
    Accumulator, FetchRequest, Purpose, RefreshTarget, ScrollTrigger, TriggerConfig, Viewport,
};

/// Consecutive next pages adding nothing before pagination stops.
pub const MAX_EMPTY_APPENDS: u32 = 3;

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub name: String,
    pub summary: String,
}

/// Object-safe view of a list controller, so the app can drive any tab.
pub trait Pane: RefreshTarget {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Rows in `[offset, offset + count)`.
    fn rows(&self, offset: usize, count: usize) -> Vec<Row>;
    fn selected(&self) -> usize;
    fn scroll_offset(&self) -> usize;
    fn has_next_page(&self) -> bool;
    fn is_loading_more(&self) -> bool;
    fn is_refreshing(&self) -> bool;
    fn is_loaded(&self) -> bool;
    fn load_error(&self) -> Option<&str>;
    fn total_elements(&self) -> Option<u64>;

    fn selected_id(&self) -> Option<i64>;
    fn selected_name(&self) -> Option<String>;
    fn selected_detail(&self) -> Option<Vec<(&'static str, String)>>;
    fn selected_draft(&self) -> Option<(i64, Draft)>;

    fn select_next(&mut self);
    fn select_previous(&mut self);
    fn select_first(&mut self);
    fn select_last(&mut self);
    fn page_down(&mut self, page_size: usize);
    fn page_up(&mut self, page_size: usize);
    /// Record the viewport height and scroll so the selection is visible.
    fn ensure_selected_visible(&mut self, viewport_height: usize);

    /// First load when the tab is shown. None once loaded or torn down.
    fn begin_load(&mut self) -> Option<FetchRequest>;
    /// Ask the scroll trigger whether the next page is due.
    fn poll_trigger(&mut self, now: Instant) -> Option<FetchRequest>;
    /// Apply a fetch result.
    fn on_page_loaded(
        &mut self,
        request: FetchRequest,
        result: Result<LoadedPage, MenuboardError>,
        now: Instant,
    );
    /// Stop observing and ignore all later results.
    fn teardown(&mut self);
}

/// List state for one resource: accumulated items, pagination and selection.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    acc: Accumulator<T>,
    trigger: ScrollTrigger,
    /// Bumped on every refresh and on teardown; older responses are dropped.
    generation: u64,
    selected: usize,
    scroll_offset: usize,
    viewport_height: usize,
    loaded: bool,
    refreshing: bool,
    load_error: Option<String>,
    empty_appends: u32,
    total_elements: Option<u64>,
    torn_down: bool,
}

impl<T: Entity> ListView<T> {
    pub fn new(page_size: u32, trigger: TriggerConfig) -> Self {
        Self {
            acc: Accumulator::new(page_size),
            trigger: ScrollTrigger::new(trigger),
            generation: 0,
            selected: 0,
            scroll_offset: 0,
            viewport_height: 0,
            loaded: false,
            refreshing: false,
            load_error: None,
            empty_appends: 0,
            total_elements: None,
            torn_down: false,
        }
    }

    #[cfg(test)]
    pub fn items(&self) -> &[T] {
        self.acc.items()
    }

    fn selected_item(&self) -> Option<&T> {
        self.acc.get(self.selected)
    }

    fn load_error_message(&self) -> String {
        format!("Could not load {}", T::KIND.title().to_lowercase())
    }

    fn clamp_selection(&mut self) {
        let count = self.acc.len();
        if count == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    fn apply_refresh(&mut self, result: Result<LoadedPage, MenuboardError>) {
        self.refreshing = false;
        match result.and_then(decode::<T>) {
            Ok(page) => {
                self.total_elements = page.total_elements;
                let added = self.acc.replace_with_page(page);
                self.empty_appends = 0;
                self.load_error = None;
                self.clamp_selection();
                tracing::debug!(resource = T::KIND.path(), added, "page one loaded");
            }
            Err(e) => {
                tracing::warn!(resource = T::KIND.path(), error = %e, "list load failed");
                self.load_error = Some(self.load_error_message());
            }
        }
    }

    fn apply_append(&mut self, result: Result<LoadedPage, MenuboardError>) {
        match result.and_then(decode::<T>) {
            Ok(page) => {
                let page_index = page.page_index;
                if page.total_elements.is_some() {
                    self.total_elements = page.total_elements;
                }
                let added = self.acc.append_page(page);
                self.load_error = None;

                if added == 0 && self.acc.has_next_page() {
                    self.empty_appends += 1;
                    if self.empty_appends >= MAX_EMPTY_APPENDS {
                        tracing::warn!(
                            resource = T::KIND.path(),
                            page = page_index,
                            "pages keep repeating known items, stopping pagination"
                        );
                        self.acc.stop();
                    }
                } else {
                    self.empty_appends = 0;
                }
                tracing::debug!(resource = T::KIND.path(), page = page_index, added, "page appended");
            }
            Err(e) => {
                // No retry loop: the user refreshes manually
                tracing::warn!(resource = T::KIND.path(), error = %e, "next page failed");
                self.acc.stop();
                self.load_error = Some(self.load_error_message());
            }
        }
    }
}

fn decode<T: Entity>(loaded: LoadedPage) -> Result<crate::api::Page<T>, MenuboardError> {
    let kind = loaded.kind();
    T::from_loaded(loaded).ok_or_else(|| {
        MenuboardError::Network(format!(
            "expected {} page, got {}",
            T::KIND.path(),
            kind.path()
        ))
    })
}

impl<T: Entity> RefreshTarget for ListView<T> {
    fn kind(&self) -> ResourceKind {
        T::KIND
    }

    fn scroll_to_origin(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn begin_refresh(&mut self) -> Option<FetchRequest> {
        if self.torn_down {
            return None;
        }
        self.generation += 1;
        self.loaded = true;
        self.refreshing = true;
        self.load_error = None;
        Some(FetchRequest {
            kind: T::KIND,
            page_index: 0,
            page_size: self.acc.page_size(),
            generation: self.generation,
            purpose: Purpose::Refresh,
            delay: Duration::ZERO,
        })
    }
}

impl<T: Entity> Pane for ListView<T> {
    fn len(&self) -> usize {
        self.acc.len()
    }

    fn rows(&self, offset: usize, count: usize) -> Vec<Row> {
        self.acc
            .items()
            .iter()
            .skip(offset)
            .take(count)
            .map(|item| Row {
                id: item.id(),
                name: item.name().to_string(),
                summary: item.summary(),
            })
            .collect()
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn has_next_page(&self) -> bool {
        self.acc.has_next_page()
    }

    fn is_loading_more(&self) -> bool {
        self.trigger.is_fetching()
    }

    fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn total_elements(&self) -> Option<u64> {
        self.total_elements
    }

    fn selected_id(&self) -> Option<i64> {
        self.selected_item().map(Entity::id)
    }

    fn selected_name(&self) -> Option<String> {
        self.selected_item().map(|item| item.name().to_string())
    }

    fn selected_detail(&self) -> Option<Vec<(&'static str, String)>> {
        self.selected_item().map(Entity::detail_fields)
    }

    fn selected_draft(&self) -> Option<(i64, Draft)> {
        self.selected_item().map(|item| (item.id(), item.to_draft()))
    }

    fn select_next(&mut self) {
        let count = self.acc.len();
        if count > 0 && self.selected < count - 1 {
            self.selected += 1;
        }
    }

    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn select_first(&mut self) {
        self.selected = 0;
    }

    fn select_last(&mut self) {
        let count = self.acc.len();
        if count > 0 {
            self.selected = count - 1;
        }
    }

    fn page_down(&mut self, page_size: usize) {
        let count = self.acc.len();
        if count == 0 {
            return;
        }
        let new_selected = self.selected.saturating_add(page_size);
        self.selected = new_selected.min(count - 1);
    }

    fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
    }

    fn ensure_selected_visible(&mut self, viewport_height: usize) {
        self.viewport_height = viewport_height;
        if viewport_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.selected.saturating_sub(viewport_height - 1);
        }
    }

    fn begin_load(&mut self) -> Option<FetchRequest> {
        if self.loaded {
            return None;
        }
        self.acc.reset();
        self.trigger.observe(None);
        self.begin_refresh()
    }

    fn poll_trigger(&mut self, now: Instant) -> Option<FetchRequest> {
        // Page one decides what "next" means; wait for it
        if self.torn_down || !self.loaded || self.refreshing {
            return None;
        }
        let viewport = Viewport {
            offset: self.scroll_offset,
            height: self.viewport_height,
        };
        let ticket = self
            .trigger
            .poll(now, viewport, self.acc.has_next_page(), self.generation)?;

        let page_index = self.acc.next_page_index();
        tracing::debug!(resource = T::KIND.path(), page = page_index, "requesting next page");
        Some(FetchRequest {
            kind: T::KIND,
            page_index,
            page_size: self.acc.page_size(),
            generation: ticket.generation,
            purpose: Purpose::Append,
            delay: ticket.delay,
        })
    }

    fn on_page_loaded(
        &mut self,
        request: FetchRequest,
        result: Result<LoadedPage, MenuboardError>,
        now: Instant,
    ) {
        if self.torn_down {
            tracing::trace!(resource = T::KIND.path(), "result after teardown ignored");
            return;
        }
        if request.purpose == Purpose::Append {
            self.trigger.settle(request.generation, now);
        }
        if request.generation != self.generation {
            tracing::debug!(
                resource = T::KIND.path(),
                stale = request.generation,
                current = self.generation,
                "discarding stale page"
            );
            return;
        }

        match request.purpose {
            Purpose::Refresh => self.apply_refresh(result),
            Purpose::Append => self.apply_append(result),
        }
        self.trigger.observe(self.acc.len().checked_sub(1));
    }

    fn teardown(&mut self) {
        self.torn_down = true;
        self.generation += 1;
        self.trigger.disconnect();
    }
}
