//! Navigation methods for App.

use super::App;

impl App {
    /// Number of loaded entities in the active list.
    #[cfg(test)]
    pub fn entity_count(&self) -> usize {
        self.active_pane().len()
    }

    /// Index of the selected row in the active list.
    pub fn selected(&self) -> usize {
        self.active_pane().selected()
    }

    /// Ensure the selected row is visible in the viewport.
    pub fn ensure_selected_visible(&mut self, viewport_height: usize) {
        self.active_pane_mut().ensure_selected_visible(viewport_height);
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        self.active_pane_mut().select_next();
    }

    /// Move selection up.
    pub fn select_previous(&mut self) {
        self.active_pane_mut().select_previous();
    }

    /// Jump to the first entry.
    pub fn select_first(&mut self) {
        self.active_pane_mut().select_first();
    }

    /// Jump to the last loaded entry.
    pub fn select_last(&mut self) {
        self.active_pane_mut().select_last();
    }

    /// Move selection down by page.
    pub fn page_down(&mut self, page_size: usize) {
        self.active_pane_mut().page_down(page_size);
    }

    /// Move selection up by page.
    pub fn page_up(&mut self, page_size: usize) {
        self.active_pane_mut().page_up(page_size);
    }
}
