//! Deduplicated running list of fetched pages.

use std::collections::HashSet;

use crate::api::{Entity, Page};

/// Items assembled from consecutively fetched pages.
///
/// No id ever appears twice; first-seen order is kept.
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    items: Vec<T>,
    ids: HashSet<i64>,
    has_next_page: bool,
    page_size: u32,
}

impl<T: Entity> Accumulator<T> {
    /// Create an empty accumulator. A zero page size is treated as one.
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
            has_next_page: true,
            page_size: page_size.max(1),
        }
    }

    /// Clear all items and assume more pages exist.
    pub fn reset(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.has_next_page = true;
    }

    /// Append the page's unseen items in server order.
    ///
    /// `has_next_page` always follows the page's own flag, even when it
    /// contributed nothing. Returns the number of items added.
    pub fn append_page(&mut self, page: Page<T>) -> usize {
        let before = self.items.len();
        for item in page.items {
            if self.ids.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.has_next_page = !page.is_last_page;
        self.items.len() - before
    }

    /// Replace everything with the contents of a freshly fetched page.
    pub fn replace_with_page(&mut self, page: Page<T>) -> usize {
        self.reset();
        self.append_page(page)
    }

    /// Index of the page to request next, derived from the item count.
    pub fn next_page_index(&self) -> u32 {
        (self.items.len() / self.page_size as usize) as u32
    }

    /// Stop pagination without a last-page response.
    pub fn stop(&mut self) {
        self.has_next_page = false;
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Campaign;

    fn campaign(id: i64) -> Campaign {
        Campaign {
            id,
            name: format!("Campaign {id}"),
            description: None,
            image_url: None,
            active: true,
        }
    }

    fn page(ids: std::ops::Range<i64>, index: u32, last: bool) -> Page<Campaign> {
        Page::new(ids.map(campaign).collect(), index, last)
    }

    fn ids(acc: &Accumulator<Campaign>) -> Vec<i64> {
        acc.items().iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_three_pages_until_last() {
        let mut acc = Accumulator::new(10);
        acc.append_page(page(0..10, 0, false));
        assert_eq!(acc.next_page_index(), 1);
        acc.append_page(page(10..20, 1, false));
        assert_eq!(acc.next_page_index(), 2);
        acc.append_page(page(20..24, 2, true));

        assert_eq!(acc.len(), 24);
        assert!(!acc.has_next_page());
    }

    #[test]
    fn test_duplicate_pages_are_idempotent() {
        let mut acc = Accumulator::new(10);
        assert_eq!(acc.append_page(page(0..10, 0, false)), 10);
        assert_eq!(acc.append_page(page(0..10, 0, false)), 0);
        assert_eq!(acc.append_page(page(5..15, 1, false)), 5);

        let got = ids(&acc);
        let unique: HashSet<i64> = got.iter().copied().collect();
        assert_eq!(got.len(), unique.len());
        assert_eq!(got, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_seen_order_kept() {
        let mut acc = Accumulator::new(3);
        acc.append_page(Page::new(vec![campaign(3), campaign(1), campaign(2)], 0, false));
        acc.append_page(Page::new(vec![campaign(1), campaign(9), campaign(3)], 1, false));
        assert_eq!(ids(&acc), vec![3, 1, 2, 9]);
    }

    #[test]
    fn test_reset_then_append_equals_page() {
        let mut acc = Accumulator::new(10);
        acc.append_page(page(0..10, 0, false));
        acc.append_page(page(10..14, 1, true));

        acc.reset();
        assert!(acc.is_empty());
        assert!(acc.has_next_page());

        let first = page(100..103, 0, false);
        let expected = first.items.clone();
        acc.append_page(first);
        assert_eq!(acc.items(), expected.as_slice());
    }

    #[test]
    fn test_has_next_page_follows_latest_page() {
        let mut acc = Accumulator::new(10);
        acc.append_page(page(0..10, 0, true));
        assert!(!acc.has_next_page());

        // An empty page that is not marked last keeps pagination going
        acc.replace_with_page(page(0..0, 0, false));
        assert!(acc.has_next_page());

        // Zero new items still takes the response flag
        acc.append_page(page(0..0, 1, true));
        assert!(!acc.has_next_page());
    }

    #[test]
    fn test_next_page_index_tracks_short_pages() {
        let mut acc = Accumulator::new(10);
        acc.append_page(page(0..10, 0, false));
        // Server lost two items between requests
        acc.append_page(page(10..18, 1, false));
        assert_eq!(acc.next_page_index(), 1);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let mut acc = Accumulator::<Campaign>::new(0);
        assert_eq!(acc.page_size(), 1);
        acc.append_page(page(0..3, 0, false));
        assert_eq!(acc.next_page_index(), 3);
    }

    #[test]
    fn test_stop() {
        let mut acc = Accumulator::<Campaign>::new(10);
        acc.stop();
        assert!(!acc.has_next_page());
    }
}
