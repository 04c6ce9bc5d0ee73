//! Growing page window used by infinite-scroll listings

/// Products per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// The first `page × page_size` items of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: usize,
    page_size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageWindow {
    /// A window on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items the window covers
    pub fn limit(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// The visible prefix of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.limit().min(items.len())]
    }

    /// Whether `total` items extend past the window
    pub fn has_more(&self, total: usize) -> bool {
        total > self.limit()
    }

    /// Grow by one page if anything remains. Returns whether it grew.
    pub fn advance(&mut self, total: usize) -> bool {
        if self.has_more(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Back to page 1
    pub fn reset(&mut self) {
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_items_two_pages() {
        let items: Vec<u32> = (0..15).collect();
        let mut window = PageWindow::new(12);

        assert_eq!(window.slice(&items).len(), 12);
        assert!(window.has_more(items.len()));

        assert!(window.advance(items.len()));
        assert_eq!(window.slice(&items).len(), 15);
        assert!(!window.has_more(items.len()));
        assert!(!window.advance(items.len()));
        assert_eq!(window.page(), 2);
    }

    #[test]
    fn empty_listing_has_nothing_more() {
        let window = PageWindow::default();
        let items: Vec<u32> = Vec::new();
        assert!(window.slice(&items).is_empty());
        assert!(!window.has_more(0));
    }

    #[test]
    fn exact_multiple_has_no_more() {
        let window = PageWindow::new(5);
        assert!(!window.has_more(5));
        assert!(window.has_more(6));
    }
}
