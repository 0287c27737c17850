/// Fixed page size for every listing.
pub const PAGE_SIZE: u32 = 10;

/// `ceil(total_items / page_size)`; zero when either is zero.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size as u64) as u32
}

/// 1-based page cursor, bounded by the last server-reported page count.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    page: u32,
    page_size: u32,
    total_items: Option<u64>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total_items: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    /// Zero until the first page has been fetched.
    pub fn total_pages(&self) -> u32 {
        self.total_items
            .map(|total| total_pages(total, self.page_size))
            .unwrap_or(0)
    }

    pub fn controls_visible(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    /// Returns whether the page actually changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.clamp(1, self.last_page());
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Record a server-reported total. Returns true when the current page
    /// no longer exists and was pulled back to the last page.
    pub fn update_total(&mut self, total_items: u64) -> bool {
        self.total_items = Some(total_items);
        let last = self.last_page();
        if self.page > last {
            tracing::debug!("Page {} out of range, clamping to {}", self.page, last);
            self.page = last;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(7, 3), 3);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_controls_hidden_up_to_one_page() {
        for (total, visible) in [(0, false), (1, false), (10, false), (11, true), (40, true)] {
            let mut state = PaginationState::default();
            state.update_total(total);
            assert_eq!(state.controls_visible(), visible, "total_items = {}", total);
        }
    }

    #[test]
    fn test_controls_hidden_before_first_fetch() {
        assert!(!PaginationState::default().controls_visible());
    }

    #[test]
    fn test_set_page_never_exceeds_page_count() {
        let mut state = PaginationState::default();
        state.update_total(25);
        assert!(state.set_page(3));
        assert!(!state.set_page(9));
        assert_eq!(state.page(), 3);
        assert!(state.set_page(0));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_set_page_before_total_known_stays_on_first() {
        let mut state = PaginationState::default();
        assert!(!state.set_page(4));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut state = PaginationState::default();
        state.update_total(30);
        state.set_page(3);
        assert!(state.update_total(20));
        assert_eq!(state.page(), 2);
        assert!(!state.has_next());
        assert!(state.has_previous());
    }
}
