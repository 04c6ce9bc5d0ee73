//! Scroll-triggered "load more"

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::Listing;

/// Where the viewport sits within the scrollable content, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

/// What a scroll event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The viewport is not close enough to the bottom
    NotNearBottom,
    /// Another load is still in flight; the event was ignored
    Busy,
    /// Everything is already visible
    Exhausted,
    /// The listing's filter, sort or products changed during the delay,
    /// so the page it was loading for no longer exists
    Superseded,
    /// The window grew to `page`
    Loaded { page: usize },
}

/// Grows a [`Listing`]'s page window when the user scrolls near the bottom.
///
/// The window itself stays in the listing, so any filter, sort or product
/// change resets it for scroll-driven loads too. At most one load runs at a
/// time: events that arrive while a load is in flight return
/// [`LoadOutcome::Busy`].
#[derive(Debug)]
pub struct InfiniteScroll {
    loading: AtomicBool,
    delay: Duration,
    threshold: f64,
}

struct ResetOnDrop<'a>(&'a AtomicBool);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock(listing: &Mutex<Listing>) -> MutexGuard<'_, Listing> {
    listing.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InfiniteScroll {
    pub fn new(delay: Duration, threshold: f64) -> Self {
        Self {
            loading: AtomicBool::new(false),
            delay,
            threshold: threshold.max(0.0),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_near_bottom(&self, pos: ScrollPosition) -> bool {
        pos.offset + pos.viewport_height >= pos.content_height - self.threshold
    }

    /// Handle a scroll event over `listing`
    pub async fn on_scroll(&self, listing: &Mutex<Listing>, pos: ScrollPosition) -> LoadOutcome {
        if !self.is_near_bottom(pos) {
            return LoadOutcome::NotNearBottom;
        }
        self.load_more(listing).await
    }

    /// Grow the listing by one page after the loading delay.
    ///
    /// The listing is never locked across the delay.
    pub async fn load_more(&self, listing: &Mutex<Listing>) -> LoadOutcome {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return LoadOutcome::Busy;
        }
        let _guard = ResetOnDrop(&self.loading);

        let generation = {
            let listing = lock(listing);
            if !listing.has_more() {
                return LoadOutcome::Exhausted;
            }
            listing.generation()
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut listing = lock(listing);
        if listing.generation() != generation {
            debug!("listing changed while loading, dropping the load");
            return LoadOutcome::Superseded;
        }
        if listing.load_more() {
            let page = listing.window().page();
            debug!("loaded page {} of {} items", page, listing.matched().len());
            LoadOutcome::Loaded { page }
        } else {
            LoadOutcome::Exhausted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn bottom() -> ScrollPosition {
        ScrollPosition {
            offset: 1800.0,
            viewport_height: 800.0,
            content_height: 2700.0,
        }
    }

    fn listing(n: i64, page_size: usize) -> Mutex<Listing> {
        let products = (0..n)
            .map(|i| {
                let category = if i % 2 == 0 { "even" } else { "odd" };
                Product::new(&format!("Item {}", i), Decimal::new(i, 0), category)
            })
            .collect();
        Mutex::new(Listing::new(products, page_size))
    }

    #[test]
    fn near_bottom_uses_threshold() {
        let scroll = InfiniteScroll::new(Duration::ZERO, 200.0);
        assert!(scroll.is_near_bottom(bottom()));
        assert!(!scroll.is_near_bottom(ScrollPosition {
            offset: 0.0,
            ..bottom()
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn loads_until_exhausted() {
        let scroll = InfiniteScroll::new(Duration::from_millis(300), 200.0);
        let listing = listing(15, 12);

        assert_eq!(scroll.on_scroll(&listing, bottom()).await, LoadOutcome::Loaded { page: 2 });
        assert_eq!(lock(&listing).visible().len(), 15);
        assert_eq!(scroll.on_scroll(&listing, bottom()).await, LoadOutcome::Exhausted);
        assert!(!scroll.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_triggers_are_ignored() {
        let scroll = InfiniteScroll::new(Duration::from_millis(300), 200.0);
        let listing = listing(100, 12);

        let (first, second) = tokio::join!(scroll.on_scroll(&listing, bottom()), scroll.on_scroll(&listing, bottom()));

        assert_eq!(first, LoadOutcome::Loaded { page: 2 });
        assert_eq!(second, LoadOutcome::Busy);
        assert_eq!(lock(&listing).window().page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_restarts_scrolling_from_first_page() {
        let scroll = InfiniteScroll::new(Duration::ZERO, 0.0);
        let listing = listing(30, 12);

        assert_eq!(scroll.load_more(&listing).await, LoadOutcome::Loaded { page: 2 });
        assert_eq!(lock(&listing).visible().len(), 24);

        lock(&listing).update_filter(|f| {
            f.categories.insert("even".to_string());
        });
        assert_eq!(lock(&listing).window().page(), 1);
        assert_eq!(lock(&listing).visible().len(), 12);

        assert_eq!(scroll.load_more(&listing).await, LoadOutcome::Loaded { page: 2 });
        assert_eq!(lock(&listing).visible().len(), 15);
        assert_eq!(scroll.load_more(&listing).await, LoadOutcome::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn change_during_delay_drops_the_load() {
        let scroll = Arc::new(InfiniteScroll::new(Duration::from_millis(300), 0.0));
        let listing = Arc::new(listing(30, 12));

        let pending = {
            let scroll = scroll.clone();
            let listing = listing.clone();
            tokio::spawn(async move { scroll.load_more(&listing).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        lock(&listing).set_sort(crate::catalog::SortKey::PriceHigh);

        assert_eq!(pending.await.unwrap(), LoadOutcome::Superseded);
        assert_eq!(lock(&listing).window().page(), 1);
        assert!(!scroll.is_loading());
    }
}
