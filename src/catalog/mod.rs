//! Client-side catalog pipeline: filter, sort, then page

mod compare;
mod filter;
mod loader;
mod pagination;
mod sort;

pub use compare::*;
pub use filter::*;
pub use loader::*;
pub use pagination::*;
pub use sort::*;

use crate::models::Product;

/// Filter then sort, without paging
pub fn query(products: &[Product], filter: &FilterState, sort: SortKey) -> Vec<Product> {
    let mut matched = filter.apply(products);
    sort.sort(&mut matched);
    matched
}

/// A product listing page: the fetched products plus the shopper's
/// filter, sort order and page window.
///
/// The matched set is recomputed, and the window returns to page 1,
/// whenever any of those inputs changes. Scroll-driven loads go through
/// [`InfiniteScroll`], which grows this same window.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    products: Vec<Product>,
    filter: FilterState,
    sort: SortKey,
    window: PageWindow,
    matched: Vec<Product>,
    generation: u64,
}

impl Listing {
    pub fn new(products: Vec<Product>, page_size: usize) -> Self {
        let mut listing = Self {
            products,
            window: PageWindow::new(page_size),
            ..Default::default()
        };
        listing.recompute();
        listing
    }

    fn recompute(&mut self) {
        self.matched = query(&self.products, &self.filter, self.sort);
        self.window.reset();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Bumped on every recompute, so a load started before a change can
    /// tell it is stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the underlying products, e.g. after a refetch
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.recompute();
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.recompute();
    }

    /// Edit the filter in place
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) {
        edit(&mut self.filter);
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.recompute();
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// All products, unfiltered
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Every product passing the filter, sorted
    pub fn matched(&self) -> &[Product] {
        &self.matched
    }

    /// Products shown on screen
    pub fn visible(&self) -> &[Product] {
        self.window.slice(&self.matched)
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more(self.matched.len())
    }

    /// Show one more page. Returns whether anything was added.
    ///
    /// This is the unguarded step; concurrent triggers should go through
    /// [`InfiniteScroll::load_more`].
    pub fn load_more(&mut self) -> bool {
        self.window.advance(self.matched.len())
    }

    /// Category counts over the products matching everything but the
    /// category selection
    pub fn category_facets(&self) -> std::collections::BTreeMap<String, usize> {
        let mut without_categories = self.filter.clone();
        without_categories.categories.clear();
        category_counts(&without_categories.apply(&self.products))
    }

    /// Look up a product by id, for detail pages and quick views
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
