//! Conjunctive product filtering

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use crate::models::{Product, ProductType};

/// Inclusive numeric bounds; a missing bound is open
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Neither bound set
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Drop bounds that contradict each other
    fn sanitized(self) -> Self {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Self { min: None, max: None },
            _ => self,
        }
    }
}

/// Every predicate a listing page can apply. A field at its default value
/// is inactive and matches every product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    /// Case-insensitive substring over name, description and category
    pub search: String,

    /// Category names; empty matches all
    pub categories: BTreeSet<String>,

    pub price: Bounds<Decimal>,

    /// Lead time in days
    pub lead_time: Bounds<u32>,

    pub in_stock: bool,
    pub has_discount: bool,
    pub is_new: bool,
    pub featured: bool,
    pub hot_deal: bool,
    pub premium: bool,

    pub product_type: Option<ProductType>,
}

impl FilterState {
    /// Whether no predicate is active
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Reset every predicate
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of active predicates, for "filters (3)" badges
    pub fn active_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            !self.categories.is_empty(),
            !self.price.is_open(),
            !self.lead_time.is_open(),
            self.in_stock,
            self.has_discount,
            self.is_new,
            self.featured,
            self.hot_deal,
            self.premium,
            self.product_type.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// Build a filter from query-string style parameters.
    ///
    /// Recognized keys: `search`/`q`, `category` (comma separated),
    /// `minPrice`, `maxPrice`, `minLeadTime`, `maxLeadTime`, `inStock`,
    /// `hasDiscount`, `isNew`, `featured`, `hotDeal`, `premium`, `type`.
    /// Values that do not parse, negative numbers and inverted ranges are
    /// ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let flag = |key: &str| get(key).is_some_and(|v| matches!(v, "1" | "true" | "yes" | "on"));

        let price = Bounds::new(
            get("minPrice").and_then(parse_non_negative::<Decimal>),
            get("maxPrice").and_then(parse_non_negative::<Decimal>),
        )
        .sanitized();
        let lead_time = Bounds::new(
            get("minLeadTime").and_then(|v| v.parse::<u32>().ok()),
            get("maxLeadTime").and_then(|v| v.parse::<u32>().ok()),
        )
        .sanitized();

        Self {
            search: get("search").or_else(|| get("q")).unwrap_or_default().to_string(),
            categories: get("category")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty() && *c != "all")
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            price,
            lead_time,
            in_stock: flag("inStock"),
            has_discount: flag("hasDiscount"),
            is_new: flag("isNew"),
            featured: flag("featured"),
            hot_deal: flag("hotDeal"),
            premium: flag("premium"),
            product_type: get("type").map(ProductType::parse),
        }
    }

    /// Whether `product` satisfies every active predicate
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && (self.categories.is_empty() || self.categories.contains(&product.category))
            && self.price.contains(product.price)
            && (self.lead_time.is_open() || product.b2b.lead_time.is_some_and(|days| self.lead_time.contains(days)))
            && (!self.in_stock || product.in_stock())
            && (!self.has_discount || product.has_discount())
            && (!self.is_new || product.is_new)
            && (!self.featured || product.is_featured)
            && (!self.hot_deal || product.is_hot_deal)
            && (!self.premium || product.is_premium)
            && self.product_type.map_or(true, |t| product.product_type == t)
    }

    fn matches_search(&self, product: &Product) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&product.name, &product.description, &product.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching products, in input order
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

fn parse_non_negative<T: FromStr + PartialOrd + Default>(value: &str) -> Option<T> {
    value.parse::<T>().ok().filter(|v| *v >= T::default())
}

/// Product count per category, for the category sidebar
pub fn category_counts(products: &[Product]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for product in products.iter().filter(|p| !p.category.is_empty()) {
        *counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    counts
}
