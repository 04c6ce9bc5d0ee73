//! Sort key selection for product listings

use std::cmp::Ordering;

use crate::models::Product;

/// Comparator over products
pub type Comparator = fn(&Product, &Product) -> Ordering;

/// Sort orders offered by listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Keep the API's order
    #[default]
    Unsorted,
    Name,
    PriceLow,
    PriceHigh,
    Rating,
    /// Most recently created first, by `createdAt`
    Newest,
    Discount,
}

impl SortKey {
    /// Map a sort key string to an order. Unknown keys keep the input order.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "price-low" | "price_asc" => SortKey::PriceLow,
            "price-high" | "price_desc" => SortKey::PriceHigh,
            "rating" => SortKey::Rating,
            "newest" => SortKey::Newest,
            "discount" => SortKey::Discount,
            _ => SortKey::Unsorted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Unsorted => "default",
            SortKey::Name => "name",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::Rating => "rating",
            SortKey::Newest => "newest",
            SortKey::Discount => "discount",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::Unsorted => "Featured",
            SortKey::Name => "Name: A to Z",
            SortKey::PriceLow => "Price: Low to High",
            SortKey::PriceHigh => "Price: High to Low",
            SortKey::Rating => "Customer Rating",
            SortKey::Newest => "Newest Arrivals",
            SortKey::Discount => "Biggest Discount",
        }
    }

    /// The comparator for this order
    pub fn comparator(&self) -> Comparator {
        match self {
            SortKey::Unsorted => |_, _| Ordering::Equal,
            SortKey::Name => by_name,
            SortKey::PriceLow => |a, b| a.price.cmp(&b.price),
            SortKey::PriceHigh => |a, b| b.price.cmp(&a.price),
            SortKey::Rating => |a, b| rating(b).total_cmp(&rating(a)),
            SortKey::Newest => by_newest,
            SortKey::Discount => |a, b| b.discount().cmp(&a.discount()),
        }
    }

    /// Stable sort in place
    pub fn sort(&self, products: &mut [Product]) {
        if *self != SortKey::Unsorted {
            products.sort_by(self.comparator());
        }
    }
}

fn by_name(a: &Product, b: &Product) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

fn by_newest(a: &Product, b: &Product) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn rating(product: &Product) -> f64 {
    product.rating.unwrap_or(0.0)
}
