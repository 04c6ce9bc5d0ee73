//! Side-by-side product comparison

use std::collections::BTreeSet;

use crate::error::Error;
use crate::models::Product;

/// Most products a comparison table shows at once
pub const MAX_COMPARED: usize = 4;

/// Products picked for comparison, in the order they were added
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    products: Vec<Product>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product. Rejects duplicates and a full table.
    pub fn add(&mut self, product: Product) -> Result<(), Error> {
        if self.contains(&product.id) {
            return Err(Error::general(format!("{} is already being compared", product.name)));
        }
        if self.products.len() >= MAX_COMPARED {
            return Err(Error::general(format!("You can compare up to {} products", MAX_COMPARED)));
        }
        self.products.push(product);
        Ok(())
    }

    /// Remove by id, returning the removed product
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Every specification key any compared product has, sorted
    pub fn spec_keys(&self) -> Vec<String> {
        self.products
            .iter()
            .flat_map(|p| p.specifications.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// One row per specification key, one cell per product
    pub fn rows(&self) -> Vec<(String, Vec<Option<String>>)> {
        self.spec_keys()
            .into_iter()
            .map(|key| {
                let cells = self
                    .products
                    .iter()
                    .map(|p| p.specifications.get(&key).cloned())
                    .collect();
                (key, cells)
            })
            .collect()
    }
}
