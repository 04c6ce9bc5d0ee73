//! Product categories

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{deserialize_id, deserialize_opt_id, is_empty};

/// A product category. The hierarchy is one level deep: a category either
/// has no parent or points at a root category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Category {
    /// Categories without a parent
    pub fn roots(categories: &[Category]) -> Vec<&Category> {
        categories.iter().filter(|c| c.parent_id.is_none()).collect()
    }

    /// Direct children of the category with `parent_id`
    pub fn children_of<'a>(categories: &'a [Category], parent_id: &str) -> Vec<&'a Category> {
        categories
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent_id))
            .collect()
    }
}
