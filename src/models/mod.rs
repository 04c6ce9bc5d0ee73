//! Records exchanged with the storefront API

mod category;
mod content;
mod product;

pub use category::*;
pub use content::*;
pub use product::*;

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Accept a record id given as a JSON string or number, normalized to a string.
///
/// `null` and a missing id both read as the empty string, which marks a
/// record the server has not created yet.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Like [`deserialize_id`] for optional references to other records
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = deserialize_id(deserializer)?;
    Ok(if id.is_empty() { None } else { Some(id) })
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a key/value object whose values may be any JSON scalar.
pub(crate) fn deserialize_string_map<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, value))
        })
        .collect())
}

pub(crate) fn is_empty(value: &str) -> bool {
    value.is_empty()
}

/// Either a bare JSON array or an envelope such as `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Data { data } => data,
            ListResponse::Items { items } => items,
        }
    }
}

/// A single record, bare or wrapped in `{ "data": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemResponse<T> {
    Data { data: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            ItemResponse::Data { data } => data,
            ItemResponse::Bare(item) => item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
        id: String,
    }

    #[test]
    fn ids_are_coerced_to_strings() {
        let numeric: Probe = serde_json::from_value(json!({ "id": 42 })).unwrap();
        let mongo: Probe = serde_json::from_value(json!({ "_id": "65a1f0" })).unwrap();
        let missing: Probe = serde_json::from_value(json!({})).unwrap();
        let null: Probe = serde_json::from_value(json!({ "id": null })).unwrap();

        assert_eq!(numeric.id, "42");
        assert_eq!(mongo.id, "65a1f0");
        assert_eq!(missing.id, "");
        assert_eq!(null.id, "");
    }

    #[test]
    fn list_envelopes_are_unwrapped() {
        let bare: ListResponse<Probe> = serde_json::from_value(json!([{ "id": 1 }])).unwrap();
        let wrapped: ListResponse<Probe> =
            serde_json::from_value(json!({ "data": [{ "id": 1 }, { "id": 2 }] })).unwrap();

        assert_eq!(bare.into_vec().len(), 1);
        assert_eq!(wrapped.into_vec().len(), 2);
    }
}
