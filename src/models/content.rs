//! Site content managed from the admin dashboard: banners, partners,
//! navbar links, services, special offers and blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{deserialize_id, is_empty, null_as_default};

/// Homepage carousel banner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Banner title is required"))]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[validate(length(min = 1, message = "Banner image is required"))]
    #[serde(default, alias = "image", deserialize_with = "null_as_default")]
    pub image_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Display order, lowest first
    #[serde(default)]
    pub position: i32,

    #[serde(default)]
    pub is_active: bool,
}

/// Partner logo shown on the storefront
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Partner name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub logo: String,

    #[validate(url(message = "Website must be a full URL"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

/// Entry in the storefront navigation bar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NavbarLink {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Link label is required"))]
    #[serde(alias = "name")]
    pub label: String,

    #[validate(length(min = 1, message = "Link URL is required"))]
    #[serde(alias = "path")]
    pub url: String,

    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub is_active: bool,
}

/// Service advertised on the storefront
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Service title is required"))]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

fn validate_offer_window(offer: &SpecialOffer) -> Result<(), ValidationError> {
    match (offer.starts_at, offer.ends_at) {
        (Some(start), Some(end)) if end < start => {
            let mut error = ValidationError::new("offer_window");
            error.message = Some("Offer must end after it starts".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Time-boxed promotion over a set of products
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_offer_window"))]
pub struct SpecialOffer {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Offer title is required"))]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub product_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_active: bool,
}

impl SpecialOffer {
    /// Whether the offer is active and `now` falls inside its window
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.map_or(true, |start| now >= start)
            && self.ends_at.map_or(true, |end| now <= end)
    }
}

/// News or blog article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[validate(length(min = 1, message = "Post title is required"))]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[validate(length(min = 1, message = "Post content is required"))]
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn offer_window_is_checked() {
        let mut offer = SpecialOffer {
            title: "Spring sale".to_string(),
            starts_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap()),
            is_active: true,
            ..Default::default()
        };
        assert!(offer.validate().is_ok());
        assert!(offer.is_running(Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()));
        assert!(!offer.is_running(Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap()));

        offer.ends_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert!(offer.validate().is_err());
    }

    #[test]
    fn banner_accepts_image_alias() {
        let banner: Banner = serde_json::from_value(json!({
            "_id": "b1",
            "title": "Summer",
            "image": "/uploads/summer.jpg",
            "isActive": true
        }))
        .unwrap();
        assert_eq!(banner.image_url, "/uploads/summer.jpg");
        assert!(banner.validate().is_ok());
    }

    #[test]
    fn partner_website_must_be_url() {
        let partner = Partner {
            name: "Acme".to_string(),
            website: Some("acme dot com".to_string()),
            ..Default::default()
        };
        assert!(partner.validate().unwrap_err().field_errors().contains_key("website"));
    }
}
