//! Product records, including the optional B2B attributes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use super::{deserialize_id, deserialize_string_map, is_empty, null_as_default};

/// Whether a product is sold business-to-business or to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductType {
    /// Business-to-business listing with MOQ, lead time and tiers
    B2b,

    /// Regular storefront product
    #[default]
    Standard,
}

impl ProductType {
    /// Convert the type to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::B2b => "B2B",
            ProductType::Standard => "standard",
        }
    }

    /// Parse a wire value; anything other than B2B is a standard product
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("b2b") {
            ProductType::B2b
        } else {
            ProductType::Standard
        }
    }
}

impl Serialize for ProductType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(|v| ProductType::parse(&v)).unwrap_or_default())
    }
}

/// Which side of a B2B trade posted the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingRole {
    /// A buyer looking for suppliers (request for quote)
    Buyer,

    /// A seller offering stock
    Seller,
}

/// Price for an order quantity band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPricingTier {
    /// Smallest quantity the tier applies to
    pub min_quantity: u32,

    /// Largest quantity the tier applies to, open-ended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,

    /// Unit price within the tier
    pub price: Decimal,
}

impl BulkPricingTier {
    /// Whether an order of `quantity` falls inside this tier
    pub fn covers(&self, quantity: u32) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// Attributes only B2B listings carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct B2bAttributes {
    /// Minimum order quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moq: Option<u32>,

    /// Lead time in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub bulk_pricing: Vec<BulkPricingTier>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub shipping_options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_as: Option<PostingRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// A catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id", skip_serializing_if = "is_empty")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default)]
    pub price: Decimal,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(default)]
    pub stock: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sku: String,

    /// Image URLs in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default)]
    pub is_hot_deal: bool,

    #[serde(default)]
    pub is_premium: bool,

    #[serde(default)]
    pub is_new: bool,

    /// Percentage off the list price, 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<String>,

    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub specifications: BTreeMap<String, String>,

    /// Average customer rating, 0 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub product_type: ProductType,

    #[serde(flatten)]
    pub b2b: B2bAttributes,
}

impl Product {
    /// Create a standard product with the fields every listing needs
    pub fn new(name: &str, price: Decimal, category: &str) -> Self {
        Self {
            name: name.to_string(),
            price,
            category: category.to_string(),
            ..Default::default()
        }
    }

    /// Whether the product is a B2B listing
    pub fn is_b2b(&self) -> bool {
        self.product_type == ProductType::B2b
    }

    /// Whether any units are available
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Discount percentage, missing treated as zero
    pub fn discount(&self) -> Decimal {
        self.discount_percentage.unwrap_or(Decimal::ZERO)
    }

    /// Whether a positive discount applies
    pub fn has_discount(&self) -> bool {
        self.discount() > Decimal::ZERO
    }

    /// Price after the discount, rounded to cents
    pub fn final_price(&self) -> Decimal {
        let factor = Decimal::ONE_HUNDRED - self.discount().clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        (self.price * factor / Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Unit price for an order quantity, using the matching bulk tier if any
    pub fn unit_price_for(&self, quantity: u32) -> Decimal {
        self.b2b
            .bulk_pricing
            .iter()
            .filter(|tier| tier.covers(quantity))
            .max_by_key(|tier| tier.min_quantity)
            .map(|tier| tier.price)
            .unwrap_or_else(|| self.final_price())
    }

    /// Image shown in listings: the thumbnail, else the first image
    pub fn display_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.images.first().map(String::as_str))
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", invalid("required", "Name is required"));
        }
        if self.price < Decimal::ZERO {
            errors.add("price", invalid("range", "Price cannot be negative"));
        }
        if let Some(discount) = self.discount_percentage {
            if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
                errors.add("discountPercentage", invalid("range", "Discount must be between 0 and 100"));
            }
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                errors.add("rating", invalid("range", "Rating must be between 0 and 5"));
            }
        }
        if self.b2b.bulk_pricing.iter().any(|tier| tier.price < Decimal::ZERO) {
            errors.add("bulkPricing", invalid("range", "Tier prices cannot be negative"));
        }
        if self.is_b2b() {
            if self.b2b.moq.map_or(true, |moq| moq == 0) {
                errors.add("moq", invalid("required", "B2B listings need a minimum order quantity"));
            }
            if self.b2b.posted_as.is_none() {
                errors.add("postedAs", invalid("required", "B2B listings must be posted as buyer or seller"));
            }
        }
        if let Some(email) = self.b2b.contact_email.as_deref() {
            if !email.is_empty() && !email.validate_email() {
                errors.add("contactEmail", invalid("email", "Contact email is not valid"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_api_product_with_b2b_fields() {
        let product: Product = serde_json::from_value(json!({
            "_id": 17,
            "name": "Steel Bolts",
            "price": "0.35",
            "category": "hardware",
            "stock": 12000,
            "images": null,
            "specifications": { "diameter": 8, "finish": "zinc" },
            "productType": "B2B",
            "moq": 500,
            "leadTime": 14,
            "postedAs": "seller",
            "bulkPricing": [
                { "minQuantity": 500, "maxQuantity": 999, "price": 0.32 },
                { "minQuantity": 1000, "price": 0.29 }
            ]
        }))
        .unwrap();

        assert_eq!(product.id, "17");
        assert!(product.is_b2b());
        assert!(product.images.is_empty());
        assert_eq!(product.specifications["diameter"], "8");
        assert_eq!(product.b2b.lead_time, Some(14));
        assert_eq!(product.unit_price_for(600), Decimal::new(32, 2));
        assert_eq!(product.unit_price_for(5000), Decimal::new(29, 2));
        assert_eq!(product.unit_price_for(10), Decimal::new(35, 2));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn unknown_product_type_reads_as_standard() {
        let product: Product =
            serde_json::from_value(json!({ "name": "Mug", "productType": "retail" })).unwrap();
        assert_eq!(product.product_type, ProductType::Standard);
    }

    #[test]
    fn new_products_serialize_without_id() {
        let product = Product::new("Mug", Decimal::new(799, 2), "kitchen");
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["price"], json!(7.99));
        assert_eq!(value["productType"], json!("standard"));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut product = Product::new("", Decimal::new(-1, 0), "kitchen");
        product.discount_percentage = Some(Decimal::new(150, 0));

        let errors = product.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("discountPercentage"));
    }

    #[test]
    fn b2b_listing_needs_moq_and_role() {
        let mut product = Product::new("Cotton Yarn", Decimal::new(4, 0), "textiles");
        product.product_type = ProductType::B2b;

        let errors = product.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("moq"));
        assert!(errors.field_errors().contains_key("postedAs"));

        product.b2b.moq = Some(100);
        product.b2b.posted_as = Some(PostingRole::Buyer);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn final_price_applies_discount() {
        let mut product = Product::new("Lamp", Decimal::new(4000, 2), "home");
        product.discount_percentage = Some(Decimal::new(25, 0));
        assert_eq!(product.final_price(), Decimal::new(3000, 2));
        assert!(product.has_discount());
    }
}
