//! Product CSV import and export.
//!
//! Columns are matched by header name, ignoring case, spaces and
//! underscores, in any order. Unknown columns are ignored and missing ones
//! take their defaults. List fields are joined with `;`, specifications are
//! written as `key:value;key:value` and bulk pricing as
//! `min-max:price;min+:price`. A literal `;`, `:` or `\` inside an item is
//! escaped with a backslash.

use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::str::FromStr;
use validator::Validate;

use crate::error::Error;
use crate::models::{BulkPricingTier, PostingRole, Product, ProductType};
use crate::resource::ResourceClient;

const LIST_SEPARATOR: char = ';';
const PAIR_SEPARATOR: char = ':';
const ESCAPE: char = '\\';

/// Column order used on export
pub const COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "price",
    "category",
    "stock",
    "sku",
    "thumbnail",
    "images",
    "tags",
    "specifications",
    "isFeatured",
    "isHotDeal",
    "isPremium",
    "isNew",
    "discountPercentage",
    "rating",
    "productType",
    "moq",
    "leadTime",
    "postedAs",
    "companyName",
    "contactName",
    "contactEmail",
    "contactPhone",
    "certifications",
    "shippingOptions",
    "bulkPricing",
    "createdAt",
];

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn escape(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    for c in item.chars() {
        if matches!(c, LIST_SEPARATOR | PAIR_SEPARATOR | ESCAPE) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

fn unescape(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    let mut chars = item.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Split on unescaped `separator`, keeping escapes in the pieces
fn split_raw(value: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == separator {
            pieces.push(&value[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&value[start..]);
    pieces
}

fn join(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    items
        .into_iter()
        .map(|s| escape(s.as_ref()))
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

fn split(value: &str) -> impl Iterator<Item = String> + '_ {
    split_raw(value, LIST_SEPARATOR)
        .into_iter()
        .map(|item| unescape(item.trim()))
        .filter(|s| !s.is_empty())
}

/// `key:value` items; a value may itself contain unescaped colons
fn split_pairs(value: &str) -> impl Iterator<Item = (String, String)> + '_ {
    split_raw(value, LIST_SEPARATOR).into_iter().filter_map(|item| {
        let parts = split_raw(item.trim(), PAIR_SEPARATOR);
        let (key, value) = parts.split_first()?;
        if value.is_empty() {
            return None;
        }
        let value = value.join(&PAIR_SEPARATOR.to_string());
        Some((unescape(key.trim()), unescape(value.trim())))
    })
}

fn format_tier(tier: &BulkPricingTier) -> String {
    match tier.max_quantity {
        Some(max) => format!("{}-{}:{}", tier.min_quantity, max, tier.price),
        None => format!("{}+:{}", tier.min_quantity, tier.price),
    }
}

fn parse_tier(item: &str) -> Result<BulkPricingTier, String> {
    let invalid = || format!("bulkPricing item must look like 10-49:9.50 or 50+:8: {}", item);
    let (band, price) = item.split_once(PAIR_SEPARATOR).ok_or_else(invalid)?;
    let price = price.trim().parse::<Decimal>().map_err(|_| invalid())?;
    let band = band.trim();
    let (min, max) = match band.strip_suffix('+') {
        Some(min) => (min, None),
        None => match band.split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (band, Some(band)),
        },
    };
    let min_quantity = min.trim().parse::<u32>().map_err(|_| invalid())?;
    let max_quantity = max
        .map(|max| max.trim().parse::<u32>().map_err(|_| invalid()))
        .transpose()?;
    Ok(BulkPricingTier {
        min_quantity,
        max_quantity,
        price,
    })
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn row(product: &Product) -> Vec<String> {
    let b2b = &product.b2b;
    vec![
        product.id.clone(),
        product.name.clone(),
        product.description.clone(),
        product.price.to_string(),
        product.category.clone(),
        product.stock.to_string(),
        product.sku.clone(),
        opt(&product.thumbnail),
        join(&product.images),
        join(&product.tags),
        product
            .specifications
            .iter()
            .map(|(k, v)| format!("{}{}{}", escape(k), PAIR_SEPARATOR, escape(v)))
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string()),
        product.is_featured.to_string(),
        product.is_hot_deal.to_string(),
        product.is_premium.to_string(),
        product.is_new.to_string(),
        opt(&product.discount_percentage),
        opt(&product.rating),
        product.product_type.as_str().to_string(),
        opt(&b2b.moq),
        opt(&b2b.lead_time),
        b2b.posted_as
            .map(|role| match role {
                PostingRole::Buyer => "buyer".to_string(),
                PostingRole::Seller => "seller".to_string(),
            })
            .unwrap_or_default(),
        opt(&b2b.company_name),
        opt(&b2b.contact_name),
        opt(&b2b.contact_email),
        opt(&b2b.contact_phone),
        join(&b2b.certifications),
        join(&b2b.shipping_options),
        b2b.bulk_pricing
            .iter()
            .map(format_tier)
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string()),
        product.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
    ]
}

/// Write products as CSV with a header row
pub fn export_products<W: Write>(products: &[Product], writer: W) -> Result<(), Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(COLUMNS)?;
    for product in products {
        csv.write_record(row(product))?;
    }
    csv.flush()?;
    Ok(())
}

/// Products as a CSV string
pub fn export_to_string(products: &[Product]) -> Result<String, Error> {
    let mut buffer = Vec::new();
    export_products(products, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::general(format!("CSV is not UTF-8: {}", e)))
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line in the file, the header being line 1
    pub line: u64,
    pub message: String,
}

/// Outcome of parsing a CSV file
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub products: Vec<Product>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    fn text(&self, column: &str) -> &str {
        self.columns
            .get(&normalize(column))
            .and_then(|i| self.record.get(*i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn owned(&self, column: &str) -> String {
        self.text(column).to_string()
    }

    fn optional(&self, column: &str) -> Option<String> {
        Some(self.owned(column)).filter(|s| !s.is_empty())
    }

    fn number<T: FromStr>(&self, column: &str) -> Result<Option<T>, String> {
        let raw = self.text(column);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| format!("{} is not a valid number: {}", column, raw))
    }

    fn flag(&self, column: &str) -> Result<bool, String> {
        match self.text(column).to_ascii_lowercase().as_str() {
            "" | "false" | "0" | "no" => Ok(false),
            "true" | "1" | "yes" => Ok(true),
            other => Err(format!("{} must be true or false: {}", column, other)),
        }
    }

    fn product(&self) -> Result<Product, String> {
        let mut product = Product {
            id: self.owned("id"),
            name: self.owned("name"),
            description: self.owned("description"),
            price: self.number::<Decimal>("price")?.unwrap_or_default(),
            category: self.owned("category"),
            stock: self.number::<u32>("stock")?.unwrap_or_default(),
            sku: self.owned("sku"),
            images: split(self.text("images")).collect(),
            thumbnail: self.optional("thumbnail"),
            is_featured: self.flag("isFeatured")?,
            is_hot_deal: self.flag("isHotDeal")?,
            is_premium: self.flag("isPremium")?,
            is_new: self.flag("isNew")?,
            discount_percentage: self.number::<Decimal>("discountPercentage")?,
            tags: split(self.text("tags")).collect(),
            specifications: split_pairs(self.text("specifications"))
                .filter(|(key, _)| !key.is_empty())
                .collect(),
            rating: self.number::<f64>("rating")?,
            product_type: ProductType::parse(self.text("productType")),
            ..Default::default()
        };

        let b2b = &mut product.b2b;
        b2b.moq = self.number::<u32>("moq")?;
        b2b.lead_time = self.number::<u32>("leadTime")?;
        b2b.posted_as = match self.text("postedAs").to_ascii_lowercase().as_str() {
            "" => None,
            "buyer" => Some(PostingRole::Buyer),
            "seller" => Some(PostingRole::Seller),
            other => return Err(format!("postedAs must be buyer or seller: {}", other)),
        };
        b2b.company_name = self.optional("companyName");
        b2b.contact_name = self.optional("contactName");
        b2b.contact_email = self.optional("contactEmail");
        b2b.contact_phone = self.optional("contactPhone");
        b2b.certifications = split(self.text("certifications")).collect();
        b2b.shipping_options = split(self.text("shippingOptions")).collect();
        b2b.bulk_pricing = split_raw(self.text("bulkPricing"), LIST_SEPARATOR)
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(parse_tier)
            .collect::<Result<_, _>>()?;

        let created_at = self.text("createdAt");
        if !created_at.is_empty() {
            product.created_at = Some(
                DateTime::parse_from_rfc3339(created_at)
                    .map_err(|_| format!("createdAt is not an RFC 3339 timestamp: {}", created_at))?
                    .with_timezone(&Utc),
            );
        }

        Ok(product)
    }
}

/// Parse a product CSV. Bad rows are reported and skipped; good rows are kept.
pub fn import_products<R: Read>(reader: R) -> Result<ImportReport, Error> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let columns: HashMap<String, usize> = csv
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, header)| (normalize(header), i))
        .collect();
    if !columns.contains_key("name") {
        return Err(Error::general("CSV has no name column"));
    }

    let mut report = ImportReport::default();
    for (index, record) in csv.records().enumerate() {
        let line = record
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                report.errors.push(RowError { line, message: e.to_string() });
                continue;
            }
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let parsed = Row { columns: &columns, record: &record }.product().and_then(|product| {
            product
                .validate()
                .map(|_| product)
                .map_err(|e| Error::from(e).user_message())
        });
        match parsed {
            Ok(product) => report.products.push(product),
            Err(message) => report.errors.push(RowError { line, message }),
        }
    }
    Ok(report)
}

/// A product the API refused during a bulk create
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Position in the submitted list
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// Outcome of a bulk create
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub created: Vec<Product>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.created.len()
    }
}

/// POST each product on its own. Failures are logged and reported; rows
/// already created stay created.
pub async fn bulk_create(client: &ResourceClient<Product>, products: Vec<Product>) -> BatchReport {
    let total = products.len();
    let mut report = BatchReport::default();

    for (index, mut product) in products.into_iter().enumerate() {
        product.id.clear();
        match client.create(&product).await {
            Ok(created) => report.created.push(created),
            Err(e) => {
                warn!("import of row {} ({}) failed: {}", index + 1, product.name, e);
                report.failed.push(BatchFailure {
                    index,
                    name: product.name,
                    message: e.user_message(),
                });
            }
        }
    }

    info!("bulk create finished: {} of {} products created", report.success_count(), total);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                let mut p = Product::new(&format!("Widget, model {}", i), Decimal::new(1999 + i as i64, 2), "tools");
                p.id = format!("w{}", i);
                p.stock = i as u32;
                p.images = vec!["/img/a.png".to_string(), "/img/b.png".to_string()];
                p.tags = ["steel", "sale"].iter().map(|s| s.to_string()).collect();
                p.specifications.insert("weight".to_string(), "2 kg".to_string());
                p.is_hot_deal = i % 2 == 0;
                p
            })
            .collect()
    }

    #[test]
    fn export_then_import_keeps_rows() {
        let products = sample(5);
        let csv = export_to_string(&products).unwrap();

        let report = import_products(csv.as_bytes()).unwrap();
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.products.len(), 5);
        for (original, imported) in products.iter().zip(&report.products) {
            assert_eq!(imported.name, original.name);
            assert_eq!(imported.price, original.price);
            assert_eq!(imported.category, original.category);
            assert_eq!(imported.images, original.images);
            assert_eq!(imported.tags, original.tags);
            assert_eq!(imported.specifications, original.specifications);
            assert_eq!(imported.is_hot_deal, original.is_hot_deal);
        }
    }

    #[test]
    fn headers_match_loosely_in_any_order() {
        let csv = "Category,NAME,Price,discount_percentage,Unknown\n\
                   kitchen,Kettle,24.50,10,ignored\n";
        let report = import_products(csv.as_bytes()).unwrap();

        let kettle = &report.products[0];
        assert_eq!(kettle.name, "Kettle");
        assert_eq!(kettle.category, "kitchen");
        assert_eq!(kettle.price, Decimal::new(2450, 2));
        assert_eq!(kettle.discount_percentage, Some(Decimal::new(10, 0)));
    }

    #[test]
    fn bad_rows_are_reported_with_line_numbers() {
        let csv = "name,price,isNew\nGood,5,yes\nBad price,abc,no\n,3,no\nNegative,-2,no\n";
        let report = import_products(csv.as_bytes()).unwrap();

        assert_eq!(report.products.len(), 1);
        let lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(report.errors[0].message.contains("price"));
    }

    #[test]
    fn missing_name_column_is_rejected() {
        assert!(import_products("sku,price\nA1,3\n".as_bytes()).is_err());
    }

    #[test]
    fn b2b_product_survives_round_trip() {
        let mut original = Product::new("Pallet racking; heavy duty", Decimal::new(18950, 2), "warehouse");
        original.id = "r1".to_string();
        original.description = "Bolted \"Z\" beams, 3 levels".to_string();
        original.stock = 40;
        original.sku = "RK-300".to_string();
        original.thumbnail = Some("/img/rack-thumb.png".to_string());
        original.images = vec!["/img/rack.png".to_string(), "/img/rack;side.png".to_string()];
        original.tags = ["a;b", "steel", "back\\slash"].iter().map(|s| s.to_string()).collect();
        original.specifications.insert("size".to_string(), "10;20".to_string());
        original.specifications.insert("ratio".to_string(), "3:1".to_string());
        original.specifications.insert("load:max".to_string(), "900 kg".to_string());
        original.is_featured = true;
        original.is_new = true;
        original.discount_percentage = Some(Decimal::new(125, 1));
        original.rating = Some(4.5);
        original.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        original.product_type = ProductType::B2b;

        let b2b = &mut original.b2b;
        b2b.moq = Some(10);
        b2b.lead_time = Some(21);
        b2b.bulk_pricing = vec![
            BulkPricingTier {
                min_quantity: 10,
                max_quantity: Some(49),
                price: Decimal::new(17500, 2),
            },
            BulkPricingTier {
                min_quantity: 50,
                max_quantity: None,
                price: Decimal::new(160, 0),
            },
        ];
        b2b.certifications = vec!["ISO 9001".to_string(), "EN 15512; EN 15635".to_string()];
        b2b.shipping_options = vec!["FOB: Rotterdam".to_string(), "pickup".to_string()];
        b2b.posted_as = Some(PostingRole::Seller);
        b2b.company_name = Some("Nordic Storage AS".to_string());
        b2b.contact_name = Some("Kari Nordmann".to_string());
        b2b.contact_email = Some("sales@nordic-storage.example".to_string());
        b2b.contact_phone = Some("+47 555 01 234".to_string());

        let csv = export_to_string(std::slice::from_ref(&original)).unwrap();
        let report = import_products(csv.as_bytes()).unwrap();

        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.products, vec![original]);
    }

    #[test]
    fn malformed_bulk_pricing_is_a_row_error() {
        let csv = "name,price,bulkPricing\n\
                   Bolts,2,10-49:1.50;50+:1.20\n\
                   Nuts,1,ten-20:0.50\n";
        let report = import_products(csv.as_bytes()).unwrap();

        assert_eq!(report.products.len(), 1);
        let tiers = &report.products[0].b2b.bulk_pricing;
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].max_quantity, None);
        assert_eq!(tiers[1].price, Decimal::new(120, 2));

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 3);
        assert!(report.errors[0].message.contains("bulkPricing"));
    }
}
