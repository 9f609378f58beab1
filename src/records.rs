//! Wire record types for the source API
//!
//! Each logical resource parses into its own record type directly after
//! fetch. The typed fields cover the columns the mappers need; everything
//! else the source sends lands in the `extra` bag so the field-name probing
//! below can reach it. Records are immutable once parsed.
//!
//! The source vendor renamed its timestamp fields across API generations.
//! The alias chains are defined once here, in priority order, and the
//! accessor methods walk them: the newest spelling is a typed field, the
//! older spellings are probed out of `extra`.

use crate::types::{JsonObject, JsonValue, Resource, SourceId};
use serde::Deserialize;
use tracing::warn;

// ============================================================================
// Field Alias Chains
// ============================================================================

/// Created-timestamp spellings, newest first
pub const CREATED_ALIASES: &[&str] = &["createdDate", "CreatedDate", "created_date"];

/// Restock receipts prefer the received timestamp over the created one
pub const RECEIVED_ALIASES: &[&str] = &["receivedDate", "createdDate", "CreatedDate", "created_date"];

/// Order/receipt reference spellings
pub const REFERENCE_ALIASES: &[&str] = &["reference", "invoiceNumber", "invoice_number"];

/// First string value found under any of the aliases
fn probe<'a>(extra: &'a JsonObject, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|key| extra.get(*key).and_then(JsonValue::as_str))
}

// ============================================================================
// Products
// ============================================================================

/// A catalog product with its sellable options
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: SourceId,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
    #[serde(default, alias = "variants")]
    pub options: Vec<ProductOption>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// One sellable option (variant) of a product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductOption {
    pub id: SourceId,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    #[serde(alias = "stockOnHand", alias = "stock_on_hand")]
    pub stock: Option<i64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ============================================================================
// Sales
// ============================================================================

/// A completed sale with its line items
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRecord {
    pub id: SourceId,
    #[serde(rename = "createdDate")]
    pub created: Option<String>,
    pub reference: Option<String>,
    pub status: Option<String>,
    pub total: Option<f64>,
    #[serde(default, rename = "lineItems", alias = "line_items", alias = "items")]
    pub lines: Vec<SaleLine>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// One line item of a sale
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLine {
    pub id: SourceId,
    #[serde(rename = "productId", alias = "product_id")]
    pub product_id: Option<SourceId>,
    pub sku: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub total: Option<f64>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SaleRecord {
    /// Best-available created timestamp, walking [`CREATED_ALIASES`]
    pub fn created_stamp(&self) -> Option<&str> {
        self.created
            .as_deref()
            .or_else(|| probe(&self.extra, &CREATED_ALIASES[1..]))
    }

    /// Best-available order reference, walking [`REFERENCE_ALIASES`]
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or_else(|| probe(&self.extra, &REFERENCE_ALIASES[1..]))
    }
}

// ============================================================================
// Restock
// ============================================================================

/// One incoming-stock receipt line
#[derive(Debug, Clone, Deserialize)]
pub struct RestockRecord {
    pub id: SourceId,
    #[serde(rename = "receivedDate")]
    pub received: Option<String>,
    pub reference: Option<String>,
    #[serde(rename = "productId", alias = "product_id")]
    pub product_id: Option<SourceId>,
    pub sku: Option<String>,
    pub quantity: Option<f64>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl RestockRecord {
    /// Best-available received timestamp, walking [`RECEIVED_ALIASES`]
    pub fn created_stamp(&self) -> Option<&str> {
        self.received
            .as_deref()
            .or_else(|| probe(&self.extra, &RECEIVED_ALIASES[1..]))
    }

    /// Best-available receipt reference, walking [`REFERENCE_ALIASES`]
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or_else(|| probe(&self.extra, &REFERENCE_ALIASES[1..]))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse raw JSON values into typed records.
///
/// A value that does not parse (most commonly: no source-assigned `id`, so
/// no natural key) is skipped with a warning. Parsing never fails the fetch.
pub fn parse_records<T>(resource: Resource, values: Vec<JsonValue>) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unparseable {} record: {}", resource.name(), e),
        }
    }
    records
}
