//! Per-resource mappers
//!
//! Column order within each mapper is the table's column order. Changing it
//! changes the sink schema, so additions go at the end.

use super::{compose_key, FlatRow};
use crate::records::{ProductRecord, RestockRecord, SaleRecord};
use crate::types::SourceId;
use tracing::debug;

/// Sentinel written when the source omits a status
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

// ============================================================================
// Products
// ============================================================================

/// One row per sellable option, carrying the parent product's fields plus
/// the option's own fields under `option_` columns.
///
/// A product without options yields no rows; parents are never synced
/// standalone.
pub fn product_rows(product: &ProductRecord) -> Vec<FlatRow> {
    if product.options.is_empty() {
        debug!("Product {} has no options, nothing to sync", product.id);
        return Vec::new();
    }

    product
        .options
        .iter()
        .map(|option| {
            FlatRow::keyed(compose_key(&product.id, &option.id))
                .with("product_id", product.id.as_str())
                .with("name", text(&product.name))
                .with("sku", text(&product.sku))
                .with("brand", text(&product.brand))
                .with("status", status(&product.status))
                .with("option_name", text(&option.name))
                .with("option_sku", text(&option.sku))
                .with("option_price", float(option.price))
                .with("option_stock", int(option.stock))
        })
        .collect()
}

// ============================================================================
// Sales
// ============================================================================

/// Exactly one row per sale, keyed by the sale id
pub fn sale_row(sale: &SaleRecord) -> FlatRow {
    FlatRow::keyed(sale.id.as_str())
        .with("created", opt_text(sale.created_stamp()))
        .with("reference", opt_text(sale.reference()))
        .with("status", status(&sale.status))
        .with("total", float(sale.total))
        .with("line_count", sale.lines.len() as i64)
}

/// One row per line item, carrying the parent sale's fields plus the line's
/// own fields under `line_` columns
pub fn sale_line_rows(sale: &SaleRecord) -> Vec<FlatRow> {
    sale.lines
        .iter()
        .map(|line| {
            FlatRow::keyed(compose_key(&sale.id, &line.id))
                .with("sale_id", sale.id.as_str())
                .with("created", opt_text(sale.created_stamp()))
                .with("reference", opt_text(sale.reference()))
                .with("status", status(&sale.status))
                .with("total", float(sale.total))
                .with("line_product_id", id_text(&line.product_id))
                .with("line_sku", text(&line.sku))
                .with("line_quantity", float(line.quantity))
                .with("line_price", float(line.price))
                .with("line_total", float(line.total))
        })
        .collect()
}

// ============================================================================
// Restock
// ============================================================================

/// Exactly one row per restock receipt line
pub fn restock_row(receipt: &RestockRecord) -> FlatRow {
    FlatRow::keyed(receipt.id.as_str())
        .with("received", opt_text(receipt.created_stamp()))
        .with("reference", opt_text(receipt.reference()))
        .with("product_id", id_text(&receipt.product_id))
        .with("sku", text(&receipt.sku))
        .with("quantity", float(receipt.quantity))
        .with("status", status(&receipt.status))
}

// ============================================================================
// Field Defaults
// ============================================================================

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn id_text(value: &Option<SourceId>) -> String {
    value.as_ref().map(SourceId::as_str).unwrap_or_default().to_string()
}

fn status(value: &Option<String>) -> String {
    value
        .clone()
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

fn float(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

fn int(value: Option<i64>) -> i64 {
    value.unwrap_or(0)
}
