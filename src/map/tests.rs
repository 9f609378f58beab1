//! Tests for the mapping module

use super::*;
use crate::records::{ProductRecord, RestockRecord, SaleRecord};
use pretty_assertions::assert_eq;
use serde_json::json;

fn product(value: serde_json::Value) -> ProductRecord {
    serde_json::from_value(value).unwrap()
}

fn sale(value: serde_json::Value) -> SaleRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_flat_row_key_is_first_column() {
    let row = FlatRow::keyed("42").with("name", "espresso");
    assert_eq!(row.key(), "42");
    assert_eq!(row.column_names(), vec!["id", "name"]);
    assert_eq!(row.get("id"), Some(&Scalar::Text("42".to_string())));
    assert_eq!(row.len(), 2);
}

#[test]
fn test_compose_key_joins_parent_and_child() {
    let parent = crate::types::SourceId::from("P1");
    let child = crate::types::SourceId::from("O9");
    assert_eq!(compose_key(&parent, &child), "P1:O9");
}

#[test]
fn test_product_without_options_maps_to_no_rows() {
    let rows = product_rows(&product(json!({"id": "P1", "name": "Gift Card"})));
    assert!(rows.is_empty());
}

#[test]
fn test_product_rows_one_per_option_with_parent_fields() {
    let record = product(json!({
        "id": "P1",
        "name": "Espresso Beans",
        "brand": "Roastery",
        "options": [
            {"id": "O1", "name": "250g", "price": 12.5, "stock": 40},
            {"id": "O2", "name": "1kg", "price": 39.0}
        ]
    }));

    let rows = product_rows(&record);
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.key(), "P1:O1");
    assert_eq!(first.get("product_id"), Some(&Scalar::Text("P1".to_string())));
    assert_eq!(
        first.get("name"),
        Some(&Scalar::Text("Espresso Beans".to_string()))
    );
    assert_eq!(
        first.get("brand"),
        Some(&Scalar::Text("Roastery".to_string()))
    );
    assert_eq!(
        first.get("option_name"),
        Some(&Scalar::Text("250g".to_string()))
    );
    assert_eq!(first.get("option_price"), Some(&Scalar::Float(12.5)));
    assert_eq!(first.get("option_stock"), Some(&Scalar::Int(40)));

    let second = &rows[1];
    assert_eq!(second.key(), "P1:O2");
    assert_eq!(
        second.get("name"),
        Some(&Scalar::Text("Espresso Beans".to_string()))
    );
    // Unstocked option falls back to zero, never null.
    assert_eq!(second.get("option_stock"), Some(&Scalar::Int(0)));
}

#[test]
fn test_missing_fields_take_fixed_defaults() {
    let rows = product_rows(&product(json!({
        "id": "P1",
        "options": [{"id": "O1"}]
    })));
    let row = &rows[0];

    assert_eq!(row.get("name"), Some(&Scalar::Text(String::new())));
    assert_eq!(row.get("sku"), Some(&Scalar::Text(String::new())));
    assert_eq!(
        row.get("status"),
        Some(&Scalar::Text(UNKNOWN_STATUS.to_string()))
    );
    assert_eq!(row.get("option_price"), Some(&Scalar::Float(0.0)));
}

#[test]
fn test_sale_row_shape() {
    let record = sale(json!({
        "id": 901,
        "createdDate": "2024-05-01T10:30:00Z",
        "reference": "MAIN-0042",
        "status": "CLOSED",
        "total": 41.5,
        "lineItems": [
            {"id": "L1", "quantity": 2.0, "price": 12.0, "total": 24.0},
            {"id": "L2", "quantity": 1.0, "price": 17.5, "total": 17.5}
        ]
    }));

    let row = sale_row(&record);
    assert_eq!(row.key(), "901");
    assert_eq!(
        row.get("created"),
        Some(&Scalar::Text("2024-05-01T10:30:00Z".to_string()))
    );
    assert_eq!(row.get("total"), Some(&Scalar::Float(41.5)));
    assert_eq!(row.get("line_count"), Some(&Scalar::Int(2)));
}

#[test]
fn test_sale_line_rows_carry_parent_fields() {
    let record = sale(json!({
        "id": 901,
        "reference": "MAIN-0042",
        "lineItems": [
            {"id": "L1", "productId": 7, "sku": "ESP-01", "quantity": 2.0, "price": 12.0, "total": 24.0}
        ]
    }));

    let rows = sale_line_rows(&record);
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.key(), "901:L1");
    assert_eq!(row.get("sale_id"), Some(&Scalar::Text("901".to_string())));
    assert_eq!(
        row.get("reference"),
        Some(&Scalar::Text("MAIN-0042".to_string()))
    );
    assert_eq!(
        row.get("line_product_id"),
        Some(&Scalar::Text("7".to_string()))
    );
    assert_eq!(row.get("line_quantity"), Some(&Scalar::Float(2.0)));
}

#[test]
fn test_restock_row_shape() {
    let record: RestockRecord = serde_json::from_value(json!({
        "id": "R1",
        "receivedDate": "2024-05-01T08:00:00Z",
        "reference": "MAIN-PO-17",
        "productId": "P1",
        "quantity": 24.0
    }))
    .unwrap();

    let row = restock_row(&record);
    assert_eq!(row.key(), "R1");
    assert_eq!(
        row.get("received"),
        Some(&Scalar::Text("2024-05-01T08:00:00Z".to_string()))
    );
    assert_eq!(row.get("quantity"), Some(&Scalar::Float(24.0)));
    assert_eq!(
        row.get("status"),
        Some(&Scalar::Text(UNKNOWN_STATUS.to_string()))
    );
}

#[test]
fn test_mapping_is_deterministic() {
    let record = sale(json!({
        "id": 901,
        "createdDate": "2024-05-01T10:30:00Z",
        "lineItems": [{"id": "L1", "quantity": 2.0}]
    }));

    assert_eq!(sale_row(&record), sale_row(&record));
    assert_eq!(sale_line_rows(&record), sale_line_rows(&record));

    let first = sale_row(&record);
    let second = sale_row(&record);
    assert_eq!(first.column_names(), second.column_names());
}
