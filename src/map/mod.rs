//! Record-to-row mapping
//!
//! Turns parsed source records into flat relational rows. Mapping is pure:
//! column order is fixed per table and optional fields take fixed defaults,
//! so mapping the same records twice produces identical rows and upserts
//! stay idempotent.

mod mappers;

pub use mappers::{product_rows, restock_row, sale_line_rows, sale_row, UNKNOWN_STATUS};

use crate::types::SourceId;

#[cfg(test)]
mod tests;

/// Column name of the natural key, always first in a row
pub const KEY_COLUMN: &str = "id";

// ============================================================================
// Scalars
// ============================================================================

/// A single cell value.
///
/// There is deliberately no null variant: absent source fields take typed
/// defaults at mapping time, so the sink never receives a null.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// Flat Rows
// ============================================================================

/// An ordered list of column/value pairs destined for one sink table row.
///
/// The first column is always [`KEY_COLUMN`] holding the natural key; rows
/// can only be built through [`FlatRow::keyed`], which pins it there.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    columns: Vec<(&'static str, Scalar)>,
}

impl FlatRow {
    /// Start a row with its natural key
    pub fn keyed(id: impl Into<String>) -> Self {
        Self {
            columns: vec![(KEY_COLUMN, Scalar::Text(id.into()))],
        }
    }

    /// Append a column
    pub fn with(mut self, column: &'static str, value: impl Into<Scalar>) -> Self {
        self.columns.push((column, value.into()));
        self
    }

    /// The natural key value
    pub fn key(&self) -> &str {
        match &self.columns[0].1 {
            Scalar::Text(text) => text,
            _ => "",
        }
    }

    /// Column/value pairs in order, key first
    pub fn columns(&self) -> &[(&'static str, Scalar)] {
        &self.columns
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    /// Value of a named column, if present
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .find_map(|(name, value)| (*name == column).then_some(value))
    }

    /// Number of columns, key included
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Rows always carry at least the key column
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Natural key for a sub-entity row
pub fn compose_key(parent: &SourceId, child: &SourceId) -> String {
    format!("{parent}:{child}")
}
