//! Common types used throughout tillsync
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Source Ids
// ============================================================================

/// A source-assigned identifier.
///
/// The source API emits ids as integers in some endpoint versions and as
/// strings in others; both deserialize into the same canonical string form
/// so natural keys stay stable across versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// The canonical string form of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = SourceId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<SourceId, E> {
                Ok(SourceId(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<SourceId, E> {
                Ok(SourceId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<SourceId, E> {
                Ok(SourceId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// ============================================================================
// Resources
// ============================================================================

/// A logical resource exposed by the source API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Product catalog, including nested options
    Products,
    /// Completed sales, including nested line items
    Sales,
    /// Incoming stock (restock receipts)
    Restock,
}

impl Resource {
    /// Canonical lowercase name, used in logs and config keys
    pub fn name(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Sales => "sales",
            Resource::Restock => "restock",
        }
    }

    /// Object-body wrapper fields probed in order when the source wraps the
    /// record array instead of returning it bare.
    pub fn wrapper_fields(self) -> &'static [&'static str] {
        match self {
            Resource::Products => &["products", "product", "data", "records", "results"],
            Resource::Sales => &["sales", "sale", "data", "records", "results"],
            Resource::Restock => &["restock", "receipts", "movements", "data", "records", "results"],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Sink Tables
// ============================================================================

/// A destination table in the sink store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTable {
    Products,
    Sales,
    SaleLines,
    /// Restock receipts are kept per location
    Restock { outlet: String },
}

impl SinkTable {
    /// Location-scoped restock table for an outlet code
    pub fn restock(outlet: impl Into<String>) -> Self {
        Self::Restock {
            outlet: outlet.into(),
        }
    }

    /// The SQL table name. Outlet codes are normalized to a safe identifier.
    pub fn name(&self) -> String {
        match self {
            SinkTable::Products => "products".to_string(),
            SinkTable::Sales => "sales".to_string(),
            SinkTable::SaleLines => "sale_lines".to_string(),
            SinkTable::Restock { outlet } => format!("restock_{}", sanitize_identifier(outlet)),
        }
    }
}

impl fmt::Display for SinkTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Lowercase a raw name and replace anything outside `[a-z0-9_]` so it can
/// be spliced into DDL as an identifier.
fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Sync Window
// ============================================================================

/// An inclusive day range `[start, end]` driving a sync run.
///
/// A single-day window is the degenerate case where `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl SyncWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_window(start, end));
        }
        Ok(Self { start, end })
    }

    /// A window covering exactly one day
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Windows are never empty by construction
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Days in strictly increasing order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for SyncWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` day
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::invalid_date(value))
}

// ============================================================================
// Fetch Parameters
// ============================================================================

/// Parameters the Endpoint Resolver turns into query strings.
///
/// Date filters are hints: the source MAY ignore them, so the client-side
/// filter is always applied afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchParams {
    /// Lower bound (inclusive) for the created date
    pub date_from: Option<NaiveDate>,
    /// Upper bound (inclusive) for the created date
    pub date_to: Option<NaiveDate>,
}

impl FetchParams {
    /// No filters (bulk fetch)
    pub fn none() -> Self {
        Self::default()
    }

    /// Both bounds pinned to one day
    pub fn day(day: NaiveDate) -> Self {
        Self {
            date_from: Some(day),
            date_to: Some(day),
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
