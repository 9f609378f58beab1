//! Client-side filtering
//!
//! Several source API generations accept date filters and then ignore them,
//! and no generation filters by outlet at all. Fetched records are therefore
//! always filtered locally before mapping, whatever the request asked for.

use crate::records::{RestockRecord, SaleRecord};
use chrono::NaiveDate;

/// Outlet code separator in order references ("MAIN-0042")
pub const OUTLET_SEPARATOR: char = '-';

// ============================================================================
// Accessor Traits
// ============================================================================

/// Carries a best-available created/received timestamp
pub trait Stamped {
    /// Timestamp string in the source's RFC3339-ish format, if any known
    /// spelling is present
    fn created_stamp(&self) -> Option<&str>;
}

/// Carries an order/receipt reference
pub trait Referenced {
    /// Reference string ("<OUTLET>-<number>"), if present
    fn reference(&self) -> Option<&str>;
}

impl Stamped for SaleRecord {
    fn created_stamp(&self) -> Option<&str> {
        SaleRecord::created_stamp(self)
    }
}

impl Referenced for SaleRecord {
    fn reference(&self) -> Option<&str> {
        SaleRecord::reference(self)
    }
}

impl Stamped for RestockRecord {
    fn created_stamp(&self) -> Option<&str> {
        RestockRecord::created_stamp(self)
    }
}

impl Referenced for RestockRecord {
    fn reference(&self) -> Option<&str> {
        RestockRecord::reference(self)
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Keep records stamped on exactly `day`.
///
/// The comparison is textual: the first ten bytes of the stamp against the
/// ISO day. Timezone suffixes are deliberately ignored, matching how the
/// source stamps records in store-local time. Records with no stamp are
/// dropped.
pub fn filter_by_day<T: Stamped>(records: Vec<T>, day: NaiveDate) -> Vec<T> {
    let day = day.to_string();
    records
        .into_iter()
        .filter(|record| {
            record
                .created_stamp()
                .and_then(|stamp| stamp.get(..10))
                .is_some_and(|date_part| date_part == day)
        })
        .collect()
}

/// Keep records whose reference prefix equals the outlet code verbatim.
///
/// No case folding, no trimming. Records with no reference are dropped.
pub fn filter_by_outlet<T: Referenced>(records: Vec<T>, outlet: &str) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| {
            record
                .reference()
                .is_some_and(|reference| outlet_of(reference) == outlet)
        })
        .collect()
}

/// The outlet prefix of a reference (everything before the first separator,
/// or the whole reference when there is none)
pub fn outlet_of(reference: &str) -> &str {
    reference
        .split_once(OUTLET_SEPARATOR)
        .map_or(reference, |(prefix, _)| prefix)
}
