//! Engine types
//!
//! Result accounting for sync runs.

use crate::sink::WriteOutcome;

/// One failed sync unit and why it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// The unit that failed (a day for range runs, "products" for bulk)
    pub unit: String,
    /// Human-readable reason
    pub reason: String,
}

/// Accumulated outcome of one sync run.
///
/// Units are days for a range run and the whole catalog for a bulk run. A
/// unit counts as `synced` when it wrote at least one row; a unit that
/// yielded no records at all is `empty`, never `failed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncResult {
    /// Units that wrote at least one row
    pub synced: usize,
    /// Units that yielded no records
    pub empty: usize,
    /// Units that errored or lost every row
    pub failed: usize,
    /// Rows upserted across all units
    pub rows_written: usize,
    /// Rows lost to failed chunks
    pub rows_failed: usize,
    /// Per-unit failure reasons
    pub failures: Vec<SyncFailure>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl SyncResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Total units attempted
    pub fn units(&self) -> usize {
        self.synced + self.empty + self.failed
    }

    /// True when nothing failed, not even a chunk
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.rows_failed == 0
    }

    /// Fold one unit's write outcome into the result
    pub fn record_unit(&mut self, unit: impl Into<String>, outcome: WriteOutcome) {
        self.rows_written += outcome.written;
        self.rows_failed += outcome.failed;

        if outcome.written > 0 {
            self.synced += 1;
        } else if outcome.failed > 0 {
            self.failed += 1;
            self.failures.push(SyncFailure {
                unit: unit.into(),
                reason: format!("all {} rows failed to write", outcome.failed),
            });
        } else {
            self.empty += 1;
        }
    }

    /// Record a unit that errored before producing an outcome
    pub fn record_failure(&mut self, unit: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(SyncFailure {
            unit: unit.into(),
            reason: reason.into(),
        });
    }

    /// Set the run duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// One human-readable line for the operator
    pub fn summary(&self) -> String {
        format!(
            "{} units synced, {} empty, {} failed; {} rows written, {} failed ({} ms)",
            self.synced,
            self.empty,
            self.failed,
            self.rows_written,
            self.rows_failed,
            self.duration_ms
        )
    }
}
