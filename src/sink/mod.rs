//! Upsert sink
//!
//! Two layers: [`SinkStore`] is the storage collaborator (DuckDB in
//! production, scriptable fakes in tests), [`SinkWriter`] chunks rows and
//! keeps going when a chunk fails. Each store upsert is atomic per call, so
//! a failed chunk loses only its own rows.

mod duckdb;

pub use self::duckdb::DuckDbStore;

use crate::error::Result;
use crate::map::{FlatRow, KEY_COLUMN};
use crate::types::SinkTable;
use tracing::warn;


/// Default rows per upsert statement
pub const DEFAULT_CHUNK_SIZE: usize = 100;

// ============================================================================
// Store Trait
// ============================================================================

/// A relational store that can replace rows by natural key
pub trait SinkStore {
    /// Insert rows, replacing existing rows with the same `conflict_key`
    /// value. All rows in one call share a column layout. Atomic per call:
    /// either every row lands or none do. Returns the row count on success.
    fn upsert(&mut self, table: &SinkTable, conflict_key: &str, rows: &[FlatRow]) -> Result<usize>;

    /// Row count of a table
    fn count(&self, table: &SinkTable) -> Result<usize>;

    /// Natural keys of a table, sorted
    fn keys(&self, table: &SinkTable) -> Result<Vec<String>>;
}

// ============================================================================
// Writer
// ============================================================================

/// Row counts for one write call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows upserted
    pub written: usize,
    /// Rows lost to failed chunks
    pub failed: usize,
}

impl WriteOutcome {
    /// Fold another outcome into this one
    pub fn absorb(&mut self, other: WriteOutcome) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

/// Chunks rows and upserts them through a [`SinkStore`].
///
/// A failed chunk is logged and counted; later chunks still run. Chunk
/// failures therefore never surface as errors, only in the outcome.
#[derive(Debug)]
pub struct SinkWriter<S> {
    store: S,
    chunk_size: usize,
}

impl<S: SinkStore> SinkWriter<S> {
    /// Writer with the default chunk size
    pub fn new(store: S) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Upsert all rows into `table`, one store call per chunk
    pub fn write(&mut self, table: &SinkTable, rows: &[FlatRow]) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();
        for chunk in rows.chunks(self.chunk_size) {
            match self.store.upsert(table, KEY_COLUMN, chunk) {
                Ok(written) => outcome.written += written,
                Err(e) => {
                    warn!(
                        "Failed to write chunk of {} rows to {}: {}",
                        chunk.len(),
                        table,
                        e
                    );
                    outcome.failed += chunk.len();
                }
            }
        }
        outcome
    }

    /// Borrow the underlying store (verification queries)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
