//! # tillsync
//!
//! A sync engine pulling products, sales and restock data from a POS
//! vendor API into a local DuckDB store.
//!
//! ## Features
//!
//! - **Endpoint fallback**: tries versioned candidate endpoints in order,
//!   so source API reshuffles don't break the sync
//! - **Paged fetching**: walks `page`/`rows` pagination until a short page
//! - **Client-side filtering**: re-applies day and location filters the
//!   source may have ignored
//! - **Conflict-safe upserts**: chunked insert-or-update by natural key,
//!   idempotent across reruns
//! - **Failure isolation**: a failed day or chunk never aborts the rest of
//!   the run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tillsync::config::AppConfig;
//! use tillsync::endpoints::EndpointResolver;
//! use tillsync::engine::RangeDriver;
//! use tillsync::fetch::Fetcher;
//! use tillsync::http::{HttpClient, RateLimiter};
//! use tillsync::sink::{DuckDbStore, SinkWriter};
//! use tillsync::types::{parse_day, SyncWindow};
//!
//! #[tokio::main]
//! async fn main() -> tillsync::Result<()> {
//!     let config = AppConfig::load(None)?;
//!
//!     let resolver = EndpointResolver::new(&config.endpoint_table(), &config.source)?;
//!     let fetcher = Fetcher::new(HttpClient::new(), RateLimiter::default(), resolver);
//!     let store = DuckDbStore::open(&config.sink.db_path)?;
//!     let mut driver = RangeDriver::new(fetcher, SinkWriter::new(store));
//!
//!     let window = SyncWindow::new(parse_day("2024-05-01")?, parse_day("2024-05-03")?)?;
//!     let result = driver.sync_range("MAIN", window).await;
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Range Driver                          │
//! │   one day at a time: fetch → filter → map → write, paced     │
//! └──────────────────────────────────────────────────────────────┘
//!                │                                  │
//! ┌──────────────┴───────────────┐   ┌──────────────┴─────────────┐
//! │       Paginated Fetcher      │   │       Sink Writer          │
//! ├──────────────────────────────┤   ├────────────────────────────┤
//! │ Endpoint Resolver (fallback) │   │ Chunked upserts by key     │
//! │ Rate Limiter (min interval)  │   │ DuckDB store               │
//! │ HTTP client (Basic auth)     │   │ count/keys verification    │
//! └──────────────────────────────┘   └────────────────────────────┘
//!                │
//! ┌──────────────┴───────────────┐
//! │    Filter + Record Mapper    │
//! │ day/outlet filters, flatten  │
//! │ nested records to rows       │
//! └──────────────────────────────┘
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for tillsync
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration loading, env overlay and validation
pub mod config;

/// Versioned endpoint candidates and request resolution
pub mod endpoints;

/// Typed source records and lenient parsing
pub mod records;

/// Client-side day and location filters
pub mod filter;

/// HTTP transport and rate limiting
pub mod http;

/// Paginated fetching with endpoint fallback
pub mod fetch;

/// Flattening source records into sink rows
pub mod map;

/// Upsert sink writer and DuckDB store
pub mod sink;

/// Range sync driver
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export the driver-facing surface
pub use engine::{RangeDriver, SyncResult};
pub use fetch::Fetcher;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
