//! CLI module
//!
//! Command-line interface for running syncs.
//!
//! # Commands
//!
//! - `sync` - Sync sales and restock for a location over a date range
//! - `products` - Sync the full product catalog
//! - `check` - Validate configuration and probe the source API
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{serve, ServerConfig};
