//! CLI commands and argument parsing

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Till data synchronization CLI
#[derive(Parser, Debug)]
#[command(name = "tillsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file path (overrides config)
    #[arg(short, long, global = true)]
    pub db: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync sales and restock for one location over a date range
    Sync {
        /// Location code, matched against the prefix of sale references
        #[arg(short, long)]
        location: String,

        /// First day of the range (ISO date, defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the range (ISO date, defaults to start)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Single-day shorthand, sets both start and end
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<NaiveDate>,
    },

    /// Sync the full product catalog
    Products,

    /// Validate configuration and probe the source API
    Check,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}
