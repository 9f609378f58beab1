//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::endpoints::EndpointResolver;
use crate::engine::RangeDriver;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::http::{HttpClient, HttpClientConfig, RateLimiter};
use crate::sink::{DuckDbStore, SinkWriter};
use crate::types::{Resource, SyncWindow};
use chrono::{Local, NaiveDate};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Sync {
                location,
                start,
                end,
                date,
            } => self.sync(location, *start, *end, *date).await,
            Commands::Products => self.products().await,
            Commands::Check => self.check().await,
            Commands::Serve { port } => {
                let config = crate::cli::ServerConfig {
                    config_path: self.cli.config.clone(),
                    db_path: self.cli.db.clone(),
                };
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Load configuration with the CLI database override applied
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;
        if let Some(db) = &self.cli.db {
            config.sink.db_path = db.clone();
        }
        Ok(config)
    }

    /// Build a fetcher against the configured source
    fn build_fetcher(config: &AppConfig, limiter: RateLimiter) -> Result<Fetcher> {
        let resolver = EndpointResolver::new(&config.endpoint_table(), &config.source)?;
        let http_config = HttpClientConfig::builder()
            .timeout(config.source.timeout())
            .user_agent(&config.source.user_agent)
            .build();
        let client = HttpClient::with_config(http_config);
        Ok(Fetcher::new(client, limiter, resolver).with_page_size(config.sync.page_size as u32))
    }

    /// Build the full sync driver: fetcher, sink writer, pacing
    fn build_driver(config: &AppConfig) -> Result<RangeDriver<DuckDbStore>> {
        let limiter = RateLimiter::spaced(config.sync.min_interval());
        let fetcher = Self::build_fetcher(config, limiter)?;
        let store = DuckDbStore::open(&config.sink.db_path)?;
        let writer = SinkWriter::new(store).with_chunk_size(config.sync.chunk_size);
        Ok(RangeDriver::new(fetcher, writer).with_day_pace(config.sync.day_pace()))
    }

    /// Resolve the day window from the date flags. `--date` pins a single
    /// day; otherwise `--start`/`--end` default to today and to the start
    /// day respectively.
    fn resolve_window(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        date: Option<NaiveDate>,
    ) -> Result<SyncWindow> {
        if let Some(day) = date {
            return Ok(SyncWindow::single(day));
        }
        let start = start.unwrap_or_else(|| Local::now().date_naive());
        let end = end.unwrap_or(start);
        SyncWindow::new(start, end)
    }

    /// Sync sales and restock for a location over the requested window
    async fn sync(
        &self,
        location: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        date: Option<NaiveDate>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let window = Self::resolve_window(start, end, date)?;
        let mut driver = Self::build_driver(&config)?;

        let result = driver.sync_range(location, window).await;
        println!("{}", result.summary());
        Ok(())
    }

    /// Sync the full product catalog
    async fn products(&self) -> Result<()> {
        let config = self.load_config()?;
        let mut driver = Self::build_driver(&config)?;

        let result = driver.sync_products().await;
        println!("{}", result.summary());
        Ok(())
    }

    /// Validate configuration and probe the source with a single products
    /// sweep. Config errors propagate; an unreachable source is reported,
    /// not thrown.
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        info!("Checking connection to {}", config.source.base_url);

        let fetcher = Self::build_fetcher(&config, RateLimiter::disabled())?;
        match fetcher.probe(Resource::Products).await {
            Ok(count) => {
                println!("Connection successful: products answered with {count} record(s)");
            }
            Err(e) => println!("Connection failed: {e}"),
        }
        Ok(())
    }
}
