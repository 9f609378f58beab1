//! Sync driver
//!
//! Orchestrates fetch, filter, map, and write for a sync run. Strictly
//! sequential: one day at a time, in date order, with a pacing sleep between
//! days on top of the per-call rate limit. A failing day is logged and
//! counted; the run continues with the next day.

mod types;

pub use types::{SyncFailure, SyncResult};

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::filter::{filter_by_day, filter_by_outlet};
use crate::map::{product_rows, restock_row, sale_line_rows, sale_row, FlatRow};
use crate::records::{parse_records, ProductRecord, RestockRecord, SaleRecord};
use crate::sink::{SinkStore, SinkWriter, WriteOutcome};
use crate::types::{FetchParams, Resource, SinkTable, SyncWindow};
use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{info, warn};


/// Default pause between days of a range run
pub const DEFAULT_DAY_PACE: Duration = Duration::from_millis(2000);

/// Drives sync runs over a date range or the whole catalog
pub struct RangeDriver<S> {
    fetcher: Fetcher,
    writer: SinkWriter<S>,
    day_pace: Duration,
}

impl<S: SinkStore> RangeDriver<S> {
    /// Driver with the default day pacing
    pub fn new(fetcher: Fetcher, writer: SinkWriter<S>) -> Self {
        Self {
            fetcher,
            writer,
            day_pace: DEFAULT_DAY_PACE,
        }
    }

    /// Override the pause between days
    #[must_use]
    pub fn with_day_pace(mut self, pace: Duration) -> Self {
        self.day_pace = pace;
        self
    }

    /// Borrow the sink writer (verification queries)
    pub fn writer(&self) -> &SinkWriter<S> {
        &self.writer
    }

    /// Sync sales and restock for every day in the window, oldest first.
    ///
    /// Day failures are isolated: the failing day is counted and the run
    /// moves on. The pacing sleep runs between days, never after the last.
    pub async fn sync_range(&mut self, outlet: &str, window: SyncWindow) -> SyncResult {
        let start = Instant::now();
        let mut result = SyncResult::new();

        info!("Syncing {} for outlet {}", window, outlet);

        for (index, day) in window.days().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.day_pace).await;
            }

            match self.sync_day(outlet, day).await {
                Ok(outcome) => {
                    info!(
                        "Day {}: {} rows written, {} failed",
                        day, outcome.written, outcome.failed
                    );
                    result.record_unit(day.to_string(), outcome);
                }
                Err(e) => {
                    warn!("Sync failed for {}: {}", day, e);
                    result.record_failure(day.to_string(), e.to_string());
                }
            }
        }

        result.set_duration(start.elapsed().as_millis() as u64);
        result
    }

    /// Sync one day's sales (sale and sale-line tables) and restock
    /// (location-scoped table) for an outlet
    pub async fn sync_day(&mut self, outlet: &str, day: NaiveDate) -> Result<WriteOutcome> {
        let mut outcome = WriteOutcome::default();
        let params = FetchParams::day(day);

        let values = self.fetcher.fetch_all(Resource::Sales, &params).await?;
        let sales: Vec<SaleRecord> = parse_records(Resource::Sales, values);
        let sales = filter_by_outlet(filter_by_day(sales, day), outlet);

        let sale_rows: Vec<FlatRow> = sales.iter().map(sale_row).collect();
        let line_rows: Vec<FlatRow> = sales.iter().flat_map(sale_line_rows).collect();
        outcome.absorb(self.writer.write(&SinkTable::Sales, &sale_rows));
        outcome.absorb(self.writer.write(&SinkTable::SaleLines, &line_rows));

        let values = self.fetcher.fetch_all(Resource::Restock, &params).await?;
        let restock: Vec<RestockRecord> = parse_records(Resource::Restock, values);
        let restock = filter_by_outlet(filter_by_day(restock, day), outlet);

        let restock_rows: Vec<FlatRow> = restock.iter().map(restock_row).collect();
        outcome.absorb(self.writer.write(&SinkTable::restock(outlet), &restock_rows));

        Ok(outcome)
    }

    /// Sync the whole product catalog in one pass, no date or outlet filter
    pub async fn sync_products(&mut self) -> SyncResult {
        let start = Instant::now();
        let mut result = SyncResult::new();

        info!("Syncing product catalog");

        match self.products_pass().await {
            Ok(outcome) => {
                info!(
                    "Catalog: {} rows written, {} failed",
                    outcome.written, outcome.failed
                );
                result.record_unit(Resource::Products.name(), outcome);
            }
            Err(e) => {
                warn!("Catalog sync failed: {}", e);
                result.record_failure(Resource::Products.name(), e.to_string());
            }
        }

        result.set_duration(start.elapsed().as_millis() as u64);
        result
    }

    async fn products_pass(&mut self) -> Result<WriteOutcome> {
        let values = self
            .fetcher
            .fetch_all(Resource::Products, &FetchParams::none())
            .await?;
        let products: Vec<ProductRecord> = parse_records(Resource::Products, values);

        let rows: Vec<FlatRow> = products.iter().flat_map(product_rows).collect();
        Ok(self.writer.write(&SinkTable::Products, &rows))
    }
}
