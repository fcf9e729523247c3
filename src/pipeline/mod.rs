//! Pipeline orchestrator: scraper → cleaner → sinks.
//!
//! ## Stages
//!
//! `extract()`: crawl the catalog page range into raw text records.
//! `transform()`: normalize a raw batch (currency, numbers, labels, dedup).
//! `load()`: hand the clean batch to the CSV, Sheets and DuckDB sinks.
//!
//! `run()` chains all three and also keeps the raw batch on disk, so a later
//! `transform` can be re-run without scraping again.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::{CleanProduct, LoadResult, PageRange, RawProduct};
use crate::scraper::cleaner::Cleaner;
use crate::scraper::http_client::HttpClient;
use crate::scraper::FashionScraper;
use crate::storage::files::write_csv;
use crate::storage::Sinks;
use crate::utils::Timer;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn extract(&self, range: PageRange) -> Result<Vec<RawProduct>, PipelineError> {
        let _t = Timer::start("Extract");
        let scraper_cfg = &self.config.scraper;
        let scraper = FashionScraper::new(
            HttpClient::new(scraper_cfg)?,
            scraper_cfg.selectors.clone(),
            Duration::from_millis(scraper_cfg.request_delay_ms),
        );
        scraper.crawl(range).await
    }

    pub fn transform(&self, raw: Vec<RawProduct>) -> Result<Vec<CleanProduct>, PipelineError> {
        let _t = Timer::start("Transform");
        let cleaner = Cleaner::new(self.config.transform.exchange_rate)?;
        Ok(cleaner.clean(raw))
    }

    pub async fn load(&self, clean: &[CleanProduct]) -> LoadResult {
        let _t = Timer::start("Load");
        Sinks::new(&self.config).load(clean).await
    }

    pub async fn run(&self, range: PageRange) -> Result<PipelineStats> {
        info!(
            "=== Extract: pages {}..={} (max {} products) ===",
            range.start(),
            range.end(),
            range.max_products()
        );
        let raw = self.extract(range).await?;
        let raw_count = raw.len();

        let raw_path = &self.config.storage.raw_csv_path;
        write_csv(raw_path, &raw).context("Failed to save raw batch")?;

        info!("=== Transform: {} raw rows ===", raw_count);
        let clean = self.transform(raw)?;

        info!("=== Load: {} clean rows ===", clean.len());
        let load = self.load(&clean).await;

        let stats = PipelineStats {
            raw_count,
            clean_count: clean.len(),
            load,
        };
        info!(
            "=== Done: {} raw | {} clean | csv={} sheets={:?} db={} ===",
            stats.raw_count,
            stats.clean_count,
            stats.load.csv_saved,
            stats.load.sheets_url,
            stats.load.db_saved,
        );
        Ok(stats)
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub raw_count: usize,
    pub clean_count: usize,
    pub load: LoadResult,
}
