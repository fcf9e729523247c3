pub mod database;
pub mod files;
pub mod sheets;

use crate::config::{AppConfig, SheetsConfig, StorageConfig};
use crate::models::{CleanProduct, LoadResult};
use anyhow::Result;
use std::time::Duration;
use tracing::{error, warn};

pub use self::database::Repository;
use self::sheets::SheetsClient;

/// The three write targets for a clean batch.
pub struct Sinks {
    storage: StorageConfig,
    sheets: SheetsConfig,
    timeout: Duration,
}

impl Sinks {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            storage: config.storage.clone(),
            sheets: config.sheets.clone(),
            timeout: Duration::from_secs(config.scraper.timeout_secs),
        }
    }

    /// Try every sink in turn. A failing sink is logged and reported in the
    /// result; it never stops the others.
    pub async fn load(&self, products: &[CleanProduct]) -> LoadResult {
        let csv_saved = match files::write_csv(&self.storage.clean_csv_path, products) {
            Ok(()) => true,
            Err(e) => {
                error!("CSV sink failed: {:#}", e);
                false
            }
        };

        let sheets_url = match self.write_sheets(products).await {
            Ok(url) => url,
            Err(e) => {
                error!("Sheets sink failed: {:#}", e);
                None
            }
        };

        let db_saved = match self.write_database(products) {
            Ok(n) => n == products.len(),
            Err(e) => {
                error!("Database sink failed: {:#}", e);
                false
            }
        };

        LoadResult {
            csv_saved,
            sheets_url,
            db_saved,
        }
    }

    async fn write_sheets(&self, products: &[CleanProduct]) -> Result<Option<String>> {
        let Some(client) = SheetsClient::from_config(&self.sheets, self.timeout)? else {
            warn!("Sheets sink not configured (spreadsheet_id / access_token), skipping");
            return Ok(None);
        };
        Ok(Some(client.write_values(products).await?))
    }

    fn write_database(&self, products: &[CleanProduct]) -> Result<usize> {
        let repo = Repository::open(&self.storage.db_path)?;
        if self.storage.run_migrations {
            repo.run_migrations()?;
        }
        repo.replace_products(products)
    }
}
