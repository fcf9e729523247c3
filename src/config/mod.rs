use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PipelineError;
use crate::models::PageRange;
use crate::scraper::cleaner::DEFAULT_EXCHANGE_RATE;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_start_page")]
    pub start_page: u32,

    #[serde(default = "default_end_page")]
    pub end_page: u32,

    #[serde(default = "default_max_products")]
    pub max_products: usize,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// CSS selectors for the catalog layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorConfig {
    #[serde(default = "default_card_selector")]
    pub card: String,
    #[serde(default = "default_details_selector")]
    pub details: String,
    #[serde(default = "default_title_selector")]
    pub title: String,
    #[serde(default = "default_price_selector")]
    pub price: String,
    #[serde(default = "default_price_fallback_selector")]
    pub price_fallback: String,
    /// Paragraph-like fragments scanned for "Rating:", "Colors", "Size:", "Gender:"
    #[serde(default = "default_text_selector")]
    pub text: String,
}

/// Transform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_raw_csv_path")]
    pub raw_csv_path: PathBuf,

    #[serde(default = "default_clean_csv_path")]
    pub clean_csv_path: PathBuf,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Google Sheets sink. Skipped unless both id and token are set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// OAuth bearer token with the spreadsheets scope.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,

    #[serde(default = "default_sheets_range")]
    pub range: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://fashion-studio.dicoding.dev".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_request_delay_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
fn default_start_page() -> u32 {
    1
}
fn default_end_page() -> u32 {
    50
}
fn default_max_products() -> usize {
    1000
}
fn default_card_selector() -> String {
    "div.collection-card".to_string()
}
fn default_details_selector() -> String {
    "div.product-details".to_string()
}
fn default_title_selector() -> String {
    "h3.product-title".to_string()
}
fn default_price_selector() -> String {
    "span.price".to_string()
}
fn default_price_fallback_selector() -> String {
    "p.price".to_string()
}
fn default_text_selector() -> String {
    "p".to_string()
}
fn default_exchange_rate() -> f64 {
    DEFAULT_EXCHANGE_RATE
}
fn default_raw_csv_path() -> PathBuf {
    PathBuf::from("raw_fashion_data.csv")
}
fn default_clean_csv_path() -> PathBuf {
    PathBuf::from("clean_fashion_data.csv")
}
fn default_db_path() -> PathBuf {
    PathBuf::from("data/fashion.duckdb")
}
fn default_true() -> bool {
    true
}
fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}
fn default_sheets_range() -> String {
    "A1".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
            start_page: default_start_page(),
            end_page: default_end_page(),
            max_products: default_max_products(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: default_card_selector(),
            details: default_details_selector(),
            title: default_title_selector(),
            price: default_price_selector(),
            price_fallback: default_price_fallback_selector(),
            text: default_text_selector(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            exchange_rate: default_exchange_rate(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            raw_csv_path: default_raw_csv_path(),
            clean_csv_path: default_clean_csv_path(),
            db_path: default_db_path(),
            run_migrations: true,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            api_base: default_sheets_api_base(),
            range: default_sheets_range(),
        }
    }
}

impl ScraperConfig {
    /// Page range from config, with optional CLI overrides.
    pub fn page_range(
        &self,
        start: Option<u32>,
        end: Option<u32>,
        max: Option<usize>,
    ) -> Result<PageRange, PipelineError> {
        PageRange::new(
            start.unwrap_or(self.start_page),
            end.unwrap_or(self.end_page),
            max.unwrap_or(self.max_products),
        )
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FASHION").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
