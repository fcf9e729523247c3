use crate::config::ScraperConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::PageSource;

/// Result of one GET. Transport trouble is a value, not an error: callers
/// treat it as "page unavailable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Content(String),
    Unavailable(String),
}

pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, PipelineError> {
        let base_url = validate_base_url(&config.base_url)?;

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| PipelineError::invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { inner, base_url })
    }

    /// Page 1 is the catalog root; page N lives at `{base}/pageN`.
    pub fn page_url(&self, page: u32) -> Result<String, PipelineError> {
        page_url(&self.base_url, page)
    }

    /// Fetch a URL as text. Every failure collapses to `Unavailable`.
    pub async fn get_text(&self, url: &str) -> FetchOutcome {
        debug!("GET {}", url);

        let resp = match self.inner.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return FetchOutcome::Unavailable(format!("request error: {e}"));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!("{} answered HTTP {}", url, status);
            return FetchOutcome::Unavailable(format!("HTTP {status}"));
        }

        match resp.text().await {
            Ok(body) => FetchOutcome::Content(body),
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                FetchOutcome::Unavailable(format!("body error: {e}"))
            }
        }
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, page: u32) -> Result<FetchOutcome, PipelineError> {
        let url = self.page_url(page)?;
        Ok(self.get_text(&url).await)
    }
}

fn validate_base_url(raw: &str) -> Result<String, PipelineError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PipelineError::invalid("base URL must not be empty"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| PipelineError::invalid(format!("base URL {trimmed:?}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(PipelineError::invalid(format!(
            "base URL {trimmed:?} has unsupported scheme {other:?}"
        ))),
    }
}

pub fn page_url(base_url: &str, page: u32) -> Result<String, PipelineError> {
    match page {
        0 => Err(PipelineError::invalid("page number must be >= 1")),
        1 => Ok(base_url.to_string()),
        n => Ok(format!("{base_url}/page{n}")),
    }
}
