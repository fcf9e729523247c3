//! Google Sheets values API sink.
//!
//! Writes the whole clean batch (header row first) starting at the configured
//! range. The caller supplies an OAuth bearer token; obtaining one is outside
//! this crate.

use crate::config::SheetsConfig;
use crate::models::CleanProduct;
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

pub struct SheetsClient {
    inner: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
    range: String,
}

impl SheetsClient {
    /// `None` when the sink is not configured.
    pub fn from_config(config: &SheetsConfig, timeout: Duration) -> Result<Option<Self>> {
        let (Some(spreadsheet_id), Some(access_token)) =
            (config.spreadsheet_id.as_ref(), config.access_token.as_ref())
        else {
            return Ok(None);
        };

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Sheets HTTP client")?;

        Ok(Some(Self {
            inner,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.clone(),
            access_token: access_token.clone(),
            range: config.range.clone(),
        }))
    }

    pub fn sheet_url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.spreadsheet_id)
    }

    /// Overwrite the sheet with `products`. Returns the spreadsheet URL.
    pub async fn write_values(&self, products: &[CleanProduct]) -> Result<String> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}?valueInputOption=RAW",
            self.api_base, self.spreadsheet_id, self.range
        );
        debug!("PUT {} ({} rows)", url, products.len());

        let resp = self
            .inner
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&values_body(products))
            .send()
            .await
            .context("Sheets request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Sheets API answered HTTP {}: {}", status, body);
        }

        let sheet_url = self.sheet_url();
        info!("Wrote {} rows to {}", products.len(), sheet_url);
        Ok(sheet_url)
    }
}

fn values_body(products: &[CleanProduct]) -> Value {
    let header: Vec<Value> = CleanProduct::COLUMNS.iter().map(|c| json!(c)).collect();
    let rows = std::iter::once(header).chain(products.iter().map(CleanProduct::to_cells));
    json!({ "values": rows.collect::<Vec<_>>() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: Some("sheet123".to_string()),
            access_token: Some("token-abc".to_string()),
            api_base: api_base.to_string(),
            range: "A1".to_string(),
        }
    }

    fn product() -> CleanProduct {
        CleanProduct {
            title: "jacket 6".into(),
            price: 2_453_920.0,
            rating: 3.3,
            colors: 3,
            size: "S".into(),
            gender: "unisex".into(),
        }
    }

    #[test]
    fn test_unconfigured_is_none() {
        let cfg = SheetsConfig::default();
        assert!(SheetsClient::from_config(&cfg, Duration::from_secs(1)).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_values() {
        let server = MockServer::start().await;
        let expected = json!({
            "values": [
                ["title", "price", "rating", "colors", "size", "gender"],
                ["jacket 6", 2_453_920.0, 3.3, 3, "S", "unisex"],
            ]
        });
        Mock::given(method("PUT"))
            .and(path("/v4/spreadsheets/sheet123/values/A1"))
            .and(query_param("valueInputOption", "RAW"))
            .and(header("authorization", "Bearer token-abc"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedRows": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::from_config(&config(&server.uri()), Duration::from_secs(2))
            .unwrap()
            .unwrap();
        let url = client.write_values(&[product()]).await.unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/sheet123");
    }

    #[tokio::test]
    async fn test_api_error_fails() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let client = SheetsClient::from_config(&config(&server.uri()), Duration::from_secs(2))
            .unwrap()
            .unwrap();
        let err = client.write_values(&[product()]).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
