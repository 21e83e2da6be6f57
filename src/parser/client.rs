//! Document parsing HTTP API client

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, error, info};

use super::DocumentParser;

/// Default parse endpoint
pub const DEFAULT_PARSE_URL: &str = "https://api.va.landing.ai/v1/ade/parse";

/// Uploads a file as multipart `document` and returns the JSON body
pub struct ParseApiClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ParseApiClient {
    /// Create a new client; parsing large filings can take minutes
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback if config fails

        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl DocumentParser for ParseApiClient {
    async fn parse(&self, path: &Path) -> Result<serde_json::Value> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        debug!("Uploading {} ({} bytes) for parsing", file_name, bytes.len());

        let form = Form::new().part("document", Part::bytes(bytes).file_name(file_name.clone()));

        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("Parse API HTTP error: {}", e);
                return Err(e).context("Failed to connect to parse API");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Parse API error: {} - {}", status, body);
        }

        let result: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse parse API response")?;

        info!("Parsed {}", file_name);
        Ok(result)
    }
}
