//! SEC EDGAR HTTP client

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::downloader::{form_folder, FilingDownloader};
use super::{FormType, FULL_SUBMISSION_FILE};

const WWW_BASE: &str = "https://www.sec.gov";
const DATA_BASE: &str = "https://data.sec.gov";

/// SEC asks for at most 10 requests per second
const REQUEST_SPACING: Duration = Duration::from_millis(120);

/// EDGAR client that resolves a ticker to its CIK and fetches full submissions
pub struct EdgarClient {
    client: Client,
    www_base: String,
    data_base: String,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    accession_number: Vec<String>,
    filing_date: Vec<String>,
    form: Vec<String>,
}

impl EdgarClient {
    /// `user_agent` must identify the caller ("Company admin@example.com"); SEC rejects anonymous clients
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_urls(user_agent, WWW_BASE, DATA_BASE)
    }

    pub fn with_base_urls(
        user_agent: &str,
        www_base: impl Into<String>,
        data_base: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback if config fails

        Self {
            client,
            www_base: www_base.into(),
            data_base: data_base.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach EDGAR at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("EDGAR error: {} - {}", status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse EDGAR response from {}", url))
    }

    /// Resolve a ticker to its zero-padded CIK number
    async fn lookup_cik(&self, ticker: &str) -> Result<u64> {
        let url = format!("{}/files/company_tickers.json", self.www_base);
        let entries: HashMap<String, TickerEntry> = self.get_json(&url).await?;

        entries
            .into_values()
            .find(|entry| entry.ticker.eq_ignore_ascii_case(ticker))
            .map(|entry| entry.cik_str)
            .with_context(|| format!("Ticker {} not found on EDGAR", ticker))
    }

    async fn fetch_submission(&self, cik: u64, accession: &str) -> Result<String> {
        let url = format!(
            "{}/Archives/edgar/data/{}/{}/{}.txt",
            self.www_base,
            cik,
            accession.replace('-', ""),
            accession
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("EDGAR error: {} for {}", response.status(), url);
        }

        response.text().await.context("Failed to read filing body")
    }
}

#[async_trait]
impl FilingDownloader for EdgarClient {
    async fn download(
        &self,
        ticker: &str,
        form: FormType,
        after: NaiveDate,
        dest: &Path,
    ) -> Result<PathBuf> {
        let cik = self.lookup_cik(ticker).await?;
        let url = format!("{}/submissions/CIK{:010}.json", self.data_base, cik);
        let submissions: Submissions = self.get_json(&url).await?;
        let recent = submissions.filings.recent;

        let folder = form_folder(dest, ticker, form);
        std::fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create {:?}", folder))?;

        let mut downloaded = 0usize;
        for ((accession, filed), kind) in recent
            .accession_number
            .iter()
            .zip(&recent.filing_date)
            .zip(&recent.form)
        {
            if kind != form.as_str() {
                continue;
            }
            match filed_on_or_after(filed, after) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!("Skipping {} with unreadable filing date {}: {}", accession, filed, e);
                    continue;
                }
            }

            let body = self.fetch_submission(cik, accession).await?;
            let filing_dir = folder.join(accession);
            std::fs::create_dir_all(&filing_dir)?;
            std::fs::write(filing_dir.join(FULL_SUBMISSION_FILE), body)
                .with_context(|| format!("Failed to write filing {}", accession))?;
            debug!("Downloaded {} {} ({})", form.as_str(), accession, filed);
            downloaded += 1;

            tokio::time::sleep(REQUEST_SPACING).await;
        }

        info!("Downloaded {} {} filings for {}", downloaded, form.as_str(), ticker);
        Ok(folder)
    }
}

/// Whether an EDGAR `YYYY-MM-DD` filing date falls on or after the cutoff
fn filed_on_or_after(filed: &str, after: NaiveDate) -> Result<bool, chrono::ParseError> {
    Ok(NaiveDate::parse_from_str(filed, "%Y-%m-%d")? >= after)
}
