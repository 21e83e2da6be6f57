//! Filing downloader trait

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::FormType;

/// Source of raw SEC filings.
///
/// Implementations write one directory per filing, each holding a
/// `full-submission.txt`, and return the folder containing those directories.
#[async_trait]
pub trait FilingDownloader: Send + Sync {
    async fn download(
        &self,
        ticker: &str,
        form: FormType,
        after: NaiveDate,
        dest: &Path,
    ) -> Result<PathBuf>;
}

/// Folder every downloader writes under inside its destination
pub const STAGING_DIR: &str = "sec-edgar-filings";

/// `{dest}/sec-edgar-filings/{TICKER}/{form}`
pub fn form_folder(dest: &Path, ticker: &str, form: FormType) -> PathBuf {
    dest.join(STAGING_DIR).join(ticker).join(form.as_str())
}
