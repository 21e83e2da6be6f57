//! Standalone per-ticker filing archive (`GET /filings`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::downloader::{FilingDownloader, STAGING_DIR};
use crate::core::layout::{path_component, ScratchDir};
use super::{extract_dates, filings_cutoff, submission_dirs, Interval};

/// One line of the archive's `data.csv`. Missing dates are empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilingRecord {
    pub form_type: String,
    pub form_file: String,
    pub filing_date: String,
    pub reporting_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub ticker: String,
    pub interval: Interval,
    pub filings_count: usize,
    pub saved_to: String,
}

/// Download one interval's filings into `{data_root}/{TICKER}/{form}` and
/// index them in `{data_root}/{TICKER}/data.csv`.
pub async fn download_to_archive(
    downloader: &dyn FilingDownloader,
    data_root: &Path,
    ticker: &str,
    interval: Interval,
) -> Result<ArchiveSummary> {
    let ticker = path_component(ticker)?.to_uppercase();
    let form = interval.form_type();
    let base_path = data_root.join(&ticker);
    std::fs::create_dir_all(&base_path)?;
    let staging = ScratchDir::create(base_path.join(STAGING_DIR))?;

    let downloaded = downloader
        .download(&ticker, form, filings_cutoff(), &base_path)
        .await?;

    let final_folder = base_path.join(form.as_str());
    let mut records = Vec::new();
    if downloaded.exists() {
        if final_folder.exists() {
            std::fs::remove_dir_all(&final_folder)?;
        }
        std::fs::rename(&downloaded, &final_folder)
            .with_context(|| format!("Failed to move filings into {:?}", final_folder))?;

        for (_, submission) in submission_dirs(&final_folder)? {
            let dates = extract_dates(&submission)?;
            records.push(FilingRecord {
                form_type: form.as_str().to_string(),
                form_file: submission.to_string_lossy().to_string(),
                filing_date: dates.filing_date.unwrap_or_default(),
                reporting_date: dates.reporting_date.unwrap_or_default(),
            });
        }
    }

    drop(staging);

    let csv_path = base_path.join("data.csv");
    write_records(&csv_path, &records)?;

    info!("Archived {} {} filings for {}", records.len(), form.as_str(), ticker);

    Ok(ArchiveSummary {
        ticker,
        interval,
        filings_count: records.len(),
        saved_to: csv_path.to_string_lossy().to_string(),
    })
}

fn write_records(path: &PathBuf, records: &[FilingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    if records.is_empty() {
        writer.write_record(["form_type", "form_file", "filing_date", "reporting_date"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
