//! SEC filing retrieval and header scanning

pub mod archive;
pub mod dates;
pub mod downloader;
pub mod edgar;

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repositories::document::DocType;

pub use dates::{extract_dates, format_filing_date, FilingDates};
pub use downloader::FilingDownloader;
pub use edgar::EdgarClient;

/// Name of the raw submission file inside each downloaded filing directory
pub const FULL_SUBMISSION_FILE: &str = "full-submission.txt";

/// Only filings on or after this date are fetched
pub fn filings_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FormType {
    #[serde(rename = "10-K")]
    TenK,
    #[serde(rename = "10-Q")]
    TenQ,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::TenK => "10-K",
            FormType::TenQ => "10-Q",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "10-K" => Ok(FormType::TenK),
            "10-Q" => Ok(FormType::TenQ),
            _ => anyhow::bail!("Unknown form type: {}", s),
        }
    }

    /// Document type recorded for filings of this form (`10-K` -> `10_K`)
    pub fn doc_type(&self) -> DocType {
        match self {
            FormType::TenK => DocType::TenK,
            FormType::TenQ => DocType::TenQ,
        }
    }
}

/// Reporting interval accepted by the standalone filings endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Quarterly,
    Yearly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Quarterly => "quarterly",
            Interval::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "quarterly" => Ok(Interval::Quarterly),
            "yearly" => Ok(Interval::Yearly),
            _ => anyhow::bail!("Invalid interval. Use 'quarterly' or 'yearly'"),
        }
    }

    pub fn form_type(&self) -> FormType {
        match self {
            Interval::Quarterly => FormType::TenQ,
            Interval::Yearly => FormType::TenK,
        }
    }
}

/// Filing directories (sorted by name) under a downloader output folder that
/// hold a raw submission file.
pub fn submission_dirs(form_folder: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    if !form_folder.exists() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(form_folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let submission = entry.path().join(FULL_SUBMISSION_FILE);
        if submission.is_file() {
            dirs.push((entry.file_name().to_string_lossy().to_string(), submission));
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_type_maps_to_underscored_doc_type() {
        assert_eq!(FormType::TenK.doc_type().as_str(), "10_K");
        assert_eq!(FormType::TenQ.doc_type().as_str(), "10_Q");
    }

    #[test]
    fn interval_accepts_only_two_values() {
        assert_eq!(Interval::from_str("quarterly").unwrap().form_type(), FormType::TenQ);
        assert_eq!(Interval::from_str("yearly").unwrap().form_type(), FormType::TenK);
        assert!(Interval::from_str("monthly").is_err());
        assert!(Interval::from_str("Yearly").is_err());
    }

    #[test]
    fn submission_dirs_skip_folders_without_raw_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let with = temp.path().join("0000320193-23-000064");
        let without = temp.path().join("0000320193-22-000001");
        std::fs::create_dir_all(&with).unwrap();
        std::fs::create_dir_all(&without).unwrap();
        std::fs::write(with.join(FULL_SUBMISSION_FILE), b"x").unwrap();

        let dirs = submission_dirs(temp.path()).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].0, "0000320193-23-000064");
    }
}
