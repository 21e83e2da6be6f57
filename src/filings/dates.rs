//! Filing and reporting dates from the SEC header of a raw submission

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Only the start of the file is scanned; the SEC header sits there.
pub const HEADER_SCAN_BYTES: u64 = 5000;

static FILED_AS_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"FILED AS OF DATE:\s*(\d{8})").expect("valid regex"));

static PERIOD_OF_REPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CONFORMED PERIOD OF REPORT:\s*(\d{8})").expect("valid regex"));

/// Raw `YYYYMMDD` values; either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingDates {
    pub filing_date: Option<String>,
    pub reporting_date: Option<String>,
}

impl FilingDates {
    /// Both dates as `YYYY/MM/DD`
    pub fn formatted(&self) -> (Option<String>, Option<String>) {
        (
            self.filing_date.as_deref().map(format_filing_date),
            self.reporting_date.as_deref().map(format_filing_date),
        )
    }
}

/// Scan the first [`HEADER_SCAN_BYTES`] of `path`. Invalid UTF-8 is decoded lossily.
pub fn extract_dates(path: &Path) -> Result<FilingDates> {
    let file = File::open(path).with_context(|| format!("Failed to open filing {:?}", path))?;

    let mut buffer = Vec::with_capacity(HEADER_SCAN_BYTES as usize);
    file.take(HEADER_SCAN_BYTES)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read filing {:?}", path))?;

    Ok(extract_dates_from_str(&String::from_utf8_lossy(&buffer)))
}

pub fn extract_dates_from_str(content: &str) -> FilingDates {
    let capture = |re: &Regex| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    FilingDates {
        filing_date: capture(&FILED_AS_OF),
        reporting_date: capture(&PERIOD_OF_REPORT),
    }
}

/// `YYYYMMDD` -> `YYYY/MM/DD` by position. No calendar validation.
pub fn format_filing_date(raw: &str) -> String {
    let year: String = raw.chars().take(4).collect();
    let month: String = raw.chars().skip(4).take(2).collect();
    let day: String = raw.chars().skip(6).collect();
    format!("{}/{}/{}", year, month, day)
}
