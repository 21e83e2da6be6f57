//! Filing intake for one form type

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::status;
use crate::db::repositories::activity::{ActivityRepository, NewActivity};
use crate::db::repositories::document::{Document, DocumentRepository, NewDocument};
use crate::filings::{
    extract_dates, filings_cutoff, submission_dirs, FilingDownloader, FormType,
    FULL_SUBMISSION_FILE,
};

/// Download every `form` filing for `ticker` into `scratch`, copy each raw
/// submission into the workspace folder and register it as a document.
///
/// Registered documents are pushed onto `created` as they are committed, so
/// the caller keeps them when a later filing fails. Returns how many were added.
#[allow(clippy::too_many_arguments)]
pub async fn intake_filings(
    downloader: &dyn FilingDownloader,
    documents: &DocumentRepository,
    activities: &ActivityRepository,
    workspace_id: &str,
    workspace_dir: &Path,
    ticker: &str,
    form: FormType,
    scratch: &Path,
    created: &mut Vec<Document>,
) -> Result<usize> {
    let folder = downloader
        .download(ticker, form, filings_cutoff(), scratch)
        .await
        .with_context(|| format!("Failed to download {} filings for {}", form.as_str(), ticker))?;

    let mut added = 0usize;
    for (filing_dir, submission) in submission_dirs(&folder)? {
        let (filing_date, reporting_date) = extract_dates(&submission)?.formatted();

        let dest = workspace_dir.join(format!(
            "{}_{}_{}",
            form.as_str(),
            filing_dir,
            FULL_SUBMISSION_FILE
        ));
        std::fs::copy(&submission, &dest)
            .with_context(|| format!("Failed to copy {:?} to {:?}", submission, dest))?;

        let doc = documents
            .create(NewDocument {
                workspace_id: workspace_id.to_string(),
                doc_type: form.doc_type(),
                file_path: dest.to_string_lossy().to_string(),
                filing_date: filing_date.clone(),
                reporting_date,
                doc_id: Some(filing_dir.clone()),
            })
            .await?;

        activities
            .create(NewActivity::sub(
                workspace_id,
                status::COMPLETED,
                &format!("{} filing added", form.as_str()),
                format!(
                    "{} filed {}",
                    filing_dir,
                    filing_date.as_deref().unwrap_or("on an unknown date")
                ),
            ))
            .await?;

        debug!("Registered {} filing {} as document {}", form.as_str(), filing_dir, doc.id);
        created.push(doc);
        added += 1;
    }

    info!(
        "Added {} {} filing(s) for {} to workspace {}",
        added,
        form.as_str(),
        ticker,
        workspace_id
    );
    Ok(added)
}
