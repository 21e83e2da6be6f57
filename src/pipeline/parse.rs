//! Parse orchestration over registered documents

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::policy::FailurePolicy;
use super::status;
use crate::db::repositories::activity::{ActivityRepository, NewActivity};
use crate::db::repositories::document::Document;
use crate::db::repositories::parsed_document::{
    NewParsedDocument, ParsedDocument, ParsedDocumentRepository,
};
use crate::parser::DocumentParser;

/// Parse each document whose file exists, writing `{file}.json` next to it.
///
/// Without a parser the stage is skipped.
pub async fn parse_documents(
    parser: Option<&dyn DocumentParser>,
    parsed: &ParsedDocumentRepository,
    activities: &ActivityRepository,
    policy: FailurePolicy,
    workspace_id: &str,
    documents: &[Document],
) -> Result<Vec<ParsedDocument>> {
    let Some(parser) = parser else {
        warn!("No parser API key configured, skipping parsing for workspace {}", workspace_id);
        return Ok(Vec::new());
    };

    let mut done = Vec::new();
    for doc in documents {
        let path = Path::new(&doc.file_path);
        if !path.is_file() {
            debug!("Skipping parse of missing file {:?}", path);
            continue;
        }

        match parse_one(parser, parsed, activities, workspace_id, doc, path).await {
            Ok(row) => done.push(row),
            Err(e) => {
                policy
                    .handle(activities, workspace_id, &format!("Parsing failed: {}", file_label(path)), e)
                    .await?
            }
        }
    }
    Ok(done)
}

async fn parse_one(
    parser: &dyn DocumentParser,
    parsed: &ParsedDocumentRepository,
    activities: &ActivityRepository,
    workspace_id: &str,
    doc: &Document,
    path: &Path,
) -> Result<ParsedDocument> {
    let label = file_label(path);
    activities
        .create(NewActivity::sub(
            workspace_id,
            status::STARTED,
            "Parsing started",
            label.clone(),
        ))
        .await?;

    let json = parser.parse(path).await?;

    let out = path.with_extension("json");
    let body = serde_json::to_vec_pretty(&json)?;
    std::fs::write(&out, body).with_context(|| format!("Failed to write {:?}", out))?;

    let row = parsed
        .create(NewParsedDocument {
            workspace_id: workspace_id.to_string(),
            documents_id: doc.id.clone(),
            filepath: out.to_string_lossy().to_string(),
            status: false,
        })
        .await?;
    let row = parsed
        .mark_done(&row.id)
        .await?
        .with_context(|| format!("Parsed document {} vanished", row.id))?;

    activities
        .create(NewActivity::sub(
            workspace_id,
            status::COMPLETED,
            "Parsing completed",
            label,
        ))
        .await?;

    debug!("Parsed document {} into {:?}", doc.id, out);
    Ok(row)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
