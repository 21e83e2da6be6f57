//! Uploaded file intake

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::layout::ScratchDir;
use crate::db::repositories::document::{DocType, Document, DocumentRepository, NewDocument};

/// Scratch folder for archive extraction, inside the workspace folder
const EXTRACT_DIR: &str = "temp";

/// A file received with a create-workspace request
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Path has no file name: {:?}", path))?;
        Ok(Self { file_name, bytes })
    }

    pub fn is_zip(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".zip")
    }

    /// Client-supplied name without any directory components
    fn base_name(&self) -> Result<String> {
        Path::new(&self.file_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .with_context(|| format!("Invalid upload file name: {:?}", self.file_name))
    }
}

/// Store an upload in the workspace folder and register one document per file.
///
/// Zip archives are extracted and flattened into the workspace root.
pub async fn intake_upload(
    documents: &DocumentRepository,
    workspace_id: &str,
    workspace_dir: &Path,
    upload: &Upload,
) -> Result<Vec<Document>> {
    let stored = if upload.is_zip() {
        extract_flattened(workspace_dir, &upload.bytes)?
    } else {
        let dest = workspace_dir.join(upload.base_name()?);
        std::fs::write(&dest, &upload.bytes)
            .with_context(|| format!("Failed to write upload to {:?}", dest))?;
        vec![dest]
    };

    let mut created = Vec::with_capacity(stored.len());
    for path in stored {
        let doc = documents
            .create(NewDocument {
                workspace_id: workspace_id.to_string(),
                doc_type: DocType::Other,
                file_path: path.to_string_lossy().to_string(),
                filing_date: None,
                reporting_date: None,
                doc_id: None,
            })
            .await?;
        debug!("Registered uploaded file {:?} as document {}", path, doc.id);
        created.push(doc);
    }

    info!(
        "Stored {} uploaded file(s) in workspace {}",
        created.len(),
        workspace_id
    );
    Ok(created)
}

fn extract_flattened(workspace_dir: &Path, bytes: &[u8]) -> Result<Vec<PathBuf>> {
    let scratch = ScratchDir::create(workspace_dir.join(EXTRACT_DIR))?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Invalid zip archive")?;
    archive
        .extract(scratch.path())
        .context("Failed to extract zip archive")?;

    let mut files = Vec::new();
    walk_sorted(scratch.path(), &mut files)?;

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = unique_destination(workspace_dir, &name.to_string_lossy());
        std::fs::copy(&file, &dest)
            .with_context(|| format!("Failed to copy {:?} to {:?}", file, dest))?;
        stored.push(dest);
    }
    Ok(stored)
}

/// Regular files under `dir`, depth first: each directory's files (by name)
/// before its subdirectories (by name).
fn walk_sorted(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            out.push(entry.path());
        }
    }
    for sub in subdirs {
        walk_sorted(&sub, out)?;
    }
    Ok(())
}

/// `dir/name`, or the first free `dir/{stem}_{n}{ext}` when taken
fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
