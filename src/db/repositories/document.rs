//! Document repository

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::nullable;
use crate::core::ids::new_entity_id;
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub workspace_id: String,
    pub doc_type: DocType,
    pub file_path: String,
    /// `YYYY/MM/DD`
    pub filing_date: Option<String>,
    /// `YYYY/MM/DD`
    pub reporting_date: Option<String>,
    /// Filing accession number for downloaded filings
    pub doc_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocType {
    #[serde(rename = "10_Q")]
    TenQ,
    #[serde(rename = "10_K")]
    TenK,
    #[serde(rename = "other")]
    Other,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::TenQ => "10_Q",
            DocType::TenK => "10_K",
            DocType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "10_Q" => Ok(DocType::TenQ),
            "10_K" => Ok(DocType::TenK),
            "other" => Ok(DocType::Other),
            _ => anyhow::bail!("Unknown document type: {}", s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub workspace_id: String,
    pub doc_type: DocType,
    pub file_path: String,
    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub reporting_date: Option<String>,
    #[serde(default)]
    pub doc_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub filing_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub reporting_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub doc_id: Option<Option<String>>,
}

const COLUMNS: &str = "id, workspace_id, doc_type, file_path, filing_date, reporting_date, doc_id";

#[derive(Clone)]
pub struct DocumentRepository {
    db: Database,
}

impl DocumentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new document
    pub async fn create(&self, new: NewDocument) -> Result<Document> {
        let id = new_entity_id();

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO documents (id, workspace_id, doc_type, file_path, filing_date, reporting_date, doc_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                new.workspace_id,
                new.doc_type.as_str(),
                new.file_path,
                new.filing_date,
                new.reporting_date,
                new.doc_id,
            ],
        )
        .context("Failed to insert document")?;

        tracing::debug!("Created document: {} ({})", id, new.file_path);
        Self::fetch(&conn, &id)?.context("Document missing after insert")
    }

    /// Get a document by ID
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List documents, optionally restricted to one workspace
    pub async fn list(&self, workspace_id: Option<&str>) -> Result<Vec<Document>> {
        let conn = self.db.lock().await;

        let documents = match workspace_id {
            Some(workspace_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM documents WHERE workspace_id = ?1 ORDER BY rowid"
                ))?;
                let rows = stmt.query_map(params![workspace_id], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {COLUMNS} FROM documents ORDER BY rowid"))?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        documents.context("Failed to collect documents")
    }

    /// Apply the supplied fields; returns `None` when the document does not exist
    pub async fn update(&self, id: &str, update: DocumentUpdate) -> Result<Option<Document>> {
        let conn = self.db.lock().await;
        let Some(mut document) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(workspace_id) = update.workspace_id {
            document.workspace_id = workspace_id;
        }
        if let Some(doc_type) = update.doc_type {
            document.doc_type = doc_type;
        }
        if let Some(file_path) = update.file_path {
            document.file_path = file_path;
        }
        if let Some(filing_date) = update.filing_date {
            document.filing_date = filing_date;
        }
        if let Some(reporting_date) = update.reporting_date {
            document.reporting_date = reporting_date;
        }
        if let Some(doc_id) = update.doc_id {
            document.doc_id = doc_id;
        }

        conn.execute(
            "UPDATE documents SET workspace_id = ?1, doc_type = ?2, file_path = ?3,
                    filing_date = ?4, reporting_date = ?5, doc_id = ?6
             WHERE id = ?7",
            params![
                document.workspace_id,
                document.doc_type.as_str(),
                document.file_path,
                document.filing_date,
                document.reporting_date,
                document.doc_id,
                id,
            ],
        )
        .context("Failed to update document")?;

        tracing::debug!("Updated document: {}", id);
        Self::fetch(&conn, id)
    }

    /// Delete a document and its parsed outputs
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.db.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM parsed_documents WHERE documents_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        tx.commit().context("Failed to delete document")?;

        tracing::debug!("Deleted document: {} (existed: {})", id, removed > 0);
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Document>> {
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM documents WHERE id = ?1"),
            params![id],
            Self::map_row,
        );

        match result {
            Ok(document) => Ok(Some(document)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get document"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Document> {
        Ok(Document {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            doc_type: DocType::from_str(&row.get::<_, String>(2)?).unwrap_or(DocType::Other),
            file_path: row.get(3)?,
            filing_date: row.get(4)?,
            reporting_date: row.get(5)?,
            doc_id: row.get(6)?,
        })
    }
}
