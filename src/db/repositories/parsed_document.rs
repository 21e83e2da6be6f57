//! Parsed document repository

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::core::ids::new_entity_id;
use crate::db::Database;

/// Parser output for one document. `status` flips to true once the JSON is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedDocument {
    pub id: String,
    pub workspace_id: String,
    pub documents_id: String,
    pub filepath: String,
    pub status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewParsedDocument {
    pub workspace_id: String,
    pub documents_id: String,
    pub filepath: String,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedDocumentUpdate {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub documents_id: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
}

/// Filters for [`ParsedDocumentRepository::list`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParsedDocumentFilter<'a> {
    pub workspace_id: Option<&'a str>,
    pub documents_id: Option<&'a str>,
}

const COLUMNS: &str = "id, workspace_id, documents_id, filepath, status";

#[derive(Clone)]
pub struct ParsedDocumentRepository {
    db: Database,
}

impl ParsedDocumentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new parsed document
    pub async fn create(&self, new: NewParsedDocument) -> Result<ParsedDocument> {
        let id = new_entity_id();

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO parsed_documents (id, workspace_id, documents_id, filepath, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, new.workspace_id, new.documents_id, new.filepath, new.status],
        )
        .context("Failed to insert parsed document")?;

        tracing::debug!("Created parsed document: {} for {}", id, new.documents_id);
        Self::fetch(&conn, &id)?.context("Parsed document missing after insert")
    }

    /// Get a parsed document by ID
    pub async fn get(&self, id: &str) -> Result<Option<ParsedDocument>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List parsed documents, optionally filtered
    pub async fn list(&self, filter: ParsedDocumentFilter<'_>) -> Result<Vec<ParsedDocument>> {
        let conn = self.db.lock().await;

        let mut query = format!("SELECT {COLUMNS} FROM parsed_documents WHERE 1=1");
        let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let Some(workspace_id) = filter.workspace_id.as_ref() {
            params.push(workspace_id);
            query.push_str(&format!(" AND workspace_id = ?{}", params.len()));
        }
        if let Some(documents_id) = filter.documents_id.as_ref() {
            params.push(documents_id);
            query.push_str(&format!(" AND documents_id = ?{}", params.len()));
        }
        query.push_str(" ORDER BY rowid");

        let mut stmt = conn.prepare(&query)?;
        let parsed = stmt
            .query_map(params.as_slice(), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect parsed documents")?;

        Ok(parsed)
    }

    /// Apply the supplied fields; returns `None` when the row does not exist
    pub async fn update(
        &self,
        id: &str,
        update: ParsedDocumentUpdate,
    ) -> Result<Option<ParsedDocument>> {
        let conn = self.db.lock().await;
        let Some(mut parsed) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(workspace_id) = update.workspace_id {
            parsed.workspace_id = workspace_id;
        }
        if let Some(documents_id) = update.documents_id {
            parsed.documents_id = documents_id;
        }
        if let Some(filepath) = update.filepath {
            parsed.filepath = filepath;
        }
        if let Some(status) = update.status {
            parsed.status = status;
        }

        conn.execute(
            "UPDATE parsed_documents SET workspace_id = ?1, documents_id = ?2, filepath = ?3, status = ?4
             WHERE id = ?5",
            params![parsed.workspace_id, parsed.documents_id, parsed.filepath, parsed.status, id],
        )
        .context("Failed to update parsed document")?;

        tracing::debug!("Updated parsed document: {}", id);
        Self::fetch(&conn, id)
    }

    /// Mark parsing complete
    pub async fn mark_done(&self, id: &str) -> Result<Option<ParsedDocument>> {
        self.update(
            id,
            ParsedDocumentUpdate {
                status: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a parsed document
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.lock().await;
        let removed = conn.execute("DELETE FROM parsed_documents WHERE id = ?1", params![id])?;
        tracing::debug!("Deleted parsed document: {} (existed: {})", id, removed > 0);
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<ParsedDocument>> {
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM parsed_documents WHERE id = ?1"),
            params![id],
            Self::map_row,
        );

        match result {
            Ok(parsed) => Ok(Some(parsed)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get parsed document"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ParsedDocument> {
        Ok(ParsedDocument {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            documents_id: row.get(2)?,
            filepath: row.get(3)?,
            status: row.get(4)?,
        })
    }
}
