//! Workspace repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::parse_timestamp;
use crate::core::ids::{is_workspace_id, new_workspace_id, WORKSPACE_ID_LEN};
use crate::core::names::generate_workspace_name;
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub ticker: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewWorkspace {
    /// Generated when absent or empty
    #[serde(default)]
    pub id: Option<String>,
    /// "{Adjective} {Noun}" when absent or empty
    #[serde(default)]
    pub name: Option<String>,
    pub ticker: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
}

/// Creating a workspace whose id is already taken.
#[derive(Debug, thiserror::Error)]
#[error("Workspace with ID '{0}' already exists")]
pub struct DuplicateWorkspaceId(pub String);

/// Creating a workspace with an id that is not 8 characters from `[a-zA-Z0-9]`.
#[derive(Debug, thiserror::Error)]
#[error("Workspace ID '{0}' must be {len} characters from [a-zA-Z0-9]", len = WORKSPACE_ID_LEN)]
pub struct InvalidWorkspaceId(pub String);

#[derive(Clone)]
pub struct WorkspaceRepository {
    db: Database,
}

impl WorkspaceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the database reference
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Create a workspace row.
    ///
    /// Fails with [`InvalidWorkspaceId`] for a malformed explicit id and with
    /// [`DuplicateWorkspaceId`] when the id exists.
    pub async fn create(&self, new: NewWorkspace) -> Result<Workspace> {
        let id = new
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(new_workspace_id);
        if !is_workspace_id(&id) {
            return Err(InvalidWorkspaceId(id).into());
        }
        let name = new
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(generate_workspace_name);

        let conn = self.db.lock().await;
        if Self::fetch(&conn, &id)?.is_some() {
            return Err(DuplicateWorkspaceId(id).into());
        }

        conn.execute(
            "INSERT INTO workspaces (id, name, ticker, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, new.ticker, Utc::now().to_rfc3339()],
        )
        .context("Failed to insert workspace")?;

        tracing::debug!("Created workspace: {}", id);
        Self::fetch(&conn, &id)?.context("Workspace missing after insert")
    }

    /// Get a workspace by ID
    pub async fn get(&self, id: &str) -> Result<Option<Workspace>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List all workspaces in creation order
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, ticker, created_at FROM workspaces ORDER BY created_at, rowid",
        )?;

        let workspaces = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect workspaces")?;

        Ok(workspaces)
    }

    /// Apply the supplied fields; returns `None` when the workspace does not exist
    pub async fn update(&self, id: &str, update: WorkspaceUpdate) -> Result<Option<Workspace>> {
        let conn = self.db.lock().await;
        let Some(mut workspace) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            workspace.name = name;
        }
        if let Some(ticker) = update.ticker {
            workspace.ticker = ticker;
        }

        conn.execute(
            "UPDATE workspaces SET name = ?1, ticker = ?2 WHERE id = ?3",
            params![workspace.name, workspace.ticker, id],
        )
        .context("Failed to update workspace")?;

        tracing::debug!("Updated workspace: {}", id);
        Self::fetch(&conn, id)
    }

    /// Delete a workspace and everything it owns in one transaction.
    ///
    /// Returns false when no workspace had this id.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.db.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM agent_messages WHERE agent_id IN (SELECT id FROM agents WHERE workspace_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM agents WHERE workspace_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM parsed_documents WHERE workspace_id = ?1
                OR documents_id IN (SELECT id FROM documents WHERE workspace_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM documents WHERE workspace_id = ?1", params![id])?;
        tx.execute("DELETE FROM activities WHERE workspace_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM workspaces WHERE id = ?1", params![id])?;

        tx.commit().context("Failed to delete workspace")?;

        tracing::debug!("Deleted workspace: {} (existed: {})", id, removed > 0);
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Workspace>> {
        let result = conn.query_row(
            "SELECT id, name, ticker, created_at FROM workspaces WHERE id = ?1",
            params![id],
            Self::map_row,
        );

        match result {
            Ok(workspace) => Ok(Some(workspace)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get workspace"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Workspace> {
        Ok(Workspace {
            id: row.get(0)?,
            name: row.get(1)?,
            ticker: row.get(2)?,
            created_at: parse_timestamp(&row.get::<_, String>(3)?),
        })
    }
}
