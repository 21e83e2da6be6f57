//! Agent (chat session) repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::parse_timestamp;
use crate::core::ids::new_entity_id;
use crate::db::Database;

/// Status given to agents created without one
pub const DEFAULT_AGENT_STATUS: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    /// Free-form; conventionally `active`, `inactive` or `completed`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAgent {
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

const COLUMNS: &str = "id, workspace_id, name, status, created_at, updated_at";

#[derive(Clone)]
pub struct AgentRepository {
    db: Database,
}

impl AgentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new agent
    pub async fn create(&self, new: NewAgent) -> Result<Agent> {
        let id = new_entity_id();
        let now = Utc::now().to_rfc3339();
        let status = new
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_AGENT_STATUS.to_string());

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO agents (id, workspace_id, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, new.workspace_id, new.name, status, now, now],
        )
        .context("Failed to insert agent")?;

        tracing::debug!("Created agent: {} ({})", id, new.name);
        Self::fetch(&conn, &id)?.context("Agent missing after insert")
    }

    /// Get an agent by ID
    pub async fn get(&self, id: &str) -> Result<Option<Agent>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List agents newest first.
    ///
    /// `active_only` is only honoured together with a workspace filter.
    pub async fn list(&self, workspace_id: Option<&str>, active_only: bool) -> Result<Vec<Agent>> {
        let conn = self.db.lock().await;

        let agents = match (workspace_id, active_only) {
            (Some(workspace_id), true) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM agents WHERE workspace_id = ?1 AND status = ?2
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows =
                    stmt.query_map(params![workspace_id, DEFAULT_AGENT_STATUS], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            (Some(workspace_id), false) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM agents WHERE workspace_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![workspace_id], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            (None, _) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM agents ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        agents.context("Failed to collect agents")
    }

    /// Apply the supplied fields and bump `updated_at`
    pub async fn update(&self, id: &str, update: AgentUpdate) -> Result<Option<Agent>> {
        let conn = self.db.lock().await;
        let Some(mut agent) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            agent.name = name;
        }
        if let Some(status) = update.status {
            agent.status = status;
        }

        conn.execute(
            "UPDATE agents SET name = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            params![agent.name, agent.status, Utc::now().to_rfc3339(), id],
        )
        .context("Failed to update agent")?;

        tracing::debug!("Updated agent {} status to {}", id, agent.status);
        Self::fetch(&conn, id)
    }

    /// Delete an agent and its messages
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.db.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM agent_messages WHERE agent_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
        tx.commit().context("Failed to delete agent")?;

        tracing::debug!("Deleted agent: {} (existed: {})", id, removed > 0);
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Agent>> {
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM agents WHERE id = ?1"),
            params![id],
            Self::map_row,
        );

        match result {
            Ok(agent) => Ok(Some(agent)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get agent"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Agent> {
        Ok(Agent {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            status: row.get(3)?,
            created_at: parse_timestamp(&row.get::<_, String>(4)?),
            updated_at: parse_timestamp(&row.get::<_, String>(5)?),
        })
    }
}
