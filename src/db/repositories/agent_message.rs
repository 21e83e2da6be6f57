//! Agent message repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::parse_timestamp;
use crate::core::ids::new_entity_id;
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMessage {
    pub id: String,
    pub agent_id: String,
    /// Free-form; conventionally `user`, `assistant` or `system`
    pub role: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAgentMessage {
    pub agent_id: String,
    pub role: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentMessageUpdate {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

const COLUMNS: &str = "id, agent_id, role, message, timestamp";

#[derive(Clone)]
pub struct AgentMessageRepository {
    db: Database,
}

impl AgentMessageRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a message to an agent's history
    pub async fn create(&self, new: NewAgentMessage) -> Result<AgentMessage> {
        let id = new_entity_id();

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO agent_messages (id, agent_id, role, message, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, new.agent_id, new.role, new.message, Utc::now().to_rfc3339()],
        )
        .context("Failed to insert agent message")?;

        tracing::debug!("Stored {} message for agent {}", new.role, new.agent_id);
        Self::fetch(&conn, &id)?.context("Agent message missing after insert")
    }

    /// Get a message by ID
    pub async fn get(&self, id: &str) -> Result<Option<AgentMessage>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List messages oldest first, optionally for one agent
    pub async fn list(&self, agent_id: Option<&str>) -> Result<Vec<AgentMessage>> {
        let conn = self.db.lock().await;

        let messages = match agent_id {
            Some(agent_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM agent_messages WHERE agent_id = ?1
                     ORDER BY timestamp ASC, rowid ASC"
                ))?;
                let rows = stmt.query_map(params![agent_id], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM agent_messages ORDER BY timestamp ASC, rowid ASC"
                ))?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        messages.context("Failed to collect agent messages")
    }

    /// Apply the supplied fields; returns `None` when the message does not exist
    pub async fn update(&self, id: &str, update: AgentMessageUpdate) -> Result<Option<AgentMessage>> {
        let conn = self.db.lock().await;
        let Some(mut message) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(role) = update.role {
            message.role = role;
        }
        if let Some(text) = update.message {
            message.message = text;
        }

        conn.execute(
            "UPDATE agent_messages SET role = ?1, message = ?2 WHERE id = ?3",
            params![message.role, message.message, id],
        )
        .context("Failed to update agent message")?;

        Self::fetch(&conn, id)
    }

    /// Delete a message
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.lock().await;
        let removed = conn.execute("DELETE FROM agent_messages WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<AgentMessage>> {
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM agent_messages WHERE id = ?1"),
            params![id],
            Self::map_row,
        );

        match result {
            Ok(message) => Ok(Some(message)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get agent message"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<AgentMessage> {
        Ok(AgentMessage {
            id: row.get(0)?,
            agent_id: row.get(1)?,
            role: row.get(2)?,
            message: row.get(3)?,
            timestamp: parse_timestamp(&row.get::<_, String>(4)?),
        })
    }
}
