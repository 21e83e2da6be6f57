//! Activity log repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::parse_timestamp;
use crate::core::ids::new_entity_id;
use crate::db::Database;

/// One audit-trail entry. `status` follows HTTP status code conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub workspace_id: String,
    pub category: ActivityCategory,
    pub created_at: DateTime<Utc>,
    pub status: i32,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    /// Top-level step of a pipeline run
    Main,
    /// Per-item step inside a stage
    Sub,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Main => "main",
            ActivityCategory::Sub => "sub",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(ActivityCategory::Main),
            "sub" => Ok(ActivityCategory::Sub),
            _ => anyhow::bail!("Unknown activity category: {}", s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub workspace_id: String,
    pub category: ActivityCategory,
    pub status: i32,
    pub title: String,
    pub message: String,
}

impl NewActivity {
    pub fn main(workspace_id: &str, status: i32, title: &str, message: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            category: ActivityCategory::Main,
            status,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn sub(workspace_id: &str, status: i32, title: &str, message: impl Into<String>) -> Self {
        Self {
            category: ActivityCategory::Sub,
            ..Self::main(workspace_id, status, title, message)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub category: Option<ActivityCategory>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

const COLUMNS: &str = "id, workspace_id, category, created_at, status, title, message";

#[derive(Clone)]
pub struct ActivityRepository {
    db: Database,
}

impl ActivityRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append an activity
    pub async fn create(&self, new: NewActivity) -> Result<Activity> {
        let id = new_entity_id();

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO activities (id, workspace_id, category, created_at, status, title, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                new.workspace_id,
                new.category.as_str(),
                Utc::now().to_rfc3339(),
                new.status,
                new.title,
                new.message,
            ],
        )
        .context("Failed to insert activity")?;

        tracing::debug!("Activity [{}] {}: {}", new.status, new.title, new.message);
        Self::fetch(&conn, &id)?.context("Activity missing after insert")
    }

    /// Get an activity by ID
    pub async fn get(&self, id: &str) -> Result<Option<Activity>> {
        let conn = self.db.lock().await;
        Self::fetch(&conn, id)
    }

    /// List activities newest first, optionally for one workspace
    pub async fn list(&self, workspace_id: Option<&str>) -> Result<Vec<Activity>> {
        let conn = self.db.lock().await;

        let activities = match workspace_id {
            Some(workspace_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM activities WHERE workspace_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![workspace_id], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM activities ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        activities.context("Failed to collect activities")
    }

    /// Apply the supplied fields; returns `None` when the activity does not exist
    pub async fn update(&self, id: &str, update: ActivityUpdate) -> Result<Option<Activity>> {
        let conn = self.db.lock().await;
        let Some(mut activity) = Self::fetch(&conn, id)? else {
            return Ok(None);
        };

        if let Some(workspace_id) = update.workspace_id {
            activity.workspace_id = workspace_id;
        }
        if let Some(category) = update.category {
            activity.category = category;
        }
        if let Some(status) = update.status {
            activity.status = status;
        }
        if let Some(title) = update.title {
            activity.title = title;
        }
        if let Some(message) = update.message {
            activity.message = message;
        }

        conn.execute(
            "UPDATE activities SET workspace_id = ?1, category = ?2, status = ?3, title = ?4, message = ?5
             WHERE id = ?6",
            params![
                activity.workspace_id,
                activity.category.as_str(),
                activity.status,
                activity.title,
                activity.message,
                id,
            ],
        )
        .context("Failed to update activity")?;

        Self::fetch(&conn, id)
    }

    /// Delete an activity
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.lock().await;
        let removed = conn.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        tracing::debug!("Deleted activity: {} (existed: {})", id, removed > 0);
        Ok(removed > 0)
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Activity>> {
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM activities WHERE id = ?1"),
            params![id],
            Self::map_row,
        );

        match result {
            Ok(activity) => Ok(Some(activity)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get activity"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
        Ok(Activity {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            category: ActivityCategory::from_str(&row.get::<_, String>(2)?)
                .unwrap_or(ActivityCategory::Sub),
            created_at: parse_timestamp(&row.get::<_, String>(3)?),
            status: row.get(4)?,
            title: row.get(5)?,
            message: row.get(6)?,
        })
    }
}
