//! Per-entity repositories

pub mod activity;
pub mod agent;
pub mod agent_message;
pub mod document;
pub mod parsed_document;
pub mod workspace;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 column, falling back to now for unreadable values.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Deserializer for nullable patch fields.
///
/// With `#[serde(default)]` an omitted field stays `None`, while an explicit
/// `null` becomes `Some(None)` and clears the column.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
