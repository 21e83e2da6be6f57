//! Document parsing service

pub mod client;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

pub use client::ParseApiClient;

/// Converts a raw document into structured JSON
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<serde_json::Value>;
}
