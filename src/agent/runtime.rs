//! Agent runtime trait

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Incremental output of a streamed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentChunk {
    Text(String),
    Error(String),
}

/// Conversational backend that runs a prompt inside a working directory
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run a prompt to completion and return the assistant text
    async fn query(&self, prompt: &str, work_dir: &Path) -> Result<String>;

    /// Run a prompt, yielding text as it is produced. The channel closes when the run ends.
    async fn stream(&self, prompt: &str, work_dir: &Path) -> Result<mpsc::Receiver<AgentChunk>>;
}
