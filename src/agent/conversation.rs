//! Agent conversations: agent bookkeeping, prompt assembly and message history

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::runtime::{AgentChunk, AgentRuntime};
use crate::core::layout::WorkspaceLayout;
use crate::db::repositories::agent::{AgentRepository, NewAgent};
use crate::db::repositories::agent_message::{AgentMessageRepository, NewAgentMessage};

pub const USER_ROLE: &str = "user";
pub const ASSISTANT_ROLE: &str = "assistant";

/// A question for an agent, optionally grounded in a document chunk
#[derive(Debug, Clone, Deserialize)]
pub struct AgentQuery {
    pub workspace_id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub chunk_content: Option<String>,
}

impl AgentQuery {
    /// Prompt actually sent to the runtime
    pub fn full_prompt(&self) -> String {
        match self.chunk_content.as_deref().filter(|c| !c.is_empty()) {
            Some(content) => format!(
                "Context from document chunk:\n\n{}\n\nUser question: {}",
                content, self.prompt
            ),
            None => self.prompt.clone(),
        }
    }

    fn agent_name(&self) -> String {
        let label = self
            .chunk_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("General");
        format!("Analyst Ken - {}", label)
    }
}

/// Query names an agent that does not exist
#[derive(Debug, thiserror::Error)]
#[error("Agent with ID '{0}' not found")]
pub struct AgentNotFound(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub agent_id: String,
    pub response: String,
}

/// Server-sent event payloads of a streamed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    AgentId { agent_id: String },
    Text { content: String },
    Error { content: String },
    Done,
}

/// Query ready to run: agent resolved, user turn stored
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub agent_id: String,
    pub prompt: String,
    pub work_dir: PathBuf,
}

#[derive(Clone)]
pub struct Conversation {
    agents: AgentRepository,
    messages: AgentMessageRepository,
    runtime: Arc<dyn AgentRuntime>,
    layout: WorkspaceLayout,
}

impl Conversation {
    pub fn new(
        agents: AgentRepository,
        messages: AgentMessageRepository,
        runtime: Arc<dyn AgentRuntime>,
        layout: WorkspaceLayout,
    ) -> Self {
        Self {
            agents,
            messages,
            runtime,
            layout,
        }
    }

    /// Resolve (or create) the agent and record the user's message
    pub async fn prepare(&self, query: &AgentQuery) -> Result<PreparedQuery> {
        self.layout.workspace_dir(&query.workspace_id)?;

        let agent_id = match query.agent_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                self.agents
                    .get(id)
                    .await?
                    .ok_or_else(|| AgentNotFound(id.to_string()))?
                    .id
            }
            None => {
                let agent = self
                    .agents
                    .create(NewAgent {
                        workspace_id: query.workspace_id.clone(),
                        name: query.agent_name(),
                        status: None,
                    })
                    .await?;
                info!("Created agent {} for workspace {}", agent.id, query.workspace_id);
                agent.id
            }
        };

        self.messages
            .create(NewAgentMessage {
                agent_id: agent_id.clone(),
                role: USER_ROLE.to_string(),
                message: query.prompt.clone(),
            })
            .await?;

        let work_dir = self.layout.agent_dir(&query.workspace_id, &agent_id)?;
        std::fs::create_dir_all(&work_dir)
            .with_context(|| format!("Failed to create agent directory {:?}", work_dir))?;

        Ok(PreparedQuery {
            agent_id,
            prompt: query.full_prompt(),
            work_dir,
        })
    }

    async fn record_reply(&self, agent_id: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.messages
            .create(NewAgentMessage {
                agent_id: agent_id.to_string(),
                role: ASSISTANT_ROLE.to_string(),
                message: text.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Run a query to completion
    pub async fn ask(&self, query: &AgentQuery) -> Result<AgentReply> {
        let prepared = self.prepare(query).await?;
        let response = self
            .runtime
            .query(&prepared.prompt, &prepared.work_dir)
            .await?;
        self.record_reply(&prepared.agent_id, &response).await?;

        Ok(AgentReply {
            agent_id: prepared.agent_id,
            response,
        })
    }

    /// Run a query, emitting the agent id first, then text, then `Done`.
    ///
    /// The assistant reply is stored once the run ends.
    pub async fn stream(&self, query: &AgentQuery) -> Result<mpsc::Receiver<StreamEvent>> {
        let prepared = self.prepare(query).await?;
        let mut chunks = self
            .runtime
            .stream(&prepared.prompt, &prepared.work_dir)
            .await?;

        let (tx, rx) = mpsc::channel(64);
        let this = self.clone();
        tokio::spawn(async move {
            let agent_id = prepared.agent_id;
            let _ = tx
                .send(StreamEvent::AgentId {
                    agent_id: agent_id.clone(),
                })
                .await;

            let mut reply = String::new();
            while let Some(chunk) = chunks.recv().await {
                let event = match chunk {
                    AgentChunk::Text(content) => {
                        reply.push_str(&content);
                        StreamEvent::Text { content }
                    }
                    AgentChunk::Error(content) => StreamEvent::Error { content },
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }

            if let Err(e) = this.record_reply(&agent_id, &reply).await {
                warn!("Failed to store reply for agent {}: {}", agent_id, e);
            }
            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(chunk_id: Option<&str>, chunk_content: Option<&str>) -> AgentQuery {
        AgentQuery {
            workspace_id: "ws".to_string(),
            agent_id: None,
            prompt: "What changed?".to_string(),
            chunk_id: chunk_id.map(String::from),
            chunk_content: chunk_content.map(String::from),
        }
    }

    #[test]
    fn prompt_includes_chunk_context() {
        let q = query(Some("c1"), Some("Revenue was $10M"));
        assert_eq!(
            q.full_prompt(),
            "Context from document chunk:\n\nRevenue was $10M\n\nUser question: What changed?"
        );
        assert_eq!(q.agent_name(), "Analyst Ken - c1");
    }

    #[test]
    fn prompt_without_chunk_is_plain() {
        let q = query(None, None);
        assert_eq!(q.full_prompt(), "What changed?");
        assert_eq!(q.agent_name(), "Analyst Ken - General");
    }

    #[test]
    fn stream_events_are_tagged() {
        let json = serde_json::to_string(&StreamEvent::Text {
            content: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"text","content":"hi"}"#);
        assert_eq!(
            serde_json::to_string(&StreamEvent::Done).unwrap(),
            r#"{"type":"done"}"#
        );
    }
}
