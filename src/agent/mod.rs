//! Agent chat sessions backed by an external LLM runtime

pub mod claude;
pub mod conversation;
pub mod runtime;

pub use claude::ClaudeRuntime;
pub use conversation::{AgentNotFound, AgentQuery, AgentReply, Conversation, StreamEvent};
pub use runtime::{AgentChunk, AgentRuntime};
