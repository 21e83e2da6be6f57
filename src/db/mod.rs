//! Database module

pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::Database;
pub use repositories::{
    activity::ActivityRepository, agent::AgentRepository,
    agent_message::AgentMessageRepository, document::DocumentRepository,
    parsed_document::ParsedDocumentRepository, workspace::WorkspaceRepository,
};
