//! Route handlers

pub mod activity;
pub mod agent;
pub mod agent_message;
pub mod agent_query;
pub mod create_workspace;
pub mod documents;
pub mod files;
pub mod filings;
pub mod health;
pub mod parsed_documents;
pub mod search;
pub mod workspace;
