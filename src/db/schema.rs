//! SQL schema definitions
//!
//! Parent ids are plain columns: rows may name a parent that does not exist,
//! and cascading deletes are done by the repositories.

pub const SCHEMA: &str = r#"
-- Workspaces table
CREATE TABLE IF NOT EXISTS workspaces (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    ticker TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Documents table
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    doc_type TEXT NOT NULL,
    file_path TEXT NOT NULL,
    filing_date TEXT,
    reporting_date TEXT,
    doc_id TEXT
);

-- Parsed documents table
CREATE TABLE IF NOT EXISTS parsed_documents (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    documents_id TEXT NOT NULL,
    filepath TEXT NOT NULL,
    status INTEGER NOT NULL DEFAULT 0
);

-- Activity log table
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    category TEXT NOT NULL,
    created_at TEXT NOT NULL,
    status INTEGER NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL
);

-- Agents table
CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Agent messages table
CREATE TABLE IF NOT EXISTS agent_messages (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    role TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_documents_workspace_id ON documents(workspace_id);
CREATE INDEX IF NOT EXISTS idx_parsed_documents_workspace_id ON parsed_documents(workspace_id);
CREATE INDEX IF NOT EXISTS idx_parsed_documents_documents_id ON parsed_documents(documents_id);
CREATE INDEX IF NOT EXISTS idx_activities_workspace_id ON activities(workspace_id);
CREATE INDEX IF NOT EXISTS idx_agents_workspace_id ON agents(workspace_id);
CREATE INDEX IF NOT EXISTS idx_agent_messages_agent_id ON agent_messages(agent_id);
"#;
