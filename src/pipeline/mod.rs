//! Workspace creation pipeline: file intake, filing intake and parsing

pub mod files;
pub mod filings;
pub mod orchestrator;
pub mod parse;
pub mod policy;

pub use files::Upload;
pub use orchestrator::{CreateWorkspaceRequest, CreatedWorkspace, WorkspaceOrchestrator};
pub use policy::{FailurePolicy, StagePolicies};

/// Activity status codes written by the pipeline
pub mod status {
    pub const STARTED: i32 = 102;
    pub const COMPLETED: i32 = 200;
    pub const CREATED: i32 = 201;
    pub const FAILED: i32 = 500;
}
