//! Core types shared by the pipeline, API and CLI

pub mod ids;
pub mod layout;
pub mod names;
pub mod state;

pub use layout::{path_component, ScratchDir, UnsafePathComponent, WorkspaceLayout};
pub use state::AppState;
