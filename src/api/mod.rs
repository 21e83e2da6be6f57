//! HTTP API

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use server::{router, serve};
pub use types::{ApiResponse, ApiResult};
