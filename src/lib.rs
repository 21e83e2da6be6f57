//! ken-analyst - Workspace backend for SEC filing research

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod filings;
pub mod parser;
pub mod pipeline;
pub mod search;
