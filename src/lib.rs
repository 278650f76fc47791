//! Assistant session core — a consistent, paginated, locally-cached view of
//! remote assistants, coordinating selection, drafts, uploads, and commits
//! while UI intents arrive concurrently.

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod selection;
pub mod session;
pub mod upload;
