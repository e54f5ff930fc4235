//! Core engine for Memoria pastes (access control, lifecycle, storage).

/// Capability tokens, password credentials, and the read-time policy.
pub mod access;
/// Configuration loading and defaults.
pub mod config;
/// Application-wide constants.
pub mod constants;
/// Request cancellation and deadlines.
pub mod context;
/// Storage contract and the redb-backed store.
pub mod db;
/// Paste directory operations.
pub mod directory;
/// Application error types (storage/domain).
pub mod error;
/// Data models for requests, views, and persistence.
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use context::RequestContext;
pub use db::{Database, PasteStore};
pub use directory::PasteDirectory;
pub use error::{AppError, ErrorKind, StorageError};
