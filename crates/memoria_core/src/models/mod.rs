//! Data models for persisted pastes and caller-facing payloads.

/// Paste records, views, and requests.
pub mod paste;
