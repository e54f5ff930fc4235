//! Shared test-only helpers for memoria_core.

use crate::models::paste::{NewPaste, Privacy};
use crate::Database;
use chrono::Utc;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// An unsaved paste with no token, password or expiry.
pub(crate) fn new_paste(privacy: Privacy) -> NewPaste {
    NewPaste {
        title: "fixture".to_string(),
        content: "fixture content".to_string(),
        syntax_highlight: "text".to_string(),
        privacy,
        private_access_token: None,
        password_hash: None,
        created_at: Utc::now(),
        expires_at: None,
    }
}
