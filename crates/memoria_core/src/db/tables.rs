//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Canonical paste rows (`Paste`, bincode-encoded), keyed by id.
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");

/// Unique private access token index: token -> paste id.
pub const PASTES_BY_TOKEN: TableDefinition<&str, &str> = TableDefinition::new("pastes_by_token");
