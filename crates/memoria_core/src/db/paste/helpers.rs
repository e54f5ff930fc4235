//! Helper functions shared by paste storage operations.

use crate::error::StorageError;
use crate::models::paste::Paste;

pub(crate) fn serialize_paste(paste: &Paste) -> Result<Vec<u8>, StorageError> {
    Ok(bincode::serialize(paste)?)
}

pub(crate) fn deserialize_paste(bytes: &[u8]) -> Result<Paste, StorageError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Order rows newest first, breaking ties by id for a stable listing.
pub(super) fn sort_newest_first(pastes: &mut [Paste]) {
    pastes.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Drop empty and repeated tokens while keeping first-seen order.
pub(super) fn dedupe_tokens(tokens: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty() && seen.insert(*token))
        .collect()
}
