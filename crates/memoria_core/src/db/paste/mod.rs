//! Paste storage operations backed by redb.

mod helpers;

use crate::{
    db::tables::*,
    error::StorageError,
    models::paste::{NewPaste, Paste, Privacy},
};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;
use uuid::Uuid;

use self::helpers::{dedupe_tokens, sort_newest_first};

pub(crate) use self::helpers::{deserialize_paste, serialize_paste};

/// Accessor for paste-related redb tables.
#[derive(Clone)]
pub struct PasteDb {
    db: Arc<redb::Database>,
}

impl PasteDb {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Returns
    /// A new [`PasteDb`] accessor bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, StorageError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTES_BY_TOKEN)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Assign an id to `paste` and persist it with its token index row.
    ///
    /// # Returns
    /// The stored row at version 1.
    ///
    /// # Errors
    /// Returns [`StorageError::DuplicateAccessToken`] when the token is already
    /// indexed, or a storage/serialization error.
    pub fn insert(&self, paste: NewPaste) -> Result<Paste, StorageError> {
        let paste = paste.into_paste(Uuid::new_v4().to_string());
        let encoded = serialize_paste(&paste)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut tokens = write_txn.open_table(PASTES_BY_TOKEN)?;

            if pastes.get(paste.id.as_str())?.is_some() {
                return Err(StorageError::Message(format!(
                    "Paste id '{}' already exists",
                    paste.id
                )));
            }
            if let Some(token) = paste.private_access_token.as_deref() {
                if tokens.get(token)?.is_some() {
                    return Err(StorageError::DuplicateAccessToken);
                }
                tokens.insert(token, paste.id.as_str())?;
            }
            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(paste)
    }

    /// Fetch a paste by id.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Paste>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(id)? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a paste through the private access token index.
    ///
    /// # Returns
    /// `Ok(None)` when the token is unknown or points at a missing row.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_by_access_token(&self, token: &str) -> Result<Option<Paste>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let tokens = read_txn.open_table(PASTES_BY_TOKEN)?;
        let pastes = read_txn.open_table(PASTES)?;

        let Some(id_guard) = tokens.get(token)? else {
            return Ok(None);
        };
        let id = id_guard.value();
        match pastes.get(id)? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => {
                tracing::warn!("Access token index references missing paste '{}'", id);
                Ok(None)
            }
        }
    }

    /// Fetch every paste reachable from `tokens`, skipping unknown ones.
    ///
    /// # Returns
    /// Matching rows in first-seen token order, without duplicates.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_by_access_tokens(&self, tokens: &[String]) -> Result<Vec<Paste>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let token_table = read_txn.open_table(PASTES_BY_TOKEN)?;
        let pastes = read_txn.open_table(PASTES)?;

        let mut found = Vec::new();
        for token in dedupe_tokens(tokens) {
            let Some(id_guard) = token_table.get(token)? else {
                continue;
            };
            if let Some(value) = pastes.get(id_guard.value())? {
                found.push(deserialize_paste(value.value())?);
            }
        }
        Ok(found)
    }

    /// List every paste in the given privacy tier, newest first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_by_privacy(&self, privacy: Privacy) -> Result<Vec<Paste>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let pastes_table = read_txn.open_table(PASTES)?;

        let mut pastes = Vec::new();
        for item in pastes_table.iter()? {
            let (_, value) = item?;
            let paste = deserialize_paste(value.value())?;
            if paste.privacy == privacy {
                pastes.push(paste);
            }
        }
        sort_newest_first(&mut pastes);
        Ok(pastes)
    }

    /// Persist `paste` if the stored row is still at `paste.version`.
    ///
    /// Token index rows follow any change to `private_access_token`.
    ///
    /// # Returns
    /// `Ok(Some(saved))` with the bumped version, `Ok(None)` when the row is gone.
    ///
    /// # Errors
    /// Returns [`StorageError::VersionConflict`] when another writer got there
    /// first, [`StorageError::DuplicateAccessToken`] when a new token is
    /// already indexed for another paste, or a storage/serialization error.
    pub fn save(&self, paste: &Paste) -> Result<Option<Paste>, StorageError> {
        let write_txn = self.db.begin_write()?;
        let saved = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut tokens = write_txn.open_table(PASTES_BY_TOKEN)?;

            let Some(old_guard) = pastes.get(paste.id.as_str())? else {
                return Ok(None);
            };
            let stored = deserialize_paste(old_guard.value())?;
            drop(old_guard);

            if stored.version != paste.version {
                return Err(StorageError::VersionConflict {
                    id: paste.id.clone(),
                    expected: paste.version,
                    found: stored.version,
                });
            }

            if stored.private_access_token != paste.private_access_token {
                if let Some(token) = paste.private_access_token.as_deref() {
                    let owner = tokens.get(token)?.map(|guard| guard.value().to_string());
                    if owner.is_some_and(|owner| owner != paste.id) {
                        return Err(StorageError::DuplicateAccessToken);
                    }
                }
                if let Some(old_token) = stored.private_access_token.as_deref() {
                    let _ = tokens.remove(old_token)?;
                }
                if let Some(token) = paste.private_access_token.as_deref() {
                    tokens.insert(token, paste.id.as_str())?;
                }
            }

            let mut next = paste.clone();
            next.version = stored.version + 1;
            let encoded = serialize_paste(&next)?;
            pastes.insert(next.id.as_str(), encoded.as_slice())?;
            next
        };

        write_txn.commit()?;
        Ok(Some(saved))
    }

    /// Delete a paste and return the deleted canonical row.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when deleted, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_and_return(&self, id: &str) -> Result<Option<Paste>, StorageError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut tokens = write_txn.open_table(PASTES_BY_TOKEN)?;

            let Some(old_guard) = pastes.get(id)? else {
                return Ok(None);
            };
            let paste = deserialize_paste(old_guard.value())?;
            drop(old_guard);

            if let Some(token) = paste.private_access_token.as_deref() {
                let _ = tokens.remove(token)?;
            }
            let _ = pastes.remove(id)?;
            Some(paste)
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
