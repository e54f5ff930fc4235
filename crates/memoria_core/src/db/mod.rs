//! Storage contract consumed by the paste directory, plus its redb implementation.

/// Paste storage helpers.
pub mod paste;
/// redb table definitions.
pub mod tables;

use crate::constants::REDB_FILE_NAME;
use crate::error::StorageError;
use crate::models::paste::{NewPaste, Paste, Privacy};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Persistence operations the paste directory relies on.
///
/// "Not found" is always `Ok(None)`, never an error. Implementations must keep
/// private access tokens unique and make [`PasteStore::save`] a
/// compare-and-swap on [`Paste::version`].
#[async_trait]
pub trait PasteStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Paste>, StorageError>;

    async fn find_by_access_token(&self, token: &str) -> Result<Option<Paste>, StorageError>;

    /// Resolve several tokens at once, skipping unknown ones.
    async fn find_by_access_tokens(&self, tokens: &[String]) -> Result<Vec<Paste>, StorageError>;

    /// All pastes in `privacy`, newest first.
    async fn list_by_privacy(&self, privacy: Privacy) -> Result<Vec<Paste>, StorageError>;

    /// Assign an id and persist. Fails with
    /// [`StorageError::DuplicateAccessToken`] on a token collision.
    async fn insert(&self, paste: NewPaste) -> Result<Paste, StorageError>;

    /// Persist `paste` only if the stored version still equals `paste.version`.
    ///
    /// Returns the saved row with its new version, or `None` if it was deleted.
    async fn save(&self, paste: &Paste) -> Result<Option<Paste>, StorageError>;

    /// Remove a paste, returning the deleted row.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Paste>, StorageError>;
}

/// Database handle with access to the underlying redb tables.
#[derive(Clone)]
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteDb,
}

impl Database {
    /// Open (or create) the database inside directory `path`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the file is held
    /// by another process, or tables cannot be initialized.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            StorageError::Message(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(StorageError::Message(format!(
                    "Database '{}' is already open in another process.\n\
                    Stop the other process or set MEMORIA_DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        Self::from_shared(db)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be opened.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, StorageError> {
        Ok(Self {
            pastes: paste::PasteDb::new(db.clone())?,
            db,
        })
    }

    /// Run a blocking redb operation on tokio's blocking pool.
    ///
    /// Callers that stop awaiting (cancellation) do not wait for the
    /// transaction; it still commits or aborts on its own.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(paste::PasteDb) -> Result<T, StorageError> + Send + 'static,
    {
        let pastes = self.pastes.clone();
        tokio::task::spawn_blocking(move || op(pastes))
            .await
            .map_err(|err| StorageError::Message(format!("Storage task failed: {}", err)))?
    }
}

#[async_trait]
impl PasteStore for Database {
    async fn find_by_id(&self, id: &str) -> Result<Option<Paste>, StorageError> {
        let id = id.to_string();
        self.blocking(move |pastes| pastes.get(&id)).await
    }

    async fn find_by_access_token(&self, token: &str) -> Result<Option<Paste>, StorageError> {
        let token = token.to_string();
        self.blocking(move |pastes| pastes.get_by_access_token(&token))
            .await
    }

    async fn find_by_access_tokens(&self, tokens: &[String]) -> Result<Vec<Paste>, StorageError> {
        let tokens = tokens.to_vec();
        self.blocking(move |pastes| pastes.get_by_access_tokens(&tokens))
            .await
    }

    async fn list_by_privacy(&self, privacy: Privacy) -> Result<Vec<Paste>, StorageError> {
        self.blocking(move |pastes| pastes.list_by_privacy(privacy))
            .await
    }

    async fn insert(&self, paste: NewPaste) -> Result<Paste, StorageError> {
        self.blocking(move |pastes| pastes.insert(paste)).await
    }

    async fn save(&self, paste: &Paste) -> Result<Option<Paste>, StorageError> {
        let paste = paste.clone();
        self.blocking(move |pastes| pastes.save(&paste)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Paste>, StorageError> {
        let id = id.to_string();
        self.blocking(move |pastes| pastes.delete_and_return(&id))
            .await
    }
}
