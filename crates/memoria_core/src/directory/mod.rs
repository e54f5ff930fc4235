//! Paste directory: the operations callers use to create, read, edit, and
//! remove pastes.
//!
//! Every operation takes a [`RequestContext`] and stops waiting on storage
//! once that context is cancelled or its deadline passes. Reads and edits go
//! through [`crate::access::evaluate`], so expired, forbidden, and password-gated
//! pastes are indistinguishable from missing or unauthorized ones.

mod validate;

use crate::access::{
    evaluate, AccessPath, AccessTokenIssuer, Argon2Credentials, CredentialManager,
    OsRngTokenIssuer,
};
use crate::config::Config;
use crate::context::RequestContext;
use crate::db::PasteStore;
use crate::error::AppError;
use crate::models::paste::{
    normalize_expiry, CreatePasteRequest, NewPaste, Paste, PasteSummary, PasteView, Privacy,
    UpdatePasteRequest,
};
use chrono::Utc;
use std::sync::Arc;
use validate::{supplied_password, validate_create, validate_update};

/// Orchestrates validation, credential handling, and storage for pastes.
///
/// Cheap to clone; all components are shared.
#[derive(Clone)]
pub struct PasteDirectory {
    store: Arc<dyn PasteStore>,
    tokens: Arc<dyn AccessTokenIssuer>,
    credentials: Arc<dyn CredentialManager>,
    max_paste_size: usize,
}

impl PasteDirectory {
    /// Build a directory over `store` using the OS RNG token issuer and Argon2
    /// credentials tuned by `config`.
    ///
    /// # Errors
    /// Returns [`AppError::Internal`] when the configured hashing parameters
    /// are rejected.
    pub fn new(store: Arc<dyn PasteStore>, config: &Config) -> Result<Self, AppError> {
        let credentials = Argon2Credentials::new(config.hashing).map_err(|err| {
            tracing::error!("Invalid password hashing configuration: {}", err);
            AppError::Internal(format!("Invalid password hashing configuration: {}", err))
        })?;
        Ok(Self::with_components(
            store,
            Arc::new(OsRngTokenIssuer),
            Arc::new(credentials),
            config.max_paste_size,
        ))
    }

    /// Build a directory from explicit components.
    pub fn with_components(
        store: Arc<dyn PasteStore>,
        tokens: Arc<dyn AccessTokenIssuer>,
        credentials: Arc<dyn CredentialManager>,
        max_paste_size: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            credentials,
            max_paste_size,
        }
    }

    /// Create a paste.
    ///
    /// Private pastes receive a fresh access token; a supplied password is
    /// hashed before anything is stored.
    ///
    /// # Returns
    /// The stored paste as a [`PasteView`].
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a malformed request, or a storage,
    /// internal, or cancellation error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreatePasteRequest,
    ) -> Result<PasteView, AppError> {
        ctx.check()?;
        let privacy = validate_create(&req, self.max_paste_size)?;

        let private_access_token = match privacy {
            Privacy::Private => Some(self.issue_token()?),
            Privacy::Public | Privacy::Password => None,
        };
        let password_hash = supplied_password(req.password.as_deref())
            .map(|password| self.hash_password(password))
            .transpose()?;

        let new_paste = NewPaste {
            title: req.title,
            content: req.content,
            syntax_highlight: req.syntax_highlight,
            privacy,
            private_access_token,
            password_hash,
            created_at: Utc::now(),
            expires_at: normalize_expiry(req.expires_at),
        };
        let stored = ctx.run(self.store.insert(new_paste)).await?;

        tracing::info!(
            "Created paste {} (privacy: {}, password: {}, expires: {})",
            stored.id,
            stored.privacy,
            stored.has_password(),
            stored.expires_at.is_some()
        );
        Ok(PasteView::from(&stored))
    }

    /// Read a paste by its primary id.
    ///
    /// Private pastes are never readable this way.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for missing, expired, or private pastes
    /// and [`AppError::Unauthorized`] for a missing or wrong password.
    pub async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        password: Option<&str>,
    ) -> Result<PasteView, AppError> {
        let paste = ctx
            .run(self.store.find_by_id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        self.authorize(&paste, AccessPath::ById, password)?;
        Ok(PasteView::from(&paste))
    }

    /// Read a paste through its private access token.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for an unknown token or expired paste and
    /// [`AppError::Unauthorized`] for a missing or wrong password.
    pub async fn get_by_access_token(
        &self,
        ctx: &RequestContext,
        token: &str,
        password: Option<&str>,
    ) -> Result<PasteView, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::NotFound);
        }
        let paste = ctx
            .run(self.store.find_by_access_token(token))
            .await?
            .ok_or(AppError::NotFound)?;
        self.authorize(&paste, AccessPath::ByAccessToken, password)?;
        Ok(PasteView::from(&paste))
    }

    /// Apply a partial update to the paste with primary id `id`.
    ///
    /// The paste is gated exactly like [`PasteDirectory::get_by_id`] before
    /// anything changes, with `req.current_password` as the supplied password.
    /// Private pastes can only be edited through
    /// [`PasteDirectory::update_by_access_token`].
    ///
    /// Moving into the private tier issues a token only when the paste has
    /// none; an existing token is never replaced. The write is rejected if the
    /// paste changed since it was read, or since `expected_version` when the
    /// caller supplies one.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`], [`AppError::NotFound`] (also for
    /// expired and private pastes), [`AppError::Unauthorized`],
    /// [`AppError::Conflict`], or a storage, internal, or cancellation error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        req: UpdatePasteRequest,
    ) -> Result<PasteView, AppError> {
        let privacy = validate_update(&req, self.max_paste_size)?;
        let paste = ctx
            .run(self.store.find_by_id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        self.apply_update(ctx, paste, AccessPath::ById, privacy, req)
            .await
    }

    /// Apply a partial update to the paste behind a private access token.
    ///
    /// Same rules as [`PasteDirectory::update`], gated like
    /// [`PasteDirectory::get_by_access_token`].
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for an unknown token or expired paste,
    /// plus every error [`PasteDirectory::update`] can return.
    pub async fn update_by_access_token(
        &self,
        ctx: &RequestContext,
        token: &str,
        req: UpdatePasteRequest,
    ) -> Result<PasteView, AppError> {
        let privacy = validate_update(&req, self.max_paste_size)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::NotFound);
        }
        let paste = ctx
            .run(self.store.find_by_access_token(token))
            .await?
            .ok_or(AppError::NotFound)?;
        self.apply_update(ctx, paste, AccessPath::ByAccessToken, privacy, req)
            .await
    }

    async fn apply_update(
        &self,
        ctx: &RequestContext,
        mut paste: Paste,
        path: AccessPath,
        privacy: Option<Privacy>,
        req: UpdatePasteRequest,
    ) -> Result<PasteView, AppError> {
        self.authorize(&paste, path, req.current_password.as_deref())?;

        if let Some(expected) = req.expected_version {
            if expected != paste.version {
                tracing::warn!(
                    "Rejected update of paste {}: caller expected version {}, found {}",
                    paste.id,
                    expected,
                    paste.version
                );
                return Err(AppError::Conflict(format!(
                    "Paste '{}' is at version {}, not {}",
                    paste.id, paste.version, expected
                )));
            }
        }

        if let Some(title) = req.title {
            paste.title = title;
        }
        if let Some(content) = req.content {
            paste.content = content;
        }
        if let Some(syntax_highlight) = req.syntax_highlight {
            paste.syntax_highlight = syntax_highlight;
        }
        if let Some(privacy) = privacy {
            paste.privacy = privacy;
        }
        if let Some(expires_at) = req.expires_at {
            paste.expires_at = normalize_expiry(expires_at);
        }

        if req.clear_password {
            paste.password_hash = None;
        } else if let Some(password) = supplied_password(req.password.as_deref()) {
            paste.password_hash = Some(self.hash_password(password)?);
        }

        if paste.privacy == Privacy::Password && !paste.has_password() {
            return Err(AppError::Validation(
                "password privacy requires a password".to_string(),
            ));
        }
        if paste.privacy == Privacy::Private && paste.private_access_token.is_none() {
            paste.private_access_token = Some(self.issue_token()?);
        }
        paste.updated_at = Utc::now();

        let saved = match ctx.run(self.store.save(&paste)).await {
            Ok(Some(saved)) => saved,
            Ok(None) => return Err(AppError::NotFound),
            Err(err @ AppError::Conflict(_)) => {
                tracing::warn!("Concurrent update rejected for paste {}", paste.id);
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            "Updated paste {} to version {} (privacy: {})",
            saved.id,
            saved.version,
            saved.privacy
        );
        Ok(PasteView::from(&saved))
    }

    /// Delete a paste by id, regardless of its tier or expiry.
    ///
    /// # Returns
    /// The id of the deleted paste.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] if no paste has that id.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<String, AppError> {
        let deleted = ctx
            .run(self.store.delete_by_id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!("Deleted paste {}", deleted.id);
        Ok(deleted.id)
    }

    /// Summaries of public, unexpired pastes, newest first.
    ///
    /// Password-protected pastes are not listed.
    pub async fn list_public(&self, ctx: &RequestContext) -> Result<Vec<PasteSummary>, AppError> {
        let pastes = ctx.run(self.store.list_by_privacy(Privacy::Public)).await?;
        Ok(live_summaries(&pastes))
    }

    /// Summaries for the pastes behind `tokens`, skipping unknown and expired
    /// ones. Content and credentials are never included.
    pub async fn summaries_by_access_tokens(
        &self,
        ctx: &RequestContext,
        tokens: &[String],
    ) -> Result<Vec<PasteSummary>, AppError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let pastes = ctx.run(self.store.find_by_access_tokens(tokens)).await?;
        Ok(live_summaries(&pastes))
    }

    fn authorize(
        &self,
        paste: &Paste,
        path: AccessPath,
        password: Option<&str>,
    ) -> Result<(), AppError> {
        let decision = evaluate(
            paste,
            path,
            password,
            Utc::now(),
            self.credentials.as_ref(),
        )
        .map_err(|err| {
            tracing::error!("Failed to verify password for paste {}: {}", paste.id, err);
            AppError::Internal(format!("Password verification failed: {}", err))
        })?;

        if !decision.is_visible() {
            tracing::debug!(
                "Denied access to paste {} via {:?}: {:?}",
                paste.id,
                path,
                decision
            );
        }
        decision.into_result()
    }

    fn issue_token(&self) -> Result<String, AppError> {
        self.tokens.issue().map_err(|err| {
            tracing::error!("Failed to issue access token: {}", err);
            AppError::Internal(format!("Failed to issue access token: {}", err))
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, AppError> {
        self.credentials.hash(password).map_err(|err| {
            tracing::error!("Failed to hash password: {}", err);
            AppError::Internal(format!("Failed to hash password: {}", err))
        })
    }
}

fn live_summaries(pastes: &[Paste]) -> Vec<PasteSummary> {
    let now = Utc::now();
    pastes
        .iter()
        .filter(|paste| !paste.is_expired_at(now))
        .map(PasteSummary::from)
        .collect()
}
