//! Paste records, outward views, and request payloads.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entry path by which a paste may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
    Password,
}

impl Privacy {
    /// Wire name of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "password" => Ok(Self::Password),
            other => Err(AppError::Validation(format!(
                "privacy must be one of public, private, password (got '{}')",
                other
            ))),
        }
    }
}

/// Canonical paste row as persisted by the storage collaborator.
///
/// This type carries the password hash and must never be handed to callers
/// directly; convert it to a [`PasteView`] or [`PasteSummary`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub title: String,
    pub content: String,
    pub syntax_highlight: String,
    pub privacy: Privacy,
    pub private_access_token: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// A paste that has not been assigned an id by storage yet.
#[derive(Debug, Clone)]
pub struct NewPaste {
    pub title: String,
    pub content: String,
    pub syntax_highlight: String,
    pub privacy: Privacy,
    pub private_access_token: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewPaste {
    /// Materialize the stored row once storage has chosen an id.
    ///
    /// # Returns
    /// A [`Paste`] at version 1 with `updated_at == created_at`.
    pub fn into_paste(self, id: String) -> Paste {
        Paste {
            id,
            title: self.title,
            content: self.content,
            syntax_highlight: self.syntax_highlight,
            privacy: self.privacy,
            private_access_token: self.private_access_token,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.created_at,
            expires_at: self.expires_at,
            version: 1,
        }
    }
}

impl Paste {
    /// Whether a password hash is attached.
    pub fn has_password(&self) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| !hash.is_empty())
    }

    /// Whether the paste is no longer readable at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Paste as returned to callers. Never contains the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub syntax_highlight: String,
    pub privacy: Privacy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_access_token: Option<String>,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl From<&Paste> for PasteView {
    fn from(value: &Paste) -> Self {
        // A token left over from an earlier private period stays dormant.
        let private_access_token = match value.privacy {
            Privacy::Private => value.private_access_token.clone(),
            Privacy::Public | Privacy::Password => None,
        };
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            content: value.content.clone(),
            syntax_highlight: value.syntax_highlight.clone(),
            privacy: value.privacy,
            private_access_token,
            has_password: value.has_password(),
            created_at: value.created_at,
            updated_at: value.updated_at,
            expires_at: value.expires_at,
            version: value.version,
        }
    }
}

/// Content-free listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteSummary {
    pub id: String,
    pub title: String,
    pub syntax_highlight: String,
    pub privacy: Privacy,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Paste> for PasteSummary {
    fn from(value: &Paste) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            syntax_highlight: value.syntax_highlight.clone(),
            privacy: value.privacy,
            has_password: value.has_password(),
            created_at: value.created_at,
            expires_at: value.expires_at,
        }
    }
}

/// Request payload for creating a paste.
#[derive(Clone, Deserialize)]
pub struct CreatePasteRequest {
    pub title: String,
    pub content: String,
    pub syntax_highlight: String,
    pub privacy: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for CreatePasteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatePasteRequest")
            .field("title", &self.title)
            .field("content_len", &self.content.len())
            .field("syntax_highlight", &self.syntax_highlight)
            .field("privacy", &self.privacy)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Request payload for updating a paste.
///
/// `None` leaves a field unchanged. For `password`, an empty string is also
/// treated as "unchanged"; removing a password requires `clear_password`.
/// `expires_at` distinguishes a missing field (unchanged) from an explicit
/// `null` (remove the expiry).
///
/// `current_password` unlocks a protected paste for editing and is never stored.
#[derive(Clone, Default, Deserialize)]
pub struct UpdatePasteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub syntax_highlight: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub clear_password: bool,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl fmt::Debug for UpdatePasteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdatePasteRequest")
            .field("title", &self.title)
            .field("content_len", &self.content.as_ref().map(String::len))
            .field("syntax_highlight", &self.syntax_highlight)
            .field("privacy", &self.privacy)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("clear_password", &self.clear_password)
            .field(
                "current_password",
                &self.current_password.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("expected_version", &self.expected_version)
            .finish()
    }
}

/// Map a present field (even `null`) to `Some(..)` so `None` means "absent".
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Normalize a caller-supplied expiry.
///
/// # Returns
/// `None` for a missing value or a zero value (Unix epoch or earlier),
/// otherwise the instant unchanged.
pub fn normalize_expiry(expires_at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    expires_at.filter(|instant| instant.timestamp() > 0)
}
