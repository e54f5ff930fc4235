//! Read-time access decisions for a single viewing attempt.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! 1. expiry, so an expired paste never reveals its tier or password gate;
//! 2. private tier reached through its primary id;
//! 3. password gate (missing, then wrong);
//! 4. otherwise visible.

use super::credentials::{CredentialError, CredentialManager};
use crate::error::AppError;
use crate::models::paste::{Paste, Privacy};
use chrono::{DateTime, Utc};

/// How the caller located the paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// Lookup by primary identifier.
    ById,
    /// Lookup through the private access token index.
    ByAccessToken,
}

/// Outcome of evaluating one viewing attempt. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The paste may be shown.
    Visible,
    /// The expiry instant has passed.
    Expired,
    /// A password is set and none was supplied.
    PasswordRequired,
    /// The supplied password does not match.
    PasswordRejected,
    /// A private paste was reached through its primary id.
    PrivacyForbidden,
}

impl Decision {
    /// Whether the paste may be shown.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Collapse a decision into the externally visible outcome.
    ///
    /// Expired and forbidden pastes both read as missing; a missing password
    /// reads exactly like a wrong one.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Self::Visible => Ok(()),
            Self::Expired | Self::PrivacyForbidden => Err(AppError::NotFound),
            Self::PasswordRequired | Self::PasswordRejected => Err(AppError::Unauthorized),
        }
    }
}

/// Decide whether `paste` may be shown for this attempt.
///
/// An empty `password` counts as absent.
///
/// # Returns
/// The first matching [`Decision`].
///
/// # Errors
/// Propagates [`CredentialError`] when the stored hash cannot be verified; this
/// is an internal failure, distinct from a wrong password.
pub fn evaluate(
    paste: &Paste,
    path: AccessPath,
    password: Option<&str>,
    now: DateTime<Utc>,
    credentials: &dyn CredentialManager,
) -> Result<Decision, CredentialError> {
    if paste.is_expired_at(now) {
        return Ok(Decision::Expired);
    }

    if paste.privacy == Privacy::Private && path == AccessPath::ById {
        return Ok(Decision::PrivacyForbidden);
    }

    if let Some(hash) = paste.password_hash.as_deref().filter(|h| !h.is_empty()) {
        let Some(supplied) = password.filter(|pw| !pw.is_empty()) else {
            return Ok(Decision::PasswordRequired);
        };
        if !credentials.verify(hash, supplied)? {
            return Ok(Decision::PasswordRejected);
        }
    }

    Ok(Decision::Visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::credentials::fast_credentials;
    use crate::models::paste::NewPaste;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts verify calls and always matches.
    #[derive(Default)]
    struct CountingCredentials {
        verifies: AtomicUsize,
    }

    impl CredentialManager for CountingCredentials {
        fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
            Ok(format!("plain:{}", plaintext))
        }

        fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, CredentialError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            Ok(hash == format!("plain:{}", plaintext))
        }
    }

    struct BrokenCredentials;

    impl CredentialManager for BrokenCredentials {
        fn hash(&self, _plaintext: &str) -> Result<String, CredentialError> {
            Err(CredentialError::Hash("unavailable".to_string()))
        }

        fn verify(&self, _hash: &str, _plaintext: &str) -> Result<bool, CredentialError> {
            Err(CredentialError::MalformedHash("corrupt".to_string()))
        }
    }

    fn paste(privacy: Privacy, password_hash: Option<String>) -> Paste {
        NewPaste {
            title: "t".to_string(),
            content: "c".to_string(),
            syntax_highlight: "text".to_string(),
            privacy,
            private_access_token: (privacy == Privacy::Private).then(|| "f".repeat(32)),
            password_hash,
            created_at: Utc::now(),
            expires_at: None,
        }
        .into_paste("id-1".to_string())
    }

    const TIERS: [Privacy; 3] = [Privacy::Public, Privacy::Private, Privacy::Password];
    const PATHS: [AccessPath; 2] = [AccessPath::ById, AccessPath::ByAccessToken];

    #[test]
    fn public_paste_without_password_is_visible_on_both_paths() {
        let creds = CountingCredentials::default();
        let paste = paste(Privacy::Public, None);
        for path in PATHS {
            let decision = evaluate(&paste, path, None, Utc::now(), &creds).expect("decision");
            assert_eq!(decision, Decision::Visible);
        }
    }

    #[test]
    fn private_paste_is_forbidden_by_id_and_visible_by_token() {
        let creds = CountingCredentials::default();
        let paste = paste(Privacy::Private, None);
        let now = Utc::now();
        assert_eq!(
            evaluate(&paste, AccessPath::ById, None, now, &creds).unwrap(),
            Decision::PrivacyForbidden
        );
        assert_eq!(
            evaluate(&paste, AccessPath::ByAccessToken, None, now, &creds).unwrap(),
            Decision::Visible
        );
    }

    #[test]
    fn private_rule_wins_over_password_on_id_path() {
        let creds = CountingCredentials::default();
        let paste = paste(Privacy::Private, Some("plain:pw".to_string()));
        let decision =
            evaluate(&paste, AccessPath::ById, Some("pw"), Utc::now(), &creds).unwrap();
        assert_eq!(decision, Decision::PrivacyForbidden);
        assert_eq!(creds.verifies.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn expiry_precedes_every_other_rule() {
        let creds = CountingCredentials::default();
        let now = Utc::now();
        for privacy in TIERS {
            for path in PATHS {
                for supplied in [None, Some("pw"), Some("wrong")] {
                    let mut expired = paste(privacy, Some("plain:pw".to_string()));
                    expired.expires_at = Some(now - Duration::hours(1));
                    let decision = evaluate(&expired, path, supplied, now, &creds).unwrap();
                    assert_eq!(decision, Decision::Expired, "{:?} {:?} {:?}", privacy, path, supplied);
                }
            }
        }
        assert_eq!(creds.verifies.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn future_expiry_does_not_block() {
        let creds = CountingCredentials::default();
        let mut fresh = paste(Privacy::Public, None);
        fresh.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(evaluate(&fresh, AccessPath::ById, None, Utc::now(), &creds)
            .unwrap()
            .is_visible());
    }

    #[test]
    fn password_gate_distinguishes_missing_wrong_and_correct() {
        let creds = fast_credentials();
        let hash = creds.hash("secret123").expect("hash");
        let protected = paste(Privacy::Public, Some(hash));
        let now = Utc::now();

        let missing = evaluate(&protected, AccessPath::ById, None, now, &creds).unwrap();
        let empty = evaluate(&protected, AccessPath::ById, Some(""), now, &creds).unwrap();
        let wrong = evaluate(&protected, AccessPath::ById, Some("nope"), now, &creds).unwrap();
        let right = evaluate(&protected, AccessPath::ById, Some("secret123"), now, &creds).unwrap();

        assert_eq!(missing, Decision::PasswordRequired);
        assert_eq!(empty, Decision::PasswordRequired);
        assert_eq!(wrong, Decision::PasswordRejected);
        assert_eq!(right, Decision::Visible);
    }

    #[test]
    fn external_outcomes_hide_the_underlying_reason() {
        let required = Decision::PasswordRequired.into_result().unwrap_err();
        let rejected = Decision::PasswordRejected.into_result().unwrap_err();
        assert_eq!(required.to_string(), rejected.to_string());

        assert!(matches!(Decision::Expired.into_result(), Err(AppError::NotFound)));
        assert!(matches!(
            Decision::PrivacyForbidden.into_result(),
            Err(AppError::NotFound)
        ));
        assert!(Decision::Visible.into_result().is_ok());
    }

    #[test]
    fn verification_failure_is_an_error_not_a_rejection() {
        let protected = paste(Privacy::Password, Some("$corrupt".to_string()));
        let err = evaluate(
            &protected,
            AccessPath::ByAccessToken,
            Some("pw"),
            Utc::now(),
            &BrokenCredentials,
        )
        .expect_err("corrupt hash must surface");
        assert!(matches!(err, CredentialError::MalformedHash(_)));
    }

    #[test]
    fn evaluation_is_total_over_tiers_paths_and_passwords() {
        let creds = CountingCredentials::default();
        let now = Utc::now();
        for privacy in TIERS {
            for hash in [None, Some("plain:pw".to_string())] {
                for path in PATHS {
                    for supplied in [None, Some("pw"), Some("bad")] {
                        let candidate = paste(privacy, hash.clone());
                        let decision = evaluate(&candidate, path, supplied, now, &creds)
                            .expect("counting credentials never fail");
                        let expected = if privacy == Privacy::Private && path == AccessPath::ById {
                            Decision::PrivacyForbidden
                        } else if hash.is_none() {
                            Decision::Visible
                        } else {
                            match supplied {
                                None => Decision::PasswordRequired,
                                Some("pw") => Decision::Visible,
                                Some(_) => Decision::PasswordRejected,
                            }
                        };
                        assert_eq!(decision, expected);
                    }
                }
            }
        }
    }
}
