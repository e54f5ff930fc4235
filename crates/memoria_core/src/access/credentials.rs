//! Password hashing for protected pastes.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
//! algorithm, cost and salt travel with the stored value and verification never
//! depends on the currently configured work factors.

use crate::config::HashingConfig;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const SALT_BYTES: usize = 16;

/// Failures from hashing or verifying a paste password.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Randomness source unavailable: {0}")]
    Entropy(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hashes and verifies paste passwords.
pub trait CredentialManager: Send + Sync {
    /// Produce a salted, self-describing hash of `plaintext`.
    ///
    /// Empty input is accepted; callers decide whether a password is set.
    ///
    /// # Errors
    /// Returns [`CredentialError`] on entropy or hashing failure.
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    /// Check `plaintext` against a stored hash.
    ///
    /// # Returns
    /// `Ok(false)` for a well-formed hash that does not match.
    ///
    /// # Errors
    /// Returns [`CredentialError::MalformedHash`] when `hash` cannot be parsed
    /// or names an unsupported algorithm.
    fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, CredentialError>;
}

/// Argon2id-backed [`CredentialManager`].
#[derive(Debug, Clone)]
pub struct Argon2Credentials {
    params: Params,
}

impl Default for Argon2Credentials {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Credentials {
    /// Build a credential manager with explicit work factors.
    ///
    /// # Errors
    /// Returns [`CredentialError::InvalidParams`] when Argon2 rejects the
    /// combination (for example memory below `8 * parallelism` KiB).
    pub fn new(config: HashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| CredentialError::InvalidParams(err.to_string()))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialManager for Argon2Credentials {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| CredentialError::Entropy(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        let hash = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(CredentialError::MalformedHash(
                "missing salt or hash output".to_string(),
            ));
        }
        // Output comparison inside argon2 is constant time.
        match self.hasher().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::MalformedHash(err.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_credentials() -> Argon2Credentials {
    Argon2Credentials::new(HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("minimal argon2 params")
}
