//! Unguessable capability tokens for privately shared pastes.

use crate::constants::ACCESS_TOKEN_BYTES;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// The OS randomness source could not produce bytes.
#[derive(Error, Debug)]
#[error("Randomness source unavailable: {0}")]
pub struct TokenError(#[from] rand::Error);

/// Source of private access tokens.
///
/// Implementations do not check prior issuance; the storage unique index is
/// the authority on collisions.
pub trait AccessTokenIssuer: Send + Sync {
    /// Produce a fresh token.
    ///
    /// # Errors
    /// Returns [`TokenError`] when the randomness source is unavailable.
    fn issue(&self) -> Result<String, TokenError>;
}

/// Issues 128-bit tokens from the operating system CSPRNG, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngTokenIssuer;

impl AccessTokenIssuer for OsRngTokenIssuer {
    fn issue(&self) -> Result<String, TokenError> {
        let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(hex::encode(bytes))
    }
}
