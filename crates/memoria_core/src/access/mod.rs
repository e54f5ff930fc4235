//! Access control primitives: capability tokens, password credentials, and
//! the read-time lifecycle policy.

/// Password hashing and verification.
pub mod credentials;
/// Read-time access decisions.
pub mod policy;
/// Private access token generation.
pub mod token;

pub use credentials::{Argon2Credentials, CredentialError, CredentialManager};
pub use policy::{evaluate, AccessPath, Decision};
pub use token::{AccessTokenIssuer, OsRngTokenIssuer, TokenError};
