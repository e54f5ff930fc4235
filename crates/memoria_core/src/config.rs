//! Configuration loading from environment variables.
//!
//! Every setting is an explicit field. Precedence for each field, highest first:
//! 1. A set and parseable `MEMORIA_*` environment variable.
//! 2. The built-in default from [`crate::constants`].
//!
//! A variable that is set but cannot be parsed logs a warning and falls back to
//! the default. Configuration is read once and handed to constructors; nothing
//! here is cached process-wide.

use crate::constants::{
    DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM,
    DEFAULT_MAX_PASTE_SIZE,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the database directory.
pub const ENV_DB_PATH: &str = "MEMORIA_DB_PATH";
/// Environment variable for the maximum accepted paste content size in bytes.
pub const ENV_MAX_PASTE_SIZE: &str = "MEMORIA_MAX_PASTE_SIZE";
/// Environment variable for the Argon2 memory cost in KiB.
pub const ENV_HASH_MEMORY_KIB: &str = "MEMORIA_HASH_MEMORY_KIB";
/// Environment variable for the Argon2 iteration count.
pub const ENV_HASH_ITERATIONS: &str = "MEMORIA_HASH_ITERATIONS";
/// Environment variable for the Argon2 lane count.
pub const ENV_HASH_PARALLELISM: &str = "MEMORIA_HASH_PARALLELISM";

/// Runtime configuration for the paste engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub max_paste_size: usize,
    pub hashing: HashingConfig,
}

/// Work factors for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("memoria")
        .join("db")
        .to_string_lossy()
        .to_string()
}

/// Parse `name` from `lookup`, falling back to `default` when unset or invalid.
fn parse_or_default<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Invalid {}='{}'; using default {}", name, raw, default);
            default
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// `lookup` returns the raw value for a variable name, or `None` when unset.
    ///
    /// # Returns
    /// A populated [`Config`] following the precedence described in the module docs.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(ENV_DB_PATH)
            .filter(|value| !value.trim().is_empty())
            .map(expand_tilde)
            .unwrap_or_else(default_db_path);

        Self {
            db_path,
            max_paste_size: parse_or_default(&lookup, ENV_MAX_PASTE_SIZE, DEFAULT_MAX_PASTE_SIZE),
            hashing: HashingConfig {
                memory_kib: parse_or_default(
                    &lookup,
                    ENV_HASH_MEMORY_KIB,
                    DEFAULT_HASH_MEMORY_KIB,
                ),
                iterations: parse_or_default(
                    &lookup,
                    ENV_HASH_ITERATIONS,
                    DEFAULT_HASH_ITERATIONS,
                ),
                parallelism: parse_or_default(
                    &lookup,
                    ENV_HASH_PARALLELISM,
                    DEFAULT_HASH_PARALLELISM,
                ),
            },
        }
    }
}
