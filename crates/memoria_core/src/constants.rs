//! Shared constants for the paste engine.

/// Default maximum paste content size accepted on create/update.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 10 * 1024 * 1024;

/// Default Argon2id memory cost in KiB (19 MiB).
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
/// Default Argon2id iteration count.
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;
/// Default Argon2id lane count.
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

/// Random bytes behind each private access token (128 bits).
pub const ACCESS_TOKEN_BYTES: usize = 16;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";
