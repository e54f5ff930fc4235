//! Shared integration-test directory bootstrap helpers.

use memoria_core::config::HashingConfig;
use memoria_core::{Config, Database, PasteDirectory};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        db_path: db_path.to_str().expect("db path").to_string(),
        max_paste_size: 10_000_000,
        hashing: HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
    }
}

pub(crate) fn directory_for_config(config: &Config) -> PasteDirectory {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    PasteDirectory::new(Arc::new(db), config).expect("directory")
}

pub(crate) fn setup_test_directory() -> (PasteDirectory, TempDir) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("memoria_core=debug")
        .with_test_writer()
        .try_init();
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = test_config_for_db_path(&db_path);
    (directory_for_config(&config), temp_dir)
}
