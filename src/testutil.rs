//! Shared test helpers for asset-registry unit tests.

use std::sync::Arc;

use crate::allocator::{AssetIdAllocator, AssetStore};
use crate::config::{AllocatorConfig, Config, ServerConfig};
use crate::storage::Database;
use crate::AppState;

fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
        },
        allocator: AllocatorConfig::default(),
        test_mode: true,
        max_body_size: 64 * 1024,
    }
}

/// Create a test AppState with a temporary database.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let config = test_config(temp_dir);
    let db = Database::open(&config.server.data_dir).expect("Failed to open test database");

    Arc::new(AppState::new(config, db))
}

/// Like [`test_state`], but the allocator talks to whatever store `wrap`
/// builds around the database. Handlers still read and write `db` directly.
pub fn test_state_with_store<F>(temp_dir: &tempfile::TempDir, wrap: F) -> Arc<AppState>
where
    F: FnOnce(Database) -> Arc<dyn AssetStore>,
{
    let config = test_config(temp_dir);
    let db = Database::open(&config.server.data_dir).expect("Failed to open test database");
    let allocator = AssetIdAllocator::new(wrap(db.clone()), config.allocator.insert_attempts);

    Arc::new(AppState {
        allocator,
        config,
        db,
    })
}
