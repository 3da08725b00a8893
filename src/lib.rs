//! asset-registry - Record keeping for a calibration lab's test certificates
//!
//! This crate provides:
//! - Per-customer sequential asset ids (`{customer}-{n}`) that never block a save
//! - Asset records, pass/fail test history and certificate reports
//! - redb embedded database for storage (ACID, MVCC, crash-safe)
//! - REST API with JSend envelopes

pub mod allocator;
pub mod api;
pub mod config;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use allocator::AssetIdAllocator;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub allocator: AssetIdAllocator,
    pub config: Config,
    pub db: Database,
}

impl AppState {
    /// Wire the allocator to the database it numbers assets in.
    pub fn new(config: Config, db: Database) -> Self {
        let allocator = AssetIdAllocator::new(
            std::sync::Arc::new(db.clone()),
            config.allocator.insert_attempts,
        );
        Self {
            allocator,
            config,
            db,
        }
    }
}
