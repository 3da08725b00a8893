mod next_id;
mod redb_store;

pub use next_id::{
    is_likely_uuid, normalize_customer_code, parse_suffix, AssetIdAllocator, NewAsset,
    FALLBACK_CUSTOMER_CODE,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::models::{AssetRecord, CustomerAssetCounter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Asset id already in use: {0}")]
    Conflict(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// The relational store the allocator reads existing ids from and writes
/// counters and assets to. `asset_id` must be treated as a unique key.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Asset ids starting with `prefix`, ordered descending.
    async fn list_asset_ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
    async fn get_counter(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerAssetCounter>, StoreError>;
    async fn put_counter(&self, customer_id: &str, next_counter: u64) -> Result<(), StoreError>;
    /// Insert and return the created row; `Conflict` if its asset id exists.
    async fn insert_asset(&self, asset: AssetRecord) -> Result<AssetRecord, StoreError>;
}
