use async_trait::async_trait;

use super::{AssetStore, StoreError};
use crate::storage::models::{AssetRecord, CustomerAssetCounter};
use crate::storage::{Database, DatabaseError};

impl From<DatabaseError> for StoreError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::AssetIdTaken(asset_id) => StoreError::Conflict(asset_id),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl AssetStore for Database {
    async fn list_asset_ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(Database::list_asset_ids_with_prefix(self, prefix)?)
    }

    async fn get_counter(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerAssetCounter>, StoreError> {
        Ok(Database::get_counter(self, customer_id)?)
    }

    async fn put_counter(&self, customer_id: &str, next_counter: u64) -> Result<(), StoreError> {
        Ok(Database::put_counter(self, customer_id, next_counter)?)
    }

    async fn insert_asset(&self, asset: AssetRecord) -> Result<AssetRecord, StoreError> {
        Database::insert_asset(self, &asset)?;
        Ok(asset)
    }
}
