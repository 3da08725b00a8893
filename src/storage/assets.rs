use redb::ReadableTable;

use super::db::{push_to_index, read_id_list, remove_from_index, Database, DatabaseError};
use super::models::AssetRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Asset operations
    // ========================================================================

    /// Store a new asset record and update the asset id and customer indexes.
    ///
    /// Fails with [`DatabaseError::AssetIdTaken`] without writing anything when
    /// the record's asset id is already indexed. The check and the insert share
    /// one write transaction, so two callers can never both claim the same id.
    pub fn insert_asset(&self, asset: &AssetRecord) -> Result<(), DatabaseError> {
        debug_assert!(!asset.id.is_empty(), "asset id must not be empty");

        let write_txn = self.begin_write()?;
        {
            if let Some(ref asset_id) = asset.asset_id {
                let mut ids_table = write_txn.open_table(ASSET_IDS)?;
                if ids_table.get(asset_id.as_str())?.is_some() {
                    return Err(DatabaseError::AssetIdTaken(asset_id.clone()));
                }
                ids_table.insert(asset_id.as_str(), asset.id.as_str())?;
            }

            let mut table = write_txn.open_table(ASSETS)?;
            let data = rmp_serde::to_vec_named(asset)?;
            table.insert(asset.id.as_str(), data.as_slice())?;
        }
        push_to_index(
            &write_txn,
            CUSTOMER_ASSETS,
            asset.customer_id.as_str(),
            asset.id.as_str(),
        )?;
        write_txn.commit()?;
        Ok(())
    }

    /// Get an asset by its UUID
    pub fn get_asset(&self, id: &str) -> Result<Option<AssetRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSETS)?;

        match table.get(id)? {
            Some(data) => {
                let asset: AssetRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    /// Get an asset by its lab asset id (resolves asset id -> uuid -> asset)
    pub fn get_asset_by_asset_id(
        &self,
        asset_id: &str,
    ) -> Result<Option<AssetRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let ids_table = read_txn.open_table(ASSET_IDS)?;

        let id = match ids_table.get(asset_id)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let assets_table = read_txn.open_table(ASSETS)?;
        match assets_table.get(id.as_str())? {
            Some(data) => {
                let asset: AssetRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    /// All indexed asset ids starting with `prefix`, in descending string order.
    pub fn list_asset_ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSET_IDS)?;

        let mut ids = Vec::new();
        for result in table.range(prefix..)? {
            let (key, _) = result?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            ids.push(key.to_string());
        }
        ids.reverse();

        Ok(ids)
    }

    /// Get all assets owned by a customer
    pub fn get_assets_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<AssetRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let customer_table = read_txn.open_table(CUSTOMER_ASSETS)?;
        let assets_table = read_txn.open_table(ASSETS)?;

        let mut assets = Vec::new();
        for asset_id in read_id_list(&customer_table, customer_id)? {
            if let Some(data) = assets_table.get(asset_id.as_str())? {
                let asset: AssetRecord = rmp_serde::from_slice(data.value())?;
                assets.push(asset);
            }
        }

        Ok(assets)
    }

    /// Get all assets
    pub fn get_all_assets(&self) -> Result<Vec<AssetRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSETS)?;

        let mut assets = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let asset: AssetRecord = rmp_serde::from_slice(value.value())?;
            assets.push(asset);
        }

        Ok(assets)
    }

    /// List assets with optional customer and job filters, oldest first
    pub fn list_assets(
        &self,
        customer_id: Option<&str>,
        job_id: Option<&str>,
    ) -> Result<Vec<AssetRecord>, DatabaseError> {
        // Use customer index when customer_id is provided
        let mut assets = match customer_id {
            Some(cid) => self.get_assets_by_customer(cid)?,
            None => self.get_all_assets()?,
        };

        if let Some(jid) = job_id {
            assets.retain(|a| a.job_id == jid);
        }
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(assets)
    }

    /// Delete an asset by its UUID, cleaning up its indexes and test history.
    ///
    /// Deleting frees the asset id; the allocator still numbers past the
    /// highest remaining suffix rather than refilling the gap.
    pub fn delete_asset(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<AssetRecord> = {
            let table = write_txn.open_table(ASSETS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        let deleted = match existing {
            Some(asset) => {
                {
                    let mut table = write_txn.open_table(ASSETS)?;
                    table.remove(id)?;
                }
                if let Some(ref asset_id) = asset.asset_id {
                    let mut ids_table = write_txn.open_table(ASSET_IDS)?;
                    ids_table.remove(asset_id.as_str())?;
                }
                remove_from_index(&write_txn, CUSTOMER_ASSETS, &asset.customer_id, id)?;

                // Drop the asset's test history with it
                let entry_ids: Vec<String> = {
                    let tests_table = write_txn.open_table(ASSET_TESTS)?;
                    let ids = read_id_list(&tests_table, id)?;
                    ids
                };
                {
                    let mut history_table = write_txn.open_table(TEST_HISTORY)?;
                    for entry_id in &entry_ids {
                        history_table.remove(entry_id.as_str())?;
                    }
                    let mut tests_table = write_txn.open_table(ASSET_TESTS)?;
                    tests_table.remove(id)?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
