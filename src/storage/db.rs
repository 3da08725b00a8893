use redb::{
    Database as RedbDatabase, ReadTransaction, ReadableTable, TableDefinition, Value,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Asset id already in use: {0}")]
    AssetIdTaken(String),
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for DatabaseError {
    fn from(e: redb::Error) -> Self {
        DatabaseError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub assets: u64,
    pub counters: u64,
    pub reports: u64,
    pub test_entries: u64,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("asset-registry.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ASSETS)?;
            let _ = write_txn.open_table(ASSET_IDS)?;
            let _ = write_txn.open_table(CUSTOMER_ASSETS)?;
            let _ = write_txn.open_table(ASSET_COUNTERS)?;
            let _ = write_txn.open_table(TEST_HISTORY)?;
            let _ = write_txn.open_table(ASSET_TESTS)?;
            let _ = write_txn.open_table(REPORTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Purge all data - for testing only
    pub fn purge_all(&self) -> Result<PurgeStats, DatabaseError> {
        let write_txn = self.begin_write()?;
        let stats = PurgeStats {
            assets: clear_table(&write_txn, ASSETS)?,
            counters: clear_table(&write_txn, ASSET_COUNTERS)?,
            reports: clear_table(&write_txn, REPORTS)?,
            test_entries: clear_table(&write_txn, TEST_HISTORY)?,
        };

        // Indexes
        clear_table(&write_txn, ASSET_IDS)?;
        clear_table(&write_txn, CUSTOMER_ASSETS)?;
        clear_table(&write_txn, ASSET_TESTS)?;

        write_txn.commit()?;
        Ok(stats)
    }
}

/// Remove every row from a string-keyed table, returning how many were removed.
fn clear_table<V: Value + 'static>(
    write_txn: &WriteTransaction,
    definition: TableDefinition<'static, &'static str, V>,
) -> Result<u64, DatabaseError> {
    let keys: Vec<String> = {
        let table = write_txn.open_table(definition)?;
        let keys = table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        keys
    };

    let mut table = write_txn.open_table(definition)?;
    for key in &keys {
        table.remove(key.as_str())?;
    }
    Ok(keys.len() as u64)
}

/// Read a msgpack list of UUIDs stored under `key` in an index table.
pub(super) fn read_id_list<T>(table: &T, key: &str) -> Result<Vec<String>, DatabaseError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(data) => Ok(rmp_serde::from_slice(data.value())?),
        None => Ok(Vec::new()),
    }
}

/// Append `id` to the list stored under `key`, skipping duplicates.
pub(super) fn push_to_index(
    write_txn: &WriteTransaction,
    definition: TableDefinition<'static, &'static str, &'static [u8]>,
    key: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let mut table = write_txn.open_table(definition)?;
    let mut ids = read_id_list(&table, key)?;
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
        let data = rmp_serde::to_vec_named(&ids)?;
        table.insert(key, data.as_slice())?;
    }
    Ok(())
}

/// Remove `id` from the list stored under `key`, dropping the entry once empty.
pub(super) fn remove_from_index(
    write_txn: &WriteTransaction,
    definition: TableDefinition<'static, &'static str, &'static [u8]>,
    key: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let mut table = write_txn.open_table(definition)?;
    let mut ids = read_id_list(&table, key)?;
    ids.retain(|existing| existing != id);
    if ids.is_empty() {
        table.remove(key)?;
    } else {
        let data = rmp_serde::to_vec_named(&ids)?;
        table.insert(key, data.as_slice())?;
    }
    Ok(())
}
