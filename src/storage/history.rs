use super::db::{push_to_index, read_id_list, Database, DatabaseError};
use super::models::TestHistoryEntry;
use super::tables::*;

impl Database {
    // ========================================================================
    // Test history operations
    // ========================================================================

    /// Append a test history row for an asset. Rows are never updated.
    pub fn append_test_entry(&self, entry: &TestHistoryEntry) -> Result<(), DatabaseError> {
        debug_assert!(!entry.id.is_empty(), "history entry id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(TEST_HISTORY)?;
            let data = rmp_serde::to_vec_named(entry)?;
            table.insert(entry.id.as_str(), data.as_slice())?;
        }
        push_to_index(
            &write_txn,
            ASSET_TESTS,
            entry.asset_record_id.as_str(),
            entry.id.as_str(),
        )?;
        write_txn.commit()?;
        Ok(())
    }

    /// Test history for an asset, in the order the rows were appended
    pub fn get_test_history(
        &self,
        asset_record_id: &str,
    ) -> Result<Vec<TestHistoryEntry>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let tests_table = read_txn.open_table(ASSET_TESTS)?;
        let history_table = read_txn.open_table(TEST_HISTORY)?;

        let mut entries = Vec::new();
        for entry_id in read_id_list(&tests_table, asset_record_id)? {
            if let Some(data) = history_table.get(entry_id.as_str())? {
                let entry: TestHistoryEntry = rmp_serde::from_slice(data.value())?;
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}
