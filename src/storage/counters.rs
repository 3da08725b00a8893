use super::db::{Database, DatabaseError};
use super::models::CustomerAssetCounter;
use super::tables::*;

impl Database {
    // ========================================================================
    // Counter operations
    // ========================================================================

    /// Get the advisory counter for a customer code
    pub fn get_counter(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerAssetCounter>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ASSET_COUNTERS)?;

        match table.get(customer_id)? {
            Some(data) => {
                let counter: CustomerAssetCounter = rmp_serde::from_slice(data.value())?;
                Ok(Some(counter))
            }
            None => Ok(None),
        }
    }

    /// Create or overwrite the counter for a customer code
    pub fn put_counter(&self, customer_id: &str, next_counter: u64) -> Result<(), DatabaseError> {
        let counter = CustomerAssetCounter {
            customer_id: customer_id.to_string(),
            next_counter,
            updated_at: chrono::Utc::now(),
        };

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ASSET_COUNTERS)?;
            let data = rmp_serde::to_vec_named(&counter)?;
            table.insert(customer_id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
