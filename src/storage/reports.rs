use super::db::{Database, DatabaseError};
use super::models::CertificateReport;
use super::tables::*;

impl Database {
    // ========================================================================
    // Certificate report operations
    // ========================================================================

    pub fn put_report(&self, report: &CertificateReport) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(REPORTS)?;
            let data = rmp_serde::to_vec_named(report)?;
            table.insert(report.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_report(&self, id: &str) -> Result<Option<CertificateReport>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(REPORTS)?;

        match table.get(id)? {
            Some(data) => {
                let report: CertificateReport = rmp_serde::from_slice(data.value())?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }
}
