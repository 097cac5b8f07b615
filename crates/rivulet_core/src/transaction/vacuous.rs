use rivulet_error::Result;

use super::{Transaction, TransactionId};
use crate::storage::record::{Record, RecordUpdate};
use crate::storage::table::Table;

/// Transaction that writes straight through to the table.
///
/// Commit and rollback do nothing. Writes made before a failure stay applied.
#[derive(Debug)]
pub struct VacuousTransaction {
    id: TransactionId,
}

impl VacuousTransaction {
    pub fn new(id: TransactionId) -> Self {
        VacuousTransaction { id }
    }
}

impl Transaction for VacuousTransaction {
    fn id(&self) -> TransactionId {
        self.id
    }

    fn insert_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        table.insert_records(records)?;
        Ok(())
    }

    fn update_record(&mut self, table: &Table, updates: Vec<RecordUpdate>) -> Result<()> {
        table.update_records(&updates)
    }

    fn delete_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        let rids = records
            .iter()
            .map(|r| r.require_rid())
            .collect::<Result<Vec<_>>>()?;
        table.delete_records(&rids)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}
