use rivulet_error::Result;
use tracing::warn;

use super::{OperatorState, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;
use crate::storage::table::Table;
use crate::transaction::Transaction;

#[derive(Debug)]
pub struct PhysicalDelete<'a> {
    table: &'a Table,
    filter: FilterStmt,
    pub(super) state: OperatorState,
    pub(super) rows_affected: Option<usize>,
}

impl<'a> PhysicalDelete<'a> {
    pub fn new(table: &'a Table, filter: FilterStmt) -> Self {
        PhysicalDelete {
            table,
            filter,
            state: OperatorState::Unopened,
            rows_affected: None,
        }
    }

    pub(super) fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("Delete")?;

        let mut records = Vec::new();
        for record in self.table.scan() {
            if self.filter.evaluate(&record)? {
                records.push(record);
            }
        }

        let count = records.len();
        trx.delete_record(self.table, records).inspect_err(|e| {
            warn!(table = %self.table.name(), %e, "failed to delete records by transaction")
        })?;

        self.rows_affected = Some(count);
        self.state = OperatorState::Exhausted;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("Delete")?;
        Ok(PollNext::RecordEnd)
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.state = OperatorState::Closed;
        Ok(())
    }
}

impl Explainable for PhysicalDelete<'_> {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new("Delete").with_value("table", self.table.name());
        if self.filter.is_empty() {
            ent
        } else {
            ent.with_value("filter", &self.filter)
        }
    }
}

#[cfg(test)]
mod tests {
    use rivulet_error::ErrorKind;

    use super::*;
    use crate::ast::ConditionNode;
    use crate::execution::operators::PhysicalOperator;
    use crate::statement::filter::TableMap;
    use crate::testutil::{
        RecordedCall, RecordingTransaction, misaligned_age_filter, people_database,
    };
    use crate::value::{ComparisonOperator, Value};

    #[test]
    fn deletes_matching_records() {
        let db = people_database(&[(1, "a", 30, None), (2, "b", 31, None), (3, "c", 32, None)]);
        let table = db.find_table("people").unwrap();
        let tables: TableMap = [("people".to_string(), table)].into_iter().collect();
        let filter = FilterStmt::create(
            &db,
            Some(table),
            &tables,
            &[ConditionNode::attr_value("age", ComparisonOperator::GtEq, 31)],
        )
        .unwrap();

        let mut op = PhysicalOperator::Delete(PhysicalDelete::new(table, filter));
        let mut trx = RecordingTransaction::new();
        op.open(&mut trx).unwrap();

        let [RecordedCall::Delete { records, .. }] = trx.calls.as_slice() else {
            panic!("expected a single delete call, got {:?}", trx.calls);
        };
        let ids: Vec<_> = records
            .iter()
            .map(|r| table.meta().decode_field(r, 0).unwrap())
            .collect();
        assert_eq!(vec![Value::from(2), Value::from(3)], ids);
        assert_eq!(Some(2), op.rows_affected());
        assert_eq!(PollNext::RecordEnd, op.next().unwrap());
        assert_eq!(PollNext::RecordEnd, op.next().unwrap());

        // Recording transaction doesn't touch storage.
        assert_eq!(3, table.num_records());

        op.close().unwrap();
        op.close().unwrap();
    }

    #[test]
    fn transaction_failure_returned_without_retry() {
        let db = people_database(&[(1, "a", 30, None)]);
        let table = db.find_table("people").unwrap();

        let mut op = PhysicalOperator::Delete(PhysicalDelete::new(table, FilterStmt::empty()));
        let mut trx = RecordingTransaction::failing();
        let err = op.open(&mut trx).unwrap_err();

        assert_eq!(ErrorKind::StorageError, err.kind());
        assert_eq!(1, trx.calls.len());
        assert_eq!(None, op.rows_affected());
        assert_eq!(ErrorKind::Internal, op.next().unwrap_err().kind());
        assert_eq!(1, table.num_records());
    }

    #[test]
    fn filter_decode_failure_propagates() {
        let db = people_database(&[(1, "a", 30, None)]);
        let table = db.find_table("people").unwrap();

        let mut op = PhysicalDelete::new(table, misaligned_age_filter());
        let mut trx = RecordingTransaction::new();
        let err = op.open(&mut trx).unwrap_err();

        assert_eq!(ErrorKind::StorageError, err.kind());
        assert!(trx.calls.is_empty());
    }
}
