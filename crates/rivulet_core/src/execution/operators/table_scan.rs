use std::collections::VecDeque;

use rivulet_error::Result;

use super::{OperatorState, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::record::Record;
use crate::storage::table::Table;
use crate::transaction::Transaction;

/// Yields a snapshot of a table's records, taken at open, in storage order.
#[derive(Debug)]
pub struct PhysicalTableScan<'a> {
    pub(super) table: &'a Table,
    records: VecDeque<Record>,
    pub(super) state: OperatorState,
}

impl<'a> PhysicalTableScan<'a> {
    pub fn new(table: &'a Table) -> Self {
        PhysicalTableScan {
            table,
            records: VecDeque::new(),
            state: OperatorState::Unopened,
        }
    }

    pub(super) fn open(&mut self, _trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("TableScan")?;
        self.records = self.table.scan().into();
        self.state = OperatorState::Opened;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("TableScan")?;
        match self.records.pop_front() {
            Some(record) => Ok(PollNext::Ready(record)),
            None => {
                self.state = OperatorState::Exhausted;
                Ok(PollNext::RecordEnd)
            }
        }
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.records = VecDeque::new();
        self.state = OperatorState::Closed;
        Ok(())
    }
}

impl Explainable for PhysicalTableScan<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("TableScan")
            .with_value("table", self.table.name())
            .with_value_if_verbose(conf, "record_size", self.table.meta().record_size())
    }
}

#[cfg(test)]
mod tests {
    use rivulet_error::ErrorKind;

    use super::*;
    use crate::testutil::{RecordingTransaction, people_database};
    use crate::value::Value;

    #[test]
    fn yields_records_in_order_then_end() {
        let db = people_database(&[(1, "a", 10, None), (2, "b", 20, None), (3, "c", 30, None)]);
        let table = db.find_table("people").unwrap();
        let mut op = PhysicalTableScan::new(table);
        op.open(&mut RecordingTransaction::new()).unwrap();

        let mut ids = Vec::new();
        while let PollNext::Ready(record) = op.next().unwrap() {
            assert!(record.rid().is_some());
            ids.push(table.meta().decode_field(&record, 0).unwrap());
        }
        assert_eq!(vec![Value::from(1), Value::from(2), Value::from(3)], ids);

        assert_eq!(OperatorState::Exhausted, op.state);
        assert_eq!(PollNext::RecordEnd, op.next().unwrap());
    }

    #[test]
    fn snapshot_taken_at_open() {
        let db = people_database(&[(1, "a", 10, None)]);
        let table = db.find_table("people").unwrap();
        let mut op = PhysicalTableScan::new(table);
        op.open(&mut RecordingTransaction::new()).unwrap();

        let record = table
            .make_record(&[2.into(), "b".into(), 20.into(), Value::Null])
            .unwrap();
        table.insert_records(vec![record]).unwrap();

        assert!(matches!(op.next().unwrap(), PollNext::Ready(_)));
        assert_eq!(PollNext::RecordEnd, op.next().unwrap());
    }

    #[test]
    fn next_before_open_is_error() {
        let db = people_database(&[]);
        let mut op = PhysicalTableScan::new(db.find_table("people").unwrap());
        assert_eq!(ErrorKind::Internal, op.next().unwrap_err().kind());
    }

    #[test]
    fn close_releases_snapshot() {
        let db = people_database(&[(1, "a", 10, None)]);
        let mut op = PhysicalTableScan::new(db.find_table("people").unwrap());
        op.open(&mut RecordingTransaction::new()).unwrap();
        op.close().unwrap();
        op.close().unwrap();

        assert!(op.records.is_empty());
        assert_eq!(ErrorKind::Internal, op.next().unwrap_err().kind());
    }
}
