use rivulet_error::Result;
use tracing::warn;

use super::{OperatorState, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::table::Table;
use crate::transaction::Transaction;
use crate::value::Value;

/// Inserts literal rows as one batch when opened.
#[derive(Debug)]
pub struct PhysicalInsert<'a> {
    table: &'a Table,
    values: Vec<Vec<Value>>,
    pub(super) state: OperatorState,
    pub(super) rows_affected: Option<usize>,
}

impl<'a> PhysicalInsert<'a> {
    pub fn new(table: &'a Table, values: Vec<Vec<Value>>) -> Self {
        PhysicalInsert {
            table,
            values,
            state: OperatorState::Unopened,
            rows_affected: None,
        }
    }

    pub(super) fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("Insert")?;

        let records = self
            .values
            .iter()
            .map(|row| {
                self.table
                    .make_record(row)
                    .inspect_err(|e| warn!(table = %self.table.name(), %e, "failed to make record"))
            })
            .collect::<Result<Vec<_>>>()?;

        let count = records.len();
        trx.insert_record(self.table, records).inspect_err(|e| {
            warn!(table = %self.table.name(), %e, "failed to insert records by transaction")
        })?;

        self.rows_affected = Some(count);
        self.state = OperatorState::Exhausted;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("Insert")?;
        Ok(PollNext::RecordEnd)
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.values = Vec::new();
        self.state = OperatorState::Closed;
        Ok(())
    }
}

impl Explainable for PhysicalInsert<'_> {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Insert")
            .with_value("table", self.table.name())
            .with_value("rows", self.values.len())
    }
}
