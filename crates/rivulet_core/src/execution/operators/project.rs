use rivulet_error::Result;

use super::{OperatorState, PhysicalOperator, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::record::Record;
use crate::storage::table_meta::{FieldMeta, TableMeta};
use crate::transaction::Transaction;

/// Re-encodes a subset of the child's fields into records with the output
/// layout. Record ids pass through unchanged.
#[derive(Debug)]
pub struct PhysicalProject<'a> {
    /// Projected fields in the child's layout, in output order.
    fields: Vec<FieldMeta>,
    pub(super) output: TableMeta,
    pub(super) child: Box<PhysicalOperator<'a>>,
    pub(super) state: OperatorState,
}

impl<'a> PhysicalProject<'a> {
    pub fn new(fields: Vec<FieldMeta>, output: TableMeta, child: PhysicalOperator<'a>) -> Self {
        PhysicalProject {
            fields,
            output,
            child: Box::new(child),
            state: OperatorState::Unopened,
        }
    }

    pub(super) fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("Project")?;
        self.child.open(trx)?;
        self.state = OperatorState::Opened;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("Project")?;
        if self.state == OperatorState::Exhausted {
            return Ok(PollNext::RecordEnd);
        }

        match self.child.next()? {
            PollNext::Ready(record) => {
                let values = self
                    .fields
                    .iter()
                    .map(|f| f.decode(&record))
                    .collect::<Result<Vec<_>>>()?;

                let mut projected = Record::new(self.output.encode(&values)?);
                if let Some(rid) = record.rid() {
                    projected = projected.with_rid(rid);
                }
                Ok(PollNext::Ready(projected))
            }
            PollNext::RecordEnd => {
                self.state = OperatorState::Exhausted;
                Ok(PollNext::RecordEnd)
            }
        }
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.state = OperatorState::Closed;
        self.child.close()
    }
}

impl Explainable for PhysicalProject<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Project")
            .with_values("fields", self.output.field_names())
            .with_value_if_verbose(conf, "record_size", self.output.record_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::operators::table_scan::PhysicalTableScan;
    use crate::testutil::{RecordingTransaction, people_database};
    use crate::value::Value;

    #[test]
    fn projects_fields_in_output_order() {
        let db = people_database(&[(1, "ann", 30, Some(1.5)), (2, "bob", 40, None)]);
        let table = db.find_table("people").unwrap();
        let meta = table.meta();

        let fields = vec![
            meta.field("score").unwrap().clone(),
            meta.field("name").unwrap().clone(),
        ];
        let output = meta.project("people", &[3, 1]).unwrap();
        let mut op = PhysicalOperator::Project(PhysicalProject::new(
            fields,
            output.clone(),
            PhysicalOperator::TableScan(PhysicalTableScan::new(table)),
        ));

        op.open(&mut RecordingTransaction::new()).unwrap();
        assert_eq!(Some(&output), op.output_meta());

        let mut rows = Vec::new();
        while let PollNext::Ready(record) = op.next().unwrap() {
            assert!(record.rid().is_some());
            rows.push(output.decode_values(&record).unwrap());
        }
        assert_eq!(
            vec![
                vec![Value::from(1.5), Value::from("ann")],
                vec![Value::Null, Value::from("bob")],
            ],
            rows
        );

        op.close().unwrap();
        op.close().unwrap();
    }
}
