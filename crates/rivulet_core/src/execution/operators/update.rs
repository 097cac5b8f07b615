use rivulet_error::Result;
use tracing::warn;

use super::{OperatorState, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;
use crate::storage::record::RecordUpdate;
use crate::storage::table::Table;
use crate::storage::table_meta::FieldMeta;
use crate::transaction::Transaction;
use crate::value::Value;

/// Rewrites one field of every matching record as one batch when opened.
#[derive(Debug)]
pub struct PhysicalUpdate<'a> {
    table: &'a Table,
    field: FieldMeta,
    value: Value,
    filter: FilterStmt,
    pub(super) state: OperatorState,
    pub(super) rows_affected: Option<usize>,
}

impl<'a> PhysicalUpdate<'a> {
    pub fn new(table: &'a Table, field: FieldMeta, value: Value, filter: FilterStmt) -> Self {
        PhysicalUpdate {
            table,
            field,
            value,
            filter,
            state: OperatorState::Unopened,
            rows_affected: None,
        }
    }

    pub(super) fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("Update")?;

        let mut updates = Vec::new();
        for record in self.table.scan() {
            if !self.filter.evaluate(&record)? {
                continue;
            }
            let new = self.table.rewrite_field(&record, &self.field, &self.value)?;
            updates.push(RecordUpdate::try_new(record, new)?);
        }

        let count = updates.len();
        trx.update_record(self.table, updates).inspect_err(|e| {
            warn!(table = %self.table.name(), %e, "failed to update records by transaction")
        })?;

        self.rows_affected = Some(count);
        self.state = OperatorState::Exhausted;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("Update")?;
        Ok(PollNext::RecordEnd)
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.state = OperatorState::Closed;
        Ok(())
    }
}

impl Explainable for PhysicalUpdate<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let mut ent = ExplainEntry::new("Update")
            .with_value("table", self.table.name())
            .with_value("field", &self.field.name)
            .with_value("value", &self.value)
            .with_value_if_verbose(conf, "field_offset", self.field.offset);
        if !self.filter.is_empty() {
            ent = ent.with_value("filter", &self.filter);
        }
        ent
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
    use crate::value::ComparisonOperator;

    fn age_filter(db: &crate::catalog::database::Database, age: i64) -> FilterStmt {
        let table = db.find_table("people").unwrap();
        let tables: TableMap = [("people".to_string(), table)].into_iter().collect();
        FilterStmt::create(
            db,
            Some(table),
            &tables,
            &[ConditionNode::attr_value("age", ComparisonOperator::Eq, age)],
        )
        .unwrap()
    }

    #[test]
    fn updates_matching_records_in_one_call() {
        let db = people_database(&[(1, "a", 30, None), (2, "b", 31, None), (3, "c", 30, None)]);
        let table = db.find_table("people").unwrap();
        let field = table.meta().field("name").unwrap().clone();

        let mut op = PhysicalOperator::Update(PhysicalUpdate::new(
            table,
            field,
            Value::from("z"),
            age_filter(&db, 30),
        ));
        let mut trx = RecordingTransaction::new();
        op.open(&mut trx).unwrap();

        let [RecordedCall::Update { updates, .. }] = trx.calls.as_slice() else {
            panic!("expected a single update call, got {:?}", trx.calls);
        };
        let rewritten: Vec<_> = updates
            .iter()
            .map(|u| table.meta().decode_values(&u.new).unwrap())
            .collect();
        assert_eq!(
            vec![
                vec![1.into(), "z".into(), 30.into(), Value::Null],
                vec![3.into(), "z".into(), 30.into(), Value::Null],
            ],
            rewritten
        );
        assert!(updates.iter().all(|u| u.old.rid() == u.new.rid()));

        assert_eq!(Some(2), op.rows_affected());
        assert_eq!(PollNext::RecordEnd, op.next().unwrap());
    }

    #[test]
    fn no_matches_still_calls_transaction() {
        let db = people_database(&[(1, "a", 30, None)]);
        let table = db.find_table("people").unwrap();
        let field = table.meta().field("age").unwrap().clone();

        let mut op = PhysicalUpdate::new(table, field, Value::from(1), age_filter(&db, 99));
        let mut trx = RecordingTransaction::new();
        op.open(&mut trx).unwrap();

        assert_eq!(
            vec![RecordedCall::Update {
                table: "people".to_string(),
                updates: Vec::new(),
            }],
            trx.calls
        );
        assert_eq!(Some(0), op.rows_affected);
    }

    #[test]
    fn transaction_failure_propagates() {
        let db = people_database(&[(1, "a", 30, None)]);
        let table = db.find_table("people").unwrap();
        let field = table.meta().field("age").unwrap().clone();

        let mut op = PhysicalUpdate::new(table, field, Value::from(1), FilterStmt::empty());
        let mut trx = RecordingTransaction::failing();
        let err = op.open(&mut trx).unwrap_err();

        assert_eq!(ErrorKind::StorageError, err.kind());
        assert_eq!(1, trx.calls.len());
        assert_eq!(OperatorState::Unopened, op.state);
    }

    #[test]
    fn filter_decode_failure_propagates() {
        let db = people_database(&[(1, "a", 30, None)]);
        let table = db.find_table("people").unwrap();
        let field = table.meta().field("age").unwrap().clone();

        let mut op = PhysicalUpdate::new(table, field, Value::from(1), misaligned_age_filter());
        let mut trx = RecordingTransaction::new();
        let err = op.open(&mut trx).unwrap_err();

        assert_eq!(ErrorKind::StorageError, err.kind());
        assert!(trx.calls.is_empty());
        assert_eq!(OperatorState::Unopened, op.state);
    }
}
