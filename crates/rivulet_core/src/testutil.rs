//! Fixtures shared by tests across the crate.

use rivulet_error::{DbError, ErrorKind, Result};

use crate::ast::ConditionNode;
use crate::catalog::create::{CreateTableInfo, FieldDefinition};
use crate::catalog::database::Database;
use crate::statement::filter::{FilterStmt, TableMap};
use crate::storage::record::{Record, RecordUpdate};
use crate::storage::table::Table;
use crate::transaction::{Transaction, TransactionId};
use crate::value::{ComparisonOperator, DataType, Value};

/// Create a database with a single "people" table holding the given rows.
///
/// Columns: id INTEGER, name TEXT(8), age INTEGER, score FLOAT NULL.
pub fn people_database(rows: &[(i64, &str, i64, Option<f64>)]) -> Database {
    let mut db = Database::new("test");
    let table = db
        .create_table(CreateTableInfo::new(
            "people",
            [
                FieldDefinition::new("id", DataType::Integer),
                FieldDefinition::new("name", DataType::Text).with_len(8),
                FieldDefinition::new("age", DataType::Integer),
                FieldDefinition::new("score", DataType::Float).nullable(),
            ],
        ))
        .unwrap();

    let records = rows
        .iter()
        .map(|(id, name, age, score)| {
            table
                .make_record(&[
                    (*id).into(),
                    (*name).into(),
                    (*age).into(),
                    score.map(Value::Float).unwrap_or(Value::Null),
                ])
                .unwrap()
        })
        .collect();
    table.insert_records(records).unwrap();

    db
}

/// Decode every row in the people table in scan order.
pub fn scan_people(db: &Database) -> Vec<Vec<Value>> {
    let table = db.find_table("people").unwrap();
    table
        .scan()
        .iter()
        .map(|r| table.meta().decode_values(r).unwrap())
        .collect()
}

/// Filter `age = 30` resolved against a wider "people" layout whose age
/// field sits past the end of records from [`people_database`].
///
/// Evaluating it against a people record fails to decode the field.
pub fn misaligned_age_filter() -> FilterStmt {
    let mut db = Database::new("wide");
    db.create_table(CreateTableInfo::new(
        "people",
        [
            FieldDefinition::new("pad", DataType::Text).with_len(64),
            FieldDefinition::new("age", DataType::Integer),
        ],
    ))
    .unwrap();
    let table = db.find_table("people").unwrap();
    let tables: TableMap = [("people".to_string(), table)].into_iter().collect();

    FilterStmt::create(
        &db,
        Some(table),
        &tables,
        &[ConditionNode::attr_value("age", ComparisonOperator::Eq, 30)],
    )
    .unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Insert {
        table: String,
        records: Vec<Record>,
    },
    Update {
        table: String,
        updates: Vec<RecordUpdate>,
    },
    Delete {
        table: String,
        records: Vec<Record>,
    },
}

/// Transaction that records every call without touching storage.
///
/// When created with `failing`, every write call is recorded and then
/// reported as a storage error.
#[derive(Debug, Default)]
pub struct RecordingTransaction {
    pub calls: Vec<RecordedCall>,
    pub commits: usize,
    pub rollbacks: usize,
    fail: bool,
}

impl RecordingTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingTransaction {
            fail: true,
            ..Default::default()
        }
    }

    fn finish_call(&self, call: &str) -> Result<()> {
        if self.fail {
            return Err(DbError::with_kind(ErrorKind::StorageError, "Injected failure")
                .with_field("call", call));
        }
        Ok(())
    }
}

impl Transaction for RecordingTransaction {
    fn id(&self) -> TransactionId {
        TransactionId(0)
    }

    fn insert_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        self.calls.push(RecordedCall::Insert {
            table: table.name().to_string(),
            records,
        });
        self.finish_call("insert")
    }

    fn update_record(&mut self, table: &Table, updates: Vec<RecordUpdate>) -> Result<()> {
        self.calls.push(RecordedCall::Update {
            table: table.name().to_string(),
            updates,
        });
        self.finish_call("update")
    }

    fn delete_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        self.calls.push(RecordedCall::Delete {
            table: table.name().to_string(),
            records,
        });
        self.finish_call("delete")
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.rollbacks += 1;
        Ok(())
    }
}
