use rivulet_error::{DbError, ErrorKind, Result};
use tracing::warn;

use crate::ast::InsertNode;
use crate::catalog::database::Database;
use crate::storage::table::Table;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct InsertStmt<'a> {
    table: &'a Table,
    values: Vec<Vec<Value>>,
}

impl<'a> InsertStmt<'a> {
    pub fn create(db: &'a Database, insert: &InsertNode) -> Result<Self> {
        let table_name = insert.relation_name.as_str();
        if table_name.is_empty() || insert.values.is_empty() {
            warn!(
                db = %db.name(),
                table = %table_name,
                rows = insert.values.len(),
                "invalid insert argument"
            );
            return Err(DbError::with_kind(
                ErrorKind::InvalidArgument,
                "Insert requires a table and at least one row",
            )
            .with_field("table", table_name)
            .with_field("rows", insert.values.len()));
        }

        let Some(table) = db.find_table(table_name) else {
            warn!(db = %db.name(), table = %table_name, "no such table");
            return Err(DbError::with_kind(ErrorKind::TableNotFound, "No such table")
                .with_field("db", db.name())
                .with_field("table", table_name));
        };

        let fields = table.meta().fields();
        for (row_idx, row) in insert.values.iter().enumerate() {
            if row.len() != fields.len() {
                warn!(
                    table = %table_name,
                    row = row_idx,
                    values = row.len(),
                    fields = fields.len(),
                    "value count mismatch"
                );
                return Err(DbError::with_kind(
                    ErrorKind::InvalidArgument,
                    "Value count does not match field count",
                )
                .with_field("table", table_name)
                .with_field("row", row_idx)
                .with_field("values", row.len())
                .with_field("fields", fields.len()));
            }

            for (field, value) in fields.iter().zip(row) {
                if !value.is_assignable_to(field.datatype, field.nullable) {
                    warn!(
                        table = %table_name,
                        field = %field.name,
                        field_type = %field.datatype,
                        value_type = %value.datatype(),
                        "field type mismatch"
                    );
                    return Err(DbError::with_kind(
                        ErrorKind::FieldTypeMismatch,
                        "Field type mismatch",
                    )
                    .with_field("table", table_name)
                    .with_field("field", &field.name)
                    .with_field("field_type", field.datatype)
                    .with_field("value_type", value.datatype()));
                }
            }
        }

        Ok(InsertStmt {
            table,
            values: insert.values.clone(),
        })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn values(&self) -> &[Vec<Value>] {
        &self.values
    }
}
