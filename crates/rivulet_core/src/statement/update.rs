use rivulet_error::{DbError, ErrorKind, Result};
use tracing::warn;

use super::filter::{FilterStmt, TableMap};
use crate::ast::UpdateNode;
use crate::catalog::database::Database;
use crate::storage::table::Table;
use crate::storage::table_meta::FieldMeta;
use crate::value::Value;

/// Set one field to a literal for every record matching a filter.
#[derive(Debug, Clone)]
pub struct UpdateStmt<'a> {
    table: &'a Table,
    field: FieldMeta,
    value: Value,
    filter: FilterStmt,
}

impl<'a> UpdateStmt<'a> {
    pub fn create(db: &'a Database, update: &UpdateNode) -> Result<Self> {
        let table_name = update.relation_name.as_str();
        let column_name = update.attribute_name.as_str();
        let value = match &update.value {
            Some(value) if !table_name.is_empty() && !column_name.is_empty() => value,
            _ => {
                warn!(
                    db = %db.name(),
                    table = %table_name,
                    column = %column_name,
                    has_value = update.value.is_some(),
                    "invalid update argument"
                );
                return Err(DbError::with_kind(
                    ErrorKind::InvalidArgument,
                    "Update requires a table, a column, and a value",
                )
                .with_field("table", table_name)
                .with_field("column", column_name));
            }
        };

        let Some(table) = db.find_table(table_name) else {
            warn!(db = %db.name(), table = %table_name, "no such table");
            return Err(DbError::with_kind(ErrorKind::TableNotFound, "No such table")
                .with_field("db", db.name())
                .with_field("table", table_name));
        };

        let Some(field) = table.meta().field(column_name) else {
            warn!(table = %table_name, column = %column_name, "field does not exist");
            return Err(DbError::with_kind(ErrorKind::FieldNotFound, "Field does not exist")
                .with_field("table", table_name)
                .with_field("column", column_name));
        };

        if !value.is_assignable_to(field.datatype, field.nullable) {
            warn!(
                table = %table_name,
                field = %field.name,
                field_type = %field.datatype,
                value_type = %value.datatype(),
                "field type mismatch"
            );
            return Err(DbError::with_kind(ErrorKind::FieldTypeMismatch, "Field type mismatch")
                .with_field("table", table_name)
                .with_field("field", &field.name)
                .with_field("field_type", field.datatype)
                .with_field("value_type", value.datatype()));
        }

        let mut tables = TableMap::new();
        tables.insert(table_name.to_string(), table);

        let filter = FilterStmt::create(db, Some(table), &tables, &update.conditions)
            .inspect_err(|e| warn!(%e, "failed to create filter statement"))?;

        Ok(UpdateStmt {
            table,
            field: field.clone(),
            value: value.clone(),
            filter,
        })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn field(&self) -> &FieldMeta {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
