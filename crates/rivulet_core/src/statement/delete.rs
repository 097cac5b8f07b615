use rivulet_error::{DbError, ErrorKind, Result};
use tracing::warn;

use super::filter::{FilterStmt, TableMap};
use crate::ast::DeleteNode;
use crate::catalog::database::Database;
use crate::storage::table::Table;

#[derive(Debug, Clone)]
pub struct DeleteStmt<'a> {
    table: &'a Table,
    filter: FilterStmt,
}

impl<'a> DeleteStmt<'a> {
    pub fn create(db: &'a Database, delete: &DeleteNode) -> Result<Self> {
        let table_name = delete.relation_name.as_str();
        if table_name.is_empty() {
            warn!(db = %db.name(), "delete missing table name");
            return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Delete requires a table"));
        }

        let Some(table) = db.find_table(table_name) else {
            warn!(db = %db.name(), table = %table_name, "no such table");
            return Err(DbError::with_kind(ErrorKind::TableNotFound, "No such table")
                .with_field("db", db.name())
                .with_field("table", table_name));
        };

        let mut tables = TableMap::new();
        tables.insert(table_name.to_string(), table);

        let filter = FilterStmt::create(db, Some(table), &tables, &delete.conditions)
            .inspect_err(|e| warn!(%e, "failed to create filter statement"))?;

        Ok(DeleteStmt { table, filter })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
