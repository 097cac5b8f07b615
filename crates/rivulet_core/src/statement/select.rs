use rivulet_error::{DbError, ErrorKind, Result};
use tracing::warn;

use super::filter::{FilterStmt, TableMap, find_field, resolve_table};
use crate::ast::SelectNode;
use crate::catalog::database::Database;
use crate::storage::table::Table;
use crate::storage::table_meta::FieldMeta;

/// Read projected fields from records of a single table.
#[derive(Debug, Clone)]
pub struct SelectStmt<'a> {
    table: &'a Table,
    fields: Vec<FieldMeta>,
    filter: FilterStmt,
}

impl<'a> SelectStmt<'a> {
    pub fn create(db: &'a Database, select: &SelectNode) -> Result<Self> {
        let table_name = match select.relations.as_slice() {
            [name] if !name.is_empty() => name.as_str(),
            _ => {
                warn!(
                    db = %db.name(),
                    relations = select.relations.len(),
                    "select requires exactly one relation"
                );
                return Err(DbError::with_kind(
                    ErrorKind::InvalidArgument,
                    "Select requires exactly one relation",
                )
                .with_field("relations", select.relations.len()));
            }
        };
        if select.attributes.is_empty() {
            warn!(table = %table_name, "select with no attributes");
            return Err(DbError::with_kind(
                ErrorKind::InvalidArgument,
                "Select requires at least one attribute",
            )
            .with_field("table", table_name));
        }

        let Some(table) = db.find_table(table_name) else {
            warn!(db = %db.name(), table = %table_name, "no such table");
            return Err(DbError::with_kind(ErrorKind::TableNotFound, "No such table")
                .with_field("db", db.name())
                .with_field("table", table_name));
        };

        let mut tables = TableMap::new();
        tables.insert(table_name.to_string(), table);

        let mut fields = Vec::new();
        for attr in &select.attributes {
            let attr_table = resolve_table(Some(table), &tables, attr)
                .inspect_err(|e| warn!(%e, "failed to resolve select attribute"))?;
            if attr.is_wildcard() {
                fields.extend(attr_table.meta().fields().iter().cloned());
            } else {
                let field = find_field(attr_table, &attr.attribute_name)
                    .inspect_err(|e| warn!(%e, "failed to resolve select attribute"))?;
                fields.push(field.clone());
            }
        }

        let filter = FilterStmt::create(db, Some(table), &tables, &select.conditions)
            .inspect_err(|e| warn!(%e, "failed to create filter statement"))?;

        Ok(SelectStmt {
            table,
            fields,
            filter,
        })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Output fields in select-list order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn filter(&self) -> &FilterStmt {
        &self.filter
    }
}
