use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use rivulet_error::{DbError, ErrorKind, Result};
use tracing::debug;

use super::create::CreateTableInfo;
use crate::storage::table::{Table, TableId};
use crate::storage::table_meta::TableMeta;
use crate::transaction::logged::LoggedTransaction;
use crate::transaction::vacuous::VacuousTransaction;
use crate::transaction::{Transaction, TransactionId, TransactionKind};

/// A named collection of tables.
///
/// Tables are kept in creation order, and a table's id is its position in
/// that order. Tables are never dropped, so ids stay stable.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: IndexMap<String, Table>,
    next_trx_id: AtomicU64,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Database {
            name: name.into(),
            tables: IndexMap::new(),
            next_trx_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table(&self, id: TableId) -> Option<&Table> {
        self.tables.get_index(id.0).map(|(_, table)| table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn create_table(&mut self, info: CreateTableInfo) -> Result<&Table> {
        if self.tables.contains_key(&info.name) {
            return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Duplicate table name")
                .with_field("table", &info.name)
                .with_field("database", &self.name));
        }

        let meta = TableMeta::try_new(info.name.clone(), &info.fields)?;
        let id = TableId(self.tables.len());
        debug!(table = %info.name, %id, record_size = meta.record_size(), "creating table");

        let table = self.tables.entry(info.name).or_insert(Table::new(id, meta));
        Ok(&*table)
    }

    /// Start a new transaction against this database.
    pub fn begin(&self, kind: TransactionKind) -> Box<dyn Transaction + '_> {
        let id = TransactionId(self.next_trx_id.fetch_add(1, Ordering::Relaxed));
        debug!(%id, %kind, "beginning transaction");

        match kind {
            TransactionKind::Vacuous => Box::new(VacuousTransaction::new(id)),
            TransactionKind::Logged => Box::new(LoggedTransaction::new(id, self)),
        }
    }
}
