use rivulet_error::{DbError, ErrorKind, Result};
use tracing::{debug, error};

use super::{Transaction, TransactionId};
use crate::catalog::database::Database;
use crate::storage::record::{Record, RecordId, RecordUpdate};
use crate::storage::table::{Table, TableId};

#[derive(Debug)]
enum UndoEntry {
    Insert {
        table: TableId,
        rids: Vec<RecordId>,
    },
    Update {
        table: TableId,
        updates: Vec<RecordUpdate>,
    },
    Delete {
        table: TableId,
        records: Vec<Record>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// Transaction that writes through to tables while keeping an undo log.
///
/// Rollback replays the log backwards. Once committed or rolled back the
/// transaction rejects further use.
#[derive(Debug)]
pub struct LoggedTransaction<'a> {
    id: TransactionId,
    db: &'a Database,
    undo_log: Vec<UndoEntry>,
    state: TransactionState,
}

impl<'a> LoggedTransaction<'a> {
    pub fn new(id: TransactionId, db: &'a Database) -> Self {
        LoggedTransaction {
            id,
            db,
            undo_log: Vec::new(),
            state: TransactionState::Active,
        }
    }

    fn check_active(&self) -> Result<()> {
        if self.state != TransactionState::Active {
            return Err(
                DbError::with_kind(ErrorKind::InvalidArgument, "Transaction already finished")
                    .with_field("id", self.id),
            );
        }
        Ok(())
    }

    /// Ensure the table belongs to the database this transaction was started
    /// on, since rollback resolves tables by id.
    fn check_table(&self, table: &Table) -> Result<()> {
        match self.db.get_table(table.id()) {
            Some(found) if std::ptr::eq(found, table) => Ok(()),
            _ => Err(
                DbError::with_kind(ErrorKind::StorageError, "Table not in transaction database")
                    .with_field("table", table.name())
                    .with_field("database", self.db.name()),
            ),
        }
    }

    fn table(&self, id: TableId) -> Result<&'a Table> {
        self.db.get_table(id).ok_or_else(|| {
            DbError::with_kind(ErrorKind::StorageError, "Missing table for undo entry")
                .with_field("table_id", id)
        })
    }

    fn undo(&self, entry: UndoEntry) -> Result<()> {
        match entry {
            UndoEntry::Insert { table, rids } => {
                self.table(table)?.delete_records(&rids)?;
            }
            UndoEntry::Update { table, updates } => {
                let inverted: Vec<_> = updates.into_iter().map(RecordUpdate::inverted).collect();
                self.table(table)?.update_records(&inverted)?;
            }
            UndoEntry::Delete { table, records } => {
                self.table(table)?.restore_records(&records)?;
            }
        }
        Ok(())
    }
}

impl Transaction for LoggedTransaction<'_> {
    fn id(&self) -> TransactionId {
        self.id
    }

    fn insert_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        self.check_active()?;
        self.check_table(table)?;

        let rids = table.insert_records(records)?;
        self.undo_log.push(UndoEntry::Insert {
            table: table.id(),
            rids,
        });
        Ok(())
    }

    fn update_record(&mut self, table: &Table, updates: Vec<RecordUpdate>) -> Result<()> {
        self.check_active()?;
        self.check_table(table)?;

        // Log the images actually stored, not the caller's view of the old
        // records.
        let updates = updates
            .into_iter()
            .map(|update| {
                let rid = update.old.require_rid()?;
                let stored = table.get_record(rid).ok_or_else(|| {
                    DbError::with_kind(ErrorKind::StorageError, "Record not found")
                        .with_field("table", table.name())
                        .with_field("rid", rid)
                })?;
                Ok(RecordUpdate {
                    old: stored,
                    new: update.new,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        table.update_records(&updates)?;
        self.undo_log.push(UndoEntry::Update {
            table: table.id(),
            updates,
        });
        Ok(())
    }

    fn delete_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()> {
        self.check_active()?;
        self.check_table(table)?;

        let rids = records
            .iter()
            .map(|r| r.require_rid())
            .collect::<Result<Vec<_>>>()?;
        let removed = table.delete_records(&rids)?;
        self.undo_log.push(UndoEntry::Delete {
            table: table.id(),
            records: removed,
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.check_active()?;
        debug!(id = %self.id, entries = self.undo_log.len(), "committing transaction");
        self.undo_log.clear();
        self.state = TransactionState::Committed;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.check_active()?;
        debug!(id = %self.id, entries = self.undo_log.len(), "rolling back transaction");
        self.state = TransactionState::RolledBack;

        // Every entry is attempted even if an earlier one fails. The first
        // failure is returned.
        let mut first_err = None;
        while let Some(entry) = self.undo_log.pop() {
            if let Err(e) = self.undo(entry) {
                error!(id = %self.id, %e, "failed to undo transaction entry");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
