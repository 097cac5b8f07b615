//! The boundary through which all mutations flow.

pub mod logged;
pub mod vacuous;

use std::fmt;
use std::str::FromStr;

use rivulet_error::{DbError, ErrorKind, Result};

use crate::storage::record::{Record, RecordUpdate};
use crate::storage::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trx#{}", self.0)
    }
}

/// Writes to tables made on behalf of a single statement or session.
///
/// Each method applies its whole batch or none of it.
pub trait Transaction: fmt::Debug {
    fn id(&self) -> TransactionId;

    /// Store new records. Records must not carry a record id.
    fn insert_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()>;

    /// Replace stored records. Both images of each update share a record id.
    fn update_record(&mut self, table: &Table, updates: Vec<RecordUpdate>) -> Result<()>;

    /// Remove stored records.
    fn delete_record(&mut self, table: &Table, records: Vec<Record>) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionKind {
    /// Writes apply immediately and can't be undone.
    Vacuous,
    /// Writes apply immediately and are recorded so they can be rolled back.
    #[default]
    Logged,
}

impl TransactionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vacuous => "vacuous",
            Self::Logged => "logged",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vacuous" => Ok(Self::Vacuous),
            "logged" => Ok(Self::Logged),
            other => Err(
                DbError::with_kind(ErrorKind::InvalidArgument, "Unknown transaction kind")
                    .with_field("kind", other),
            ),
        }
    }
}
