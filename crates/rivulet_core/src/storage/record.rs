use std::fmt;

use bytes::Bytes;
use rivulet_error::{DbError, ErrorKind, Result};

/// Identity of a stored record within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub(crate) u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rid#{}", self.0)
    }
}

/// An encoded tuple.
///
/// Records made from values have no id until they're inserted. Records read
/// from a table always carry the id they're stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rid: Option<RecordId>,
    data: Bytes,
}

impl Record {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Record {
            rid: None,
            data: data.into(),
        }
    }

    pub fn with_rid(mut self, rid: RecordId) -> Self {
        self.rid = Some(rid);
        self
    }

    pub fn rid(&self) -> Option<RecordId> {
        self.rid
    }

    /// Get the record id, erroring if this record was never stored.
    pub fn require_rid(&self) -> Result<RecordId> {
        self.rid.ok_or_else(|| {
            DbError::with_kind(ErrorKind::StorageError, "Record has no record id")
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn bytes(&self) -> &Bytes {
        &self.data
    }
}

/// Replacement of a stored record with a new image.
///
/// Both images share the same record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub old: Record,
    pub new: Record,
}

impl RecordUpdate {
    pub fn try_new(old: Record, new: Record) -> Result<Self> {
        let rid = old.require_rid()?;
        if new.rid() != Some(rid) {
            return Err(
                DbError::with_kind(ErrorKind::StorageError, "Updated record id mismatch")
                    .with_field("old", rid)
                    .with_field(
                        "new",
                        new.rid()
                            .map(|rid| rid.to_string())
                            .unwrap_or_else(|| "none".to_string()),
                    ),
            );
        }
        Ok(RecordUpdate { old, new })
    }

    /// Swap the images, producing the update that undoes this one.
    pub fn inverted(self) -> Self {
        RecordUpdate {
            old: self.new,
            new: self.old,
        }
    }
}
