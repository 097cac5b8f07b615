use std::collections::{BTreeMap, HashSet};
use std::fmt;

use bytes::Bytes;
use parking_lot::RwLock;
use rivulet_error::{DbError, ErrorKind, Result};
use tracing::trace;

use super::record::{Record, RecordId, RecordUpdate};
use super::table_meta::{FieldMeta, TableMeta};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub(crate) usize);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory record heap for a single table.
///
/// Every batch method validates the entire batch before touching the heap,
/// and holds the write lock for the duration, so a batch is either applied
/// completely or not at all.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    meta: TableMeta,
    heap: RwLock<TableHeap>,
}

#[derive(Debug, Default)]
struct TableHeap {
    records: BTreeMap<RecordId, Bytes>,
    next_rid: u64,
}

impl Table {
    pub(crate) fn new(id: TableId, meta: TableMeta) -> Self {
        Table {
            id,
            meta,
            heap: RwLock::new(TableHeap::default()),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Build a record from values given in field order.
    ///
    /// The record has no id until it's inserted.
    pub fn make_record(&self, values: &[Value]) -> Result<Record> {
        let data = self.meta.encode(values)?;
        Ok(Record::new(data))
    }

    /// Produce a copy of `record` with a single field replaced.
    ///
    /// The returned record keeps the original record id.
    pub fn rewrite_field(
        &self,
        record: &Record,
        field: &FieldMeta,
        value: &Value,
    ) -> Result<Record> {
        let mut values = self.meta.decode_values(record)?;
        let slot = values.get_mut(field.ordinal).ok_or_else(|| {
            DbError::with_kind(ErrorKind::FieldNotFound, "Field not in table")
                .with_field("table", self.name())
                .with_field("field", &field.name)
        })?;
        *slot = value.clone();

        let mut new = Record::new(self.meta.encode(&values)?);
        if let Some(rid) = record.rid() {
            new = new.with_rid(rid);
        }
        Ok(new)
    }

    /// Snapshot all records in storage order.
    pub fn scan(&self) -> Vec<Record> {
        let heap = self.heap.read();
        heap.records
            .iter()
            .map(|(rid, data)| Record::new(data.clone()).with_rid(*rid))
            .collect()
    }

    pub fn num_records(&self) -> usize {
        self.heap.read().records.len()
    }

    pub fn get_record(&self, rid: RecordId) -> Option<Record> {
        let heap = self.heap.read();
        heap.records
            .get(&rid)
            .map(|data| Record::new(data.clone()).with_rid(rid))
    }

    /// Store new records, assigning ids in batch order.
    pub fn insert_records(&self, records: Vec<Record>) -> Result<Vec<RecordId>> {
        for record in &records {
            self.check_record_size(record)?;
            if let Some(rid) = record.rid() {
                return Err(DbError::with_kind(ErrorKind::StorageError, "Record already stored")
                    .with_field("table", self.name())
                    .with_field("rid", rid));
            }
        }

        let mut heap = self.heap.write();
        let rids = records
            .into_iter()
            .map(|record| {
                let rid = RecordId(heap.next_rid);
                heap.next_rid += 1;
                heap.records.insert(rid, record.bytes().clone());
                rid
            })
            .collect::<Vec<_>>();

        trace!(table = %self.name(), count = rids.len(), "inserted records");

        Ok(rids)
    }

    /// Replace stored records with new images.
    pub fn update_records(&self, updates: &[RecordUpdate]) -> Result<()> {
        let mut heap = self.heap.write();

        let mut seen = HashSet::with_capacity(updates.len());
        for update in updates {
            self.check_record_size(&update.new)?;
            let rid = update.old.require_rid()?;
            if update.new.rid() != Some(rid) {
                return Err(
                    DbError::with_kind(ErrorKind::StorageError, "Updated record id mismatch")
                        .with_field("rid", rid),
                );
            }
            self.check_stored(&heap, rid, &mut seen)?;
        }

        for update in updates {
            heap.records
                .insert(update.old.require_rid()?, update.new.bytes().clone());
        }

        trace!(table = %self.name(), count = updates.len(), "updated records");

        Ok(())
    }

    /// Remove records, returning the removed images.
    pub fn delete_records(&self, rids: &[RecordId]) -> Result<Vec<Record>> {
        let mut heap = self.heap.write();

        let mut seen = HashSet::with_capacity(rids.len());
        for &rid in rids {
            self.check_stored(&heap, rid, &mut seen)?;
        }

        let removed = rids
            .iter()
            .filter_map(|&rid| {
                heap.records
                    .remove(&rid)
                    .map(|data| Record::new(data).with_rid(rid))
            })
            .collect::<Vec<_>>();

        trace!(table = %self.name(), count = removed.len(), "deleted records");

        Ok(removed)
    }

    /// Put previously deleted records back under their original ids.
    pub fn restore_records(&self, records: &[Record]) -> Result<()> {
        let mut heap = self.heap.write();

        for record in records {
            self.check_record_size(record)?;
            let rid = record.require_rid()?;
            if heap.records.contains_key(&rid) {
                return Err(DbError::with_kind(ErrorKind::StorageError, "Record id in use")
                    .with_field("table", self.name())
                    .with_field("rid", rid));
            }
        }

        for record in records {
            heap.records.insert(record.require_rid()?, record.bytes().clone());
        }

        Ok(())
    }

    fn check_record_size(&self, record: &Record) -> Result<()> {
        if record.data().len() != self.meta.record_size() {
            return Err(DbError::with_kind(ErrorKind::StorageError, "Record size mismatch")
                .with_field("table", self.name())
                .with_field("expected", self.meta.record_size())
                .with_field("got", record.data().len()));
        }
        Ok(())
    }

    fn check_stored(
        &self,
        heap: &TableHeap,
        rid: RecordId,
        seen: &mut HashSet<RecordId>,
    ) -> Result<()> {
        if !heap.records.contains_key(&rid) {
            return Err(DbError::with_kind(ErrorKind::StorageError, "Record not found")
                .with_field("table", self.name())
                .with_field("rid", rid));
        }
        if !seen.insert(rid) {
            return Err(DbError::with_kind(ErrorKind::StorageError, "Record appears twice in batch")
                .with_field("table", self.name())
                .with_field("rid", rid));
        }
        Ok(())
    }
}
