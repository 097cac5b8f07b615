use std::collections::HashSet;

use bytes::{Bytes, BytesMut};
use rivulet_error::{DbError, ErrorKind, Result};

use super::record::Record;
use crate::catalog::create::{DEFAULT_TEXT_LEN, FieldDefinition};
use crate::value::{DataType, Value};

/// Metadata for a single field in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: String,
    pub datatype: DataType,
    /// Width in bytes of this field in the record.
    pub len: usize,
    /// Byte offset of this field in the record.
    pub offset: usize,
    /// Position of this field in the table.
    pub ordinal: usize,
    pub nullable: bool,
}

impl FieldMeta {
    /// Read this field's value out of a record.
    ///
    /// Errors if the record is too short to contain the field.
    pub fn decode(&self, record: &Record) -> Result<Value> {
        let data = record.data();
        let end = self.offset + self.len;
        let bitmap_byte = self.ordinal / 8;
        if data.len() < end || data.len() <= bitmap_byte {
            return Err(malformed_record(record).with_field("field", &self.name));
        }

        if data[bitmap_byte] & (1 << (self.ordinal % 8)) != 0 {
            return Ok(Value::Null);
        }

        let buf = &data[self.offset..end];
        let value = match self.datatype {
            DataType::Integer => Value::Integer(i64::from_le_bytes(fixed_bytes(buf)?)),
            DataType::Float => Value::Float(f64::from_le_bytes(fixed_bytes(buf)?)),
            DataType::Text => {
                let text_len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
                let s = std::str::from_utf8(&buf[..text_len]).map_err(|e| {
                    DbError::with_kind(ErrorKind::StorageError, "Text field is not valid utf8")
                        .with_field("field", &self.name)
                        .with_source(e)
                })?;
                Value::Text(s.to_string())
            }
            DataType::Null => {
                return Err(
                    DbError::new("Field declared with null type").with_field("field", &self.name)
                );
            }
        };

        Ok(value)
    }
}

fn fixed_bytes(buf: &[u8]) -> Result<[u8; 8]> {
    buf.try_into().map_err(|_| {
        DbError::with_kind(ErrorKind::StorageError, "Fixed width field has wrong size")
    })
}

fn malformed_record(record: &Record) -> DbError {
    DbError::with_kind(ErrorKind::StorageError, "Malformed record")
        .with_field("len", record.data().len())
}

/// Layout of records in a table.
///
/// Records start with a null bitmap (one bit per field), followed by each
/// field at its offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    name: String,
    fields: Vec<FieldMeta>,
    record_size: usize,
}

impl TableMeta {
    pub fn try_new(name: impl Into<String>, defs: &[FieldDefinition]) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Empty table name"));
        }
        if defs.is_empty() {
            return Err(
                DbError::with_kind(ErrorKind::InvalidArgument, "Table requires at least one field")
                    .with_field("table", &name),
            );
        }

        let mut seen = HashSet::with_capacity(defs.len());
        for def in defs {
            if def.name.is_empty() {
                return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Empty field name")
                    .with_field("table", &name));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Duplicate field name")
                    .with_field("table", &name)
                    .with_field("field", &def.name));
            }
        }

        Self::with_layout(name, defs)
    }

    /// Compute offsets and ordinals for already validated definitions.
    ///
    /// Field names may repeat, as they do in projected output.
    fn with_layout(name: String, defs: &[FieldDefinition]) -> Result<Self> {
        let mut fields = Vec::with_capacity(defs.len());
        let mut offset = null_bitmap_len(defs.len());
        for (ordinal, def) in defs.iter().enumerate() {
            let len = match def.datatype {
                DataType::Integer | DataType::Float => {
                    def.datatype.fixed_width().unwrap_or_default()
                }
                DataType::Text => def.len.unwrap_or(DEFAULT_TEXT_LEN),
                DataType::Null => {
                    return Err(DbError::with_kind(
                        ErrorKind::InvalidArgument,
                        "Field cannot have null type",
                    )
                    .with_field("field", &def.name));
                }
            };
            if len == 0 {
                return Err(
                    DbError::with_kind(ErrorKind::InvalidArgument, "Field length must be positive")
                        .with_field("field", &def.name),
                );
            }

            fields.push(FieldMeta {
                name: def.name.clone(),
                datatype: def.datatype,
                len,
                offset,
                ordinal,
                nullable: def.nullable,
            });
            offset += len;
        }

        Ok(TableMeta {
            name,
            fields,
            record_size: offset,
        })
    }

    /// Build the layout for a subset of this table's fields.
    ///
    /// Used for projected output. Offsets and ordinals are recomputed. The
    /// same ordinal may be listed more than once.
    pub fn project(&self, name: impl Into<String>, ordinals: &[usize]) -> Result<Self> {
        let defs = ordinals
            .iter()
            .map(|&idx| {
                let field = self.field_at(idx).ok_or_else(|| {
                    DbError::with_kind(ErrorKind::FieldNotFound, "Field ordinal out of range")
                        .with_field("ordinal", idx)
                        .with_field("table", &self.name)
                })?;
                Ok(FieldDefinition {
                    name: field.name.clone(),
                    datatype: field.datatype,
                    len: Some(field.len),
                    nullable: field.nullable,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        TableMeta::with_layout(name.into(), &defs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_at(&self, ordinal: usize) -> Option<&FieldMeta> {
        self.fields.get(ordinal)
    }

    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Encode values (in field order) into record bytes.
    pub fn encode(&self, values: &[Value]) -> Result<Bytes> {
        if values.len() != self.fields.len() {
            return Err(DbError::with_kind(
                ErrorKind::StorageError,
                "Value count does not match field count",
            )
            .with_field("table", &self.name)
            .with_field("values", values.len())
            .with_field("fields", self.fields.len()));
        }

        let mut buf = BytesMut::zeroed(self.record_size);
        for (field, value) in self.fields.iter().zip(values) {
            if !value.is_assignable_to(field.datatype, field.nullable) {
                return Err(
                    DbError::with_kind(ErrorKind::StorageError, "Value not assignable to field")
                        .with_field("table", &self.name)
                        .with_field("field", &field.name)
                        .with_field("field_type", field.datatype)
                        .with_field("value_type", value.datatype()),
                );
            }

            let range = field.offset..field.offset + field.len;
            match value {
                Value::Null => {
                    buf[field.ordinal / 8] |= 1 << (field.ordinal % 8);
                }
                Value::Integer(v) => buf[range].copy_from_slice(&v.to_le_bytes()),
                Value::Float(v) => buf[range].copy_from_slice(&v.to_le_bytes()),
                Value::Text(s) => {
                    if s.len() > field.len {
                        return Err(DbError::with_kind(
                            ErrorKind::StorageError,
                            "Text value too long",
                        )
                        .with_field("field", &field.name)
                        .with_field("max_len", field.len)
                        .with_field("len", s.len()));
                    }
                    // Stored text ends at the first zero byte.
                    if s.as_bytes().contains(&0) {
                        return Err(DbError::with_kind(
                            ErrorKind::StorageError,
                            "Text value contains a NUL byte",
                        )
                        .with_field("field", &field.name));
                    }
                    buf[field.offset..field.offset + s.len()].copy_from_slice(s.as_bytes());
                }
            }
        }

        Ok(buf.freeze())
    }

    /// Decode a single field by ordinal.
    pub fn decode_field(&self, record: &Record, ordinal: usize) -> Result<Value> {
        let field = self.field_at(ordinal).ok_or_else(|| {
            DbError::with_kind(ErrorKind::FieldNotFound, "Field ordinal out of range")
                .with_field("ordinal", ordinal)
                .with_field("table", &self.name)
        })?;
        field.decode(record)
    }

    /// Decode all values from a record using this layout.
    pub fn decode_values(&self, record: &Record) -> Result<Vec<Value>> {
        if record.data().len() != self.record_size {
            return Err(malformed_record(record)
                .with_field("table", &self.name)
                .with_field("expected_len", self.record_size));
        }
        self.fields.iter().map(|f| f.decode(record)).collect()
    }
}

fn null_bitmap_len(num_fields: usize) -> usize {
    num_fields.div_ceil(8)
}
