use crate::value::DataType;

/// Default declared length for text fields with no explicit length.
pub const DEFAULT_TEXT_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub datatype: DataType,
    /// Declared maximum length in bytes. Only meaningful for text fields.
    pub len: Option<usize>,
    pub nullable: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        FieldDefinition {
            name: name.into(),
            datatype,
            len: None,
            nullable: false,
        }
    }

    pub fn with_len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableInfo {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl CreateTableInfo {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        CreateTableInfo {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }
}
