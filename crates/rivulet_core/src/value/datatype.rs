use std::fmt;

/// Declared type of a field or literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Text,
    /// Type of the untyped null literal.
    Null,
}

impl DataType {
    /// Number of bytes a value of this type occupies in a record, if the
    /// width is fixed.
    ///
    /// Text widths are declared per field.
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Integer | Self::Float => Some(8),
            Self::Text | Self::Null => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Null => write!(f, "NULL"),
        }
    }
}
