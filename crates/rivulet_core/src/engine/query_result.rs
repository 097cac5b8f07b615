use std::fmt;

use crate::value::Value;

/// Output of executing a single statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Output field names. Empty for mutations.
    pub fields: Vec<String>,
    /// Decoded output rows in the order they were produced.
    pub rows: Vec<Vec<Value>>,
    /// Number of records written, for mutations.
    pub rows_affected: Option<usize>,
}

impl QueryResult {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.rows_affected {
            return write!(f, "{n} rows affected");
        }

        writeln!(f, "{}", self.fields.join(" | "))?;
        for row in &self.rows {
            let row = row.iter().map(|v| v.to_string()).collect::<Vec<_>>();
            writeln!(f, "{}", row.join(" | "))?;
        }
        Ok(())
    }
}
