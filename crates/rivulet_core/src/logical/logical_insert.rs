use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::table::Table;
use crate::value::Value;

/// Insert literal rows into a table.
#[derive(Debug, Clone)]
pub struct LogicalInsert<'a> {
    pub table: &'a Table,
    pub values: Vec<Vec<Value>>,
}

impl Explainable for LogicalInsert<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Insert")
            .with_value("table", self.table.name())
            .with_value("rows", self.values.len())
            .with_value_if_verbose(conf, "table_id", self.table.id())
    }
}

impl LogicalNode for Node<'_, LogicalInsert<'_>> {
    fn name(&self) -> &'static str {
        "Insert"
    }
}
