use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::table::Table;

/// Represents a full scan of a table.
#[derive(Debug, Clone)]
pub struct LogicalScan<'a> {
    pub table: &'a Table,
}

impl Explainable for LogicalScan<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Scan")
            .with_value("table", self.table.name())
            .with_value_if_verbose(conf, "table_id", self.table.id())
    }
}

impl LogicalNode for Node<'_, LogicalScan<'_>> {
    fn name(&self) -> &'static str {
        "Scan"
    }
}
