use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;
use crate::storage::table::Table;

#[derive(Debug, Clone)]
pub struct LogicalDelete<'a> {
    pub table: &'a Table,
    pub filter: FilterStmt,
}

impl Explainable for LogicalDelete<'_> {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new("Delete").with_value("table", self.table.name());
        if self.filter.is_empty() {
            ent
        } else {
            ent.with_value("filter", &self.filter)
        }
    }
}

impl LogicalNode for Node<'_, LogicalDelete<'_>> {
    fn name(&self) -> &'static str {
        "Delete"
    }
}
