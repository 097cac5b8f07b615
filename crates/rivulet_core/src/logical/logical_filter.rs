use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalFilter {
    pub filter: FilterStmt,
}

impl Explainable for LogicalFilter {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Filter").with_values("predicates", self.filter.comparisons())
    }
}

impl LogicalNode for Node<'_, LogicalFilter> {
    fn name(&self) -> &'static str {
        "Filter"
    }
}
