use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;
use crate::storage::table::Table;
use crate::storage::table_meta::FieldMeta;
use crate::value::Value;

/// Set a single field to a literal on matching records.
///
/// Finds its own input, so it has no children.
#[derive(Debug, Clone)]
pub struct LogicalUpdate<'a> {
    pub table: &'a Table,
    pub field: FieldMeta,
    pub value: Value,
    pub filter: FilterStmt,
}

impl Explainable for LogicalUpdate<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let mut ent = ExplainEntry::new("Update")
            .with_value("table", self.table.name())
            .with_value("field", &self.field.name)
            .with_value("value", &self.value)
            .with_value_if_verbose(conf, "field_ordinal", self.field.ordinal);
        if !self.filter.is_empty() {
            ent = ent.with_value("filter", &self.filter);
        }
        ent
    }
}

impl LogicalNode for Node<'_, LogicalUpdate<'_>> {
    fn name(&self) -> &'static str {
        "Update"
    }
}
