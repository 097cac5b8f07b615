use super::operator::{LogicalNode, Node};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::table_meta::FieldMeta;

/// Project fields from the child's records.
///
/// Field metadata describes the child's layout. Output order follows the
/// order of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalProject {
    pub fields: Vec<FieldMeta>,
}

impl LogicalProject {
    /// Positions of the projected fields in the child's layout.
    pub fn ordinals(&self) -> Vec<usize> {
        self.fields.iter().map(|f| f.ordinal).collect()
    }
}

impl Explainable for LogicalProject {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Project")
            .with_values("fields", self.fields.iter().map(|f| &f.name))
            .with_value_if_verbose(conf, "ordinals", format!("{:?}", self.ordinals()))
    }
}

impl LogicalNode for Node<'_, LogicalProject> {
    fn name(&self) -> &'static str {
        "Project"
    }
}
