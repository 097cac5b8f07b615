use std::fmt;

use rivulet_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::execution::operators::PhysicalOperator;
use crate::logical::operator::LogicalOperator;

/// Explained logical and physical trees for a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainedPlan {
    pub logical: ExplainNode,
    pub physical: ExplainNode,
}

impl ExplainedPlan {
    pub fn new(verbose: bool, logical: &LogicalOperator, physical: &PhysicalOperator) -> Self {
        let config = ExplainConfig { verbose };
        ExplainedPlan {
            logical: ExplainNode::walk_logical(config, logical),
            physical: ExplainNode::walk_physical(config, physical),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DbError::new("Failed to serialize explained plan").with_source(e))
    }
}

impl fmt::Display for ExplainedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "logical:")?;
        self.logical.fmt_indented(f, 1)?;
        writeln!(f, "physical:")?;
        self.physical.fmt_indented(f, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExplainNode {
    pub entry: ExplainEntry,
    pub children: Vec<ExplainNode>,
}

impl ExplainNode {
    fn walk_logical(config: ExplainConfig, plan: &LogicalOperator) -> Self {
        let children = plan
            .children()
            .iter()
            .map(|c| Self::walk_logical(config, c))
            .collect();

        ExplainNode {
            entry: plan.explain_entry(config),
            children,
        }
    }

    fn walk_physical(config: ExplainConfig, plan: &PhysicalOperator) -> Self {
        let children = plan
            .children()
            .into_iter()
            .map(|c| Self::walk_physical(config, c))
            .collect();

        ExplainNode {
            entry: plan.explain_entry(config),
            children,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{}{}", "  ".repeat(depth), self.entry)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}
