use rivulet_error::{DbError, OptionExt, Result};

use super::logical_delete::LogicalDelete;
use super::logical_filter::LogicalFilter;
use super::logical_insert::LogicalInsert;
use super::logical_project::LogicalProject;
use super::logical_scan::LogicalScan;
use super::logical_update::LogicalUpdate;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// Common operations across all logical nodes in a plan.
///
/// For individual operators, this should be implemented on `Node<T>` and not
/// `T`.
///
/// This is implemented on `LogicalOperator` for convenience.
pub trait LogicalNode {
    /// Name of the operator.
    fn name(&self) -> &'static str;
}

/// Wrapper around nodes in the logical plan to hold common fields.
#[derive(Debug, Clone)]
pub struct Node<'a, N> {
    /// Node specific logic.
    pub node: N,
    /// Inputs to this node.
    pub children: Vec<LogicalOperator<'a>>,
}

impl<'a, N> Node<'a, N> {
    pub fn new(node: N) -> Self {
        Node {
            node,
            children: Vec::new(),
        }
    }

    pub fn with_child(node: N, child: LogicalOperator<'a>) -> Self {
        Node {
            node,
            children: vec![child],
        }
    }

    pub fn into_inner(self) -> N {
        self.node
    }

    pub fn take_one_child_exact(&mut self) -> Result<LogicalOperator<'a>> {
        if self.children.len() != 1 {
            return Err(DbError::new(format!(
                "Expected 1 child to operator, have {}",
                self.children.len()
            )));
        }
        self.children.pop().required("single child")
    }

    pub fn get_one_child_exact(&self) -> Result<&LogicalOperator<'a>> {
        if self.children.len() != 1 {
            return Err(DbError::new(format!(
                "Expected 1 child to operator, have {}",
                self.children.len()
            )));
        }
        Ok(&self.children[0])
    }
}

impl<N: Explainable> Explainable for Node<'_, N> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        self.node.explain_entry(conf)
    }
}

/// Root of all nodes in a logical query plan.
///
/// Mutations are childless roots. Reads are built from a scan leaf.
#[derive(Debug, Clone)]
pub enum LogicalOperator<'a> {
    Insert(Node<'a, LogicalInsert<'a>>),
    Update(Node<'a, LogicalUpdate<'a>>),
    Delete(Node<'a, LogicalDelete<'a>>),
    Scan(Node<'a, LogicalScan<'a>>),
    Filter(Node<'a, LogicalFilter>),
    Project(Node<'a, LogicalProject>),
}

impl<'a> LogicalOperator<'a> {
    pub fn children(&self) -> &[LogicalOperator<'a>] {
        match self {
            Self::Insert(n) => &n.children,
            Self::Update(n) => &n.children,
            Self::Delete(n) => &n.children,
            Self::Scan(n) => &n.children,
            Self::Filter(n) => &n.children,
            Self::Project(n) => &n.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<LogicalOperator<'a>> {
        match self {
            Self::Insert(n) => &mut n.children,
            Self::Update(n) => &mut n.children,
            Self::Delete(n) => &mut n.children,
            Self::Scan(n) => &mut n.children,
            Self::Filter(n) => &mut n.children,
            Self::Project(n) => &mut n.children,
        }
    }
}

impl LogicalNode for LogicalOperator<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Insert(n) => n.name(),
            Self::Update(n) => n.name(),
            Self::Delete(n) => n.name(),
            Self::Scan(n) => n.name(),
            Self::Filter(n) => n.name(),
            Self::Project(n) => n.name(),
        }
    }
}

impl Explainable for LogicalOperator<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::Insert(n) => n.explain_entry(conf),
            Self::Update(n) => n.explain_entry(conf),
            Self::Delete(n) => n.explain_entry(conf),
            Self::Scan(n) => n.explain_entry(conf),
            Self::Filter(n) => n.explain_entry(conf),
            Self::Project(n) => n.explain_entry(conf),
        }
    }
}
