//! Physical operators.
//!
//! Every operator follows the same protocol: `open` once, pull with `next`
//! until `RecordEnd`, then `close`. Mutations go through the transaction
//! given to `open`.

pub mod delete;
pub mod filter;
pub mod insert;
pub mod project;
pub mod table_scan;
pub mod update;

use std::fmt;

use delete::PhysicalDelete;
use filter::PhysicalFilter;
use insert::PhysicalInsert;
use project::PhysicalProject;
use rivulet_error::{DbError, Result};
use table_scan::PhysicalTableScan;
use update::PhysicalUpdate;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::storage::record::Record;
use crate::storage::table_meta::TableMeta;
use crate::transaction::Transaction;

/// Result of pulling from an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollNext {
    /// Operator produced a record.
    Ready(Record),
    /// The operator has no more records. Further pulls return this again.
    RecordEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    /// Not opened yet, or the last open failed.
    Unopened,
    /// Opened and may produce more records.
    Opened,
    /// Opened and done producing records.
    Exhausted,
    Closed,
}

impl OperatorState {
    /// Error unless the operator can be opened.
    pub(crate) fn check_open(self, operator: &'static str) -> Result<()> {
        match self {
            Self::Unopened => Ok(()),
            other => Err(DbError::new("Operator cannot be opened")
                .with_field("operator", operator)
                .with_field("state", other)),
        }
    }

    /// Error unless the operator can be pulled from.
    pub(crate) fn check_next(self, operator: &'static str) -> Result<()> {
        match self {
            Self::Opened | Self::Exhausted => Ok(()),
            other => Err(DbError::new("Operator pulled before open or after close")
                .with_field("operator", operator)
                .with_field("state", other)),
        }
    }
}

impl fmt::Display for OperatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unopened => write!(f, "unopened"),
            Self::Opened => write!(f, "opened"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Root of all nodes in a physical plan.
///
/// Each operator owns its children and all of its runtime state.
#[derive(Debug)]
pub enum PhysicalOperator<'a> {
    Insert(PhysicalInsert<'a>),
    Update(PhysicalUpdate<'a>),
    Delete(PhysicalDelete<'a>),
    TableScan(PhysicalTableScan<'a>),
    Filter(PhysicalFilter<'a>),
    Project(PhysicalProject<'a>),
}

impl<'a> PhysicalOperator<'a> {
    pub fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        match self {
            Self::Insert(op) => op.open(trx),
            Self::Update(op) => op.open(trx),
            Self::Delete(op) => op.open(trx),
            Self::TableScan(op) => op.open(trx),
            Self::Filter(op) => op.open(trx),
            Self::Project(op) => op.open(trx),
        }
    }

    pub fn next(&mut self) -> Result<PollNext> {
        match self {
            Self::Insert(op) => op.next(),
            Self::Update(op) => op.next(),
            Self::Delete(op) => op.next(),
            Self::TableScan(op) => op.next(),
            Self::Filter(op) => op.next(),
            Self::Project(op) => op.next(),
        }
    }

    /// Release all resources held by this operator and its children.
    ///
    /// Valid from any state, including before open. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self {
            Self::Insert(op) => op.close(),
            Self::Update(op) => op.close(),
            Self::Delete(op) => op.close(),
            Self::TableScan(op) => op.close(),
            Self::Filter(op) => op.close(),
            Self::Project(op) => op.close(),
        }
    }

    pub fn state(&self) -> OperatorState {
        match self {
            Self::Insert(op) => op.state,
            Self::Update(op) => op.state,
            Self::Delete(op) => op.state,
            Self::TableScan(op) => op.state,
            Self::Filter(op) => op.state,
            Self::Project(op) => op.state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
            Self::TableScan(_) => "TableScan",
            Self::Filter(_) => "Filter",
            Self::Project(_) => "Project",
        }
    }

    pub fn children(&self) -> Vec<&PhysicalOperator<'a>> {
        match self {
            Self::Filter(op) => vec![op.child.as_ref()],
            Self::Project(op) => vec![op.child.as_ref()],
            Self::Insert(_) | Self::Update(_) | Self::Delete(_) | Self::TableScan(_) => Vec::new(),
        }
    }

    /// Layout of records produced by this operator.
    ///
    /// Mutations produce no records and have no layout.
    pub fn output_meta(&self) -> Option<&TableMeta> {
        match self {
            Self::TableScan(op) => Some(op.table.meta()),
            Self::Filter(op) => op.child.output_meta(),
            Self::Project(op) => Some(&op.output),
            Self::Insert(_) | Self::Update(_) | Self::Delete(_) => None,
        }
    }

    /// Number of records written by a mutation after a successful open.
    pub fn rows_affected(&self) -> Option<usize> {
        match self {
            Self::Insert(op) => op.rows_affected,
            Self::Update(op) => op.rows_affected,
            Self::Delete(op) => op.rows_affected,
            Self::TableScan(_) | Self::Filter(_) | Self::Project(_) => None,
        }
    }
}

impl Explainable for PhysicalOperator<'_> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::Insert(op) => op.explain_entry(conf),
            Self::Update(op) => op.explain_entry(conf),
            Self::Delete(op) => op.explain_entry(conf),
            Self::TableScan(op) => op.explain_entry(conf),
            Self::Filter(op) => op.explain_entry(conf),
            Self::Project(op) => op.explain_entry(conf),
        }
    }
}
