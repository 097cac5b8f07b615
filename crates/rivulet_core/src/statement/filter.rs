use std::collections::HashMap;
use std::fmt;

use rivulet_error::{DbError, ErrorKind, Result};
use tracing::warn;

use crate::ast::{ConditionNode, ConditionOperand, RelAttr};
use crate::catalog::database::Database;
use crate::storage::record::Record;
use crate::storage::table::Table;
use crate::storage::table_meta::FieldMeta;
use crate::value::{ComparisonOperator, DataType, Value};

/// Tables visible to a statement, keyed by name.
pub type TableMap<'a> = HashMap<String, &'a Table>;

/// A field resolved against a table at statement construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub table_name: String,
    pub field: FieldMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperand {
    Field(FieldRef),
    Value(Value),
}

impl FilterOperand {
    fn datatype(&self) -> DataType {
        match self {
            Self::Field(f) => f.field.datatype,
            Self::Value(v) => v.datatype(),
        }
    }

    fn evaluate(&self, record: &Record) -> Result<Value> {
        match self {
            Self::Field(f) => f.field.decode(record),
            Self::Value(v) => Ok(v.clone()),
        }
    }
}

impl fmt::Display for FilterOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => write!(f, "{}", field.field.name),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: FilterOperand,
    pub op: ComparisonOperator,
    pub right: FilterOperand,
}

impl Comparison {
    /// Evaluate against a record. A null on either side never matches.
    pub fn evaluate(&self, record: &Record) -> Result<bool> {
        let left = self.left.evaluate(record)?;
        let right = self.right.evaluate(record)?;
        Ok(left
            .compare(&right)?
            .is_some_and(|ord| self.op.matches(ord)))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// Conjunction of comparisons. Empty matches every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterStmt {
    comparisons: Vec<Comparison>,
}

impl FilterStmt {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve and type check conditions against the visible tables.
    ///
    /// Unqualified attributes resolve against `default_table`, or against the
    /// only table in `tables` if no default is given. Any failure is returned
    /// as a condition error with the underlying cause as its source.
    pub fn create(
        db: &Database,
        default_table: Option<&Table>,
        tables: &TableMap<'_>,
        conditions: &[ConditionNode],
    ) -> Result<Self> {
        let comparisons = conditions
            .iter()
            .enumerate()
            .map(|(idx, cond)| {
                create_comparison(default_table, tables, cond).map_err(|e| {
                    warn!(
                        db = %db.name(),
                        condition = idx,
                        %e,
                        "failed to create filter condition"
                    );
                    DbError::with_kind(ErrorKind::ConditionError, "Failed to create condition")
                        .with_field("condition", idx)
                        .with_source(e)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FilterStmt { comparisons })
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Check if a record satisfies every comparison.
    ///
    /// A record that can't be decoded is an error, not a non-match.
    pub fn evaluate(&self, record: &Record) -> Result<bool> {
        for comparison in &self.comparisons {
            if !comparison.evaluate(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for FilterStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, comparison) in self.comparisons.iter().enumerate() {
            if idx > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{comparison}")?;
        }
        Ok(())
    }
}

fn create_comparison(
    default_table: Option<&Table>,
    tables: &TableMap<'_>,
    cond: &ConditionNode,
) -> Result<Comparison> {
    let left = resolve_operand(default_table, tables, &cond.left)?;
    let right = resolve_operand(default_table, tables, &cond.right)?;

    let (left_type, right_type) = (left.datatype(), right.datatype());
    let null_literal = left_type == DataType::Null || right_type == DataType::Null;
    if !null_literal && left_type != right_type {
        return Err(DbError::with_kind(
            ErrorKind::FieldTypeMismatch,
            "Comparison operand types differ",
        )
        .with_field("left", left_type)
        .with_field("right", right_type));
    }

    Ok(Comparison {
        left,
        op: cond.op,
        right,
    })
}

fn resolve_operand(
    default_table: Option<&Table>,
    tables: &TableMap<'_>,
    operand: &ConditionOperand,
) -> Result<FilterOperand> {
    match operand {
        ConditionOperand::Value(v) => Ok(FilterOperand::Value(v.clone())),
        ConditionOperand::Attribute(attr) => {
            let table = resolve_table(default_table, tables, attr)?;
            let field = find_field(table, &attr.attribute_name)?;
            Ok(FilterOperand::Field(FieldRef {
                table_name: table.name().to_string(),
                field: field.clone(),
            }))
        }
    }
}

/// Find the table an attribute refers to.
pub(crate) fn resolve_table<'a>(
    default_table: Option<&'a Table>,
    tables: &TableMap<'a>,
    attr: &RelAttr,
) -> Result<&'a Table> {
    match &attr.relation_name {
        Some(name) => tables.get(name).copied().ok_or_else(|| {
            DbError::with_kind(ErrorKind::TableNotFound, "Table not in statement")
                .with_field("table", name)
                .with_field("attribute", &attr.attribute_name)
        }),
        None => match default_table {
            Some(table) => Ok(table),
            None if tables.len() == 1 => tables
                .values()
                .next()
                .copied()
                .ok_or_else(|| DbError::new("Table map unexpectedly empty")),
            None => Err(
                DbError::with_kind(ErrorKind::InvalidArgument, "Ambiguous attribute reference")
                    .with_field("attribute", &attr.attribute_name),
            ),
        },
    }
}

pub(crate) fn find_field<'a>(table: &'a Table, name: &str) -> Result<&'a FieldMeta> {
    if name == "*" {
        return Err(
            DbError::with_kind(ErrorKind::InvalidArgument, "Wildcard not allowed here")
                .with_field("table", table.name()),
        );
    }
    table.meta().field(name).ok_or_else(|| {
        DbError::with_kind(ErrorKind::FieldNotFound, "Field not found")
            .with_field("table", table.name())
            .with_field("field", name)
    })
}
