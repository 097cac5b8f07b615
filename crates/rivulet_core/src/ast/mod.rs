//! Parsed statement nodes handed to statement construction.
//!
//! Nothing here is validated. Names may be empty and values may not match the
//! referenced fields. `Statement::create` is responsible for rejecting those.

use crate::value::{ComparisonOperator, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    Insert(InsertNode),
    Update(UpdateNode),
    Delete(DeleteNode),
    Select(SelectNode),
}

/// A possibly qualified attribute reference.
///
/// An attribute name of "*" refers to all fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelAttr {
    pub relation_name: Option<String>,
    pub attribute_name: String,
}

impl RelAttr {
    pub fn new(attribute_name: impl Into<String>) -> Self {
        RelAttr {
            relation_name: None,
            attribute_name: attribute_name.into(),
        }
    }

    pub fn qualified(relation_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        RelAttr {
            relation_name: Some(relation_name.into()),
            attribute_name: attribute_name.into(),
        }
    }

    pub fn wildcard() -> Self {
        Self::new("*")
    }

    pub fn is_wildcard(&self) -> bool {
        self.attribute_name == "*"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionOperand {
    Attribute(RelAttr),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub left: ConditionOperand,
    pub op: ComparisonOperator,
    pub right: ConditionOperand,
}

impl ConditionNode {
    /// `attribute op value`, the most common form.
    pub fn attr_value(
        attribute: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        ConditionNode {
            left: ConditionOperand::Attribute(RelAttr::new(attribute)),
            op,
            right: ConditionOperand::Value(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertNode {
    pub relation_name: String,
    /// One entry per row, values in field order.
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNode {
    pub relation_name: String,
    pub attribute_name: String,
    pub value: Option<Value>,
    pub conditions: Vec<ConditionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteNode {
    pub relation_name: String,
    pub conditions: Vec<ConditionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectNode {
    pub relations: Vec<String>,
    pub attributes: Vec<RelAttr>,
    pub conditions: Vec<ConditionNode>,
}
