//! Validated statements.
//!
//! A statement borrows the tables it references from the database and owns
//! everything else, including its filter.

pub mod delete;
pub mod filter;
pub mod insert;
pub mod select;
pub mod update;

use delete::DeleteStmt;
use insert::InsertStmt;
use rivulet_error::Result;
use select::SelectStmt;
use update::UpdateStmt;

use crate::ast::SqlNode;
use crate::catalog::database::Database;

#[derive(Debug, Clone)]
pub enum Statement<'a> {
    Insert(InsertStmt<'a>),
    Update(UpdateStmt<'a>),
    Delete(DeleteStmt<'a>),
    Select(SelectStmt<'a>),
}

impl<'a> Statement<'a> {
    /// Validate a parsed node against the database.
    pub fn create(db: &'a Database, node: &SqlNode) -> Result<Self> {
        Ok(match node {
            SqlNode::Insert(insert) => Statement::Insert(InsertStmt::create(db, insert)?),
            SqlNode::Update(update) => Statement::Update(UpdateStmt::create(db, update)?),
            SqlNode::Delete(delete) => Statement::Delete(DeleteStmt::create(db, delete)?),
            SqlNode::Select(select) => Statement::Select(SelectStmt::create(db, select)?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
            Self::Select(_) => "Select",
        }
    }
}

#[cfg(test)]
mod tests {
    use rivulet_error::ErrorKind;

    use super::*;
    use crate::ast::{ConditionNode, DeleteNode, InsertNode, RelAttr, SelectNode, UpdateNode};
    use crate::testutil::people_database;
    use crate::value::{ComparisonOperator, Value};

    fn update_node(table: &str, column: &str, value: Option<Value>) -> SqlNode {
        SqlNode::Update(UpdateNode {
            relation_name: table.to_string(),
            attribute_name: column.to_string(),
            value,
            conditions: vec![ConditionNode::attr_value("id", ComparisonOperator::Eq, 1)],
        })
    }

    fn insert_node(table: &str, values: Vec<Vec<Value>>) -> SqlNode {
        SqlNode::Insert(InsertNode {
            relation_name: table.to_string(),
            values,
        })
    }

    fn select_node(table: &str, attributes: Vec<RelAttr>) -> SqlNode {
        SqlNode::Select(SelectNode {
            relations: vec![table.to_string()],
            attributes,
            conditions: Vec::new(),
        })
    }

    fn person(id: i64, name: &str, age: i64) -> Vec<Value> {
        vec![id.into(), name.into(), age.into(), Value::Null]
    }

    fn create_err(db: &Database, node: &SqlNode) -> ErrorKind {
        Statement::create(db, node).unwrap_err().kind()
    }

    #[test]
    fn missing_table_for_every_kind() {
        let db = people_database(&[]);
        let nodes = [
            insert_node("pets", vec![person(1, "a", 2)]),
            update_node("pets", "age", Some(Value::from(1))),
            SqlNode::Delete(DeleteNode {
                relation_name: "pets".to_string(),
                conditions: Vec::new(),
            }),
            select_node("pets", vec![RelAttr::wildcard()]),
        ];

        for node in &nodes {
            assert_eq!(ErrorKind::TableNotFound, create_err(&db, node), "{node:?}");
        }
    }

    #[test]
    fn update_invalid_arguments() {
        let db = people_database(&[]);
        for node in [
            update_node("", "age", Some(Value::from(1))),
            update_node("people", "", Some(Value::from(1))),
            update_node("people", "age", None),
        ] {
            assert_eq!(ErrorKind::InvalidArgument, create_err(&db, &node));
        }
    }

    #[test]
    fn update_missing_field() {
        let db = people_database(&[]);
        let node = update_node("people", "height", Some(Value::from(1)));
        assert_eq!(ErrorKind::FieldNotFound, create_err(&db, &node));
    }

    #[test]
    fn update_type_mismatch() {
        let db = people_database(&[]);
        for (column, value) in [
            ("age", Value::from("old")),
            ("name", Value::from(3)),
            ("score", Value::from(3)),
            ("age", Value::Null),
        ] {
            let node = update_node("people", column, Some(value));
            assert_eq!(ErrorKind::FieldTypeMismatch, create_err(&db, &node));
        }
    }

    #[test]
    fn update_null_for_nullable_field() {
        let db = people_database(&[]);
        let node = update_node("people", "score", Some(Value::Null));

        let Statement::Update(stmt) = Statement::create(&db, &node).unwrap() else {
            panic!("expected update");
        };
        assert_eq!("score", stmt.field().name);
        assert_eq!(&Value::Null, stmt.value());
        assert_eq!(1, stmt.filter().comparisons().len());
    }

    #[test]
    fn update_bad_condition() {
        let db = people_database(&[]);
        let node = SqlNode::Update(UpdateNode {
            relation_name: "people".to_string(),
            attribute_name: "age".to_string(),
            value: Some(Value::from(3)),
            conditions: vec![ConditionNode::attr_value("height", ComparisonOperator::Eq, 1)],
        });

        let err = Statement::create(&db, &node).unwrap_err();
        assert_eq!(ErrorKind::ConditionError, err.kind());
        assert_eq!(ErrorKind::FieldNotFound, err.root_kind());
    }

    #[test]
    fn insert_validation() {
        let db = people_database(&[]);

        assert_eq!(
            ErrorKind::InvalidArgument,
            create_err(&db, &insert_node("people", Vec::new()))
        );
        assert_eq!(
            ErrorKind::InvalidArgument,
            create_err(&db, &insert_node("people", vec![vec![Value::from(1)]]))
        );
        assert_eq!(
            ErrorKind::FieldTypeMismatch,
            create_err(
                &db,
                &insert_node("people", vec![vec![1.into(), 2.into(), 3.into(), Value::Null]])
            )
        );

        let stmt = Statement::create(&db, &insert_node("people", vec![person(1, "a", 2)])).unwrap();
        assert_eq!("Insert", stmt.name());
    }

    #[test]
    fn select_projection() {
        let db = people_database(&[]);

        let Statement::Select(stmt) =
            Statement::create(&db, &select_node("people", vec![RelAttr::wildcard()])).unwrap()
        else {
            panic!("expected select");
        };
        assert_eq!(4, stmt.fields().len());

        let Statement::Select(stmt) = Statement::create(
            &db,
            &select_node(
                "people",
                vec![RelAttr::new("name"), RelAttr::qualified("people", "id")],
            ),
        )
        .unwrap() else {
            panic!("expected select");
        };
        let names: Vec<_> = stmt.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(vec!["name", "id"], names);
    }

    #[test]
    fn select_errors() {
        let db = people_database(&[]);
        assert_eq!(
            ErrorKind::FieldNotFound,
            create_err(&db, &select_node("people", vec![RelAttr::new("height")]))
        );
        assert_eq!(
            ErrorKind::TableNotFound,
            create_err(
                &db,
                &select_node("people", vec![RelAttr::qualified("pets", "id")])
            )
        );

        let join = SqlNode::Select(SelectNode {
            relations: vec!["people".to_string(), "people".to_string()],
            attributes: vec![RelAttr::wildcard()],
            conditions: Vec::new(),
        });
        assert_eq!(ErrorKind::InvalidArgument, create_err(&db, &join));
    }
}
