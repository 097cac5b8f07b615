use rivulet_error::{DbError, ErrorKind, Result};
use tracing::{debug, error, warn};

use super::query_result::QueryResult;
use crate::ast::SqlNode;
use crate::catalog::database::Database;
use crate::config::session::SessionConfig;
use crate::execution::driver::run_operator;
use crate::execution::operators::PhysicalOperator;
use crate::execution::planner::PhysicalPlanner;
use crate::explain::node::ExplainedPlan;
use crate::logical::planner::LogicalPlanner;
use crate::statement::Statement;
use crate::value::Value;

/// Executes statements against a database, one transaction per statement.
#[derive(Debug)]
pub struct Session<'a> {
    db: &'a Database,
    config: SessionConfig,
}

impl<'a> Session<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self::with_config(db, SessionConfig::default())
    }

    pub fn with_config(db: &'a Database, config: SessionConfig) -> Self {
        Session { db, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_variable(&mut self, name: &str, value: &Value) -> Result<()> {
        self.config.set_from_value(name, value)
    }

    pub fn get_variable(&self, name: &str) -> Result<Value> {
        self.config.get_as_value(name)
    }

    /// Validate, plan, and run a statement.
    ///
    /// The transaction is committed if execution succeeds and rolled back
    /// otherwise.
    pub fn execute(&self, node: &SqlNode) -> Result<QueryResult> {
        let mut plan = self.plan(node)?;

        let mut trx = self.db.begin(self.config.transaction_mode);
        let result = run_operator(&mut plan, trx.as_mut()).and_then(|records| {
            let rows = match plan.output_meta() {
                Some(meta) => records
                    .iter()
                    .map(|r| meta.decode_values(r))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            let fields = plan
                .output_meta()
                .map(|meta| meta.field_names().map(String::from).collect())
                .unwrap_or_default();

            Ok(QueryResult {
                fields,
                rows,
                rows_affected: plan.rows_affected(),
            })
        });

        match result {
            Ok(result) => {
                trx.commit()?;
                debug!(
                    trx = %trx.id(),
                    rows = result.num_rows(),
                    rows_affected = ?result.rows_affected,
                    "statement executed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(trx = %trx.id(), %e, "statement failed, rolling back");
                if let Err(rollback_err) = trx.rollback() {
                    error!(trx = %trx.id(), %rollback_err, "failed to roll back transaction");
                }
                Err(e)
            }
        }
    }

    /// Plan a statement without running it.
    pub fn explain(&self, node: &SqlNode) -> Result<ExplainedPlan> {
        let stmt = Statement::create(self.db, node)?;
        let logical = LogicalPlanner.plan(&stmt)?;
        let physical = PhysicalPlanner.plan(logical.clone())?;

        Ok(ExplainedPlan::new(
            self.config.verbose_explain,
            &logical,
            &physical,
        ))
    }

    fn plan(&self, node: &SqlNode) -> Result<PhysicalOperator<'a>> {
        if let SqlNode::Insert(insert) = node {
            let max = self.config.max_insert_rows;
            if insert.values.len() as u64 > max {
                warn!(rows = insert.values.len(), max, "insert exceeds max rows");
                return Err(DbError::with_kind(ErrorKind::InvalidArgument, "Too many rows in insert")
                    .with_field("rows", insert.values.len())
                    .with_field("max_insert_rows", max));
            }
        }

        let stmt = Statement::create(self.db, node)?;
        let logical = LogicalPlanner.plan(&stmt)?;
        PhysicalPlanner.plan(logical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConditionNode, DeleteNode, InsertNode, RelAttr, SelectNode, UpdateNode};
    use crate::testutil::{people_database, scan_people};
    use crate::value::ComparisonOperator;

    fn insert(rows: Vec<Vec<Value>>) -> SqlNode {
        SqlNode::Insert(InsertNode {
            relation_name: "people".to_string(),
            values: rows,
        })
    }

    fn select(attributes: Vec<RelAttr>, conditions: Vec<ConditionNode>) -> SqlNode {
        SqlNode::Select(SelectNode {
            relations: vec!["people".to_string()],
            attributes,
            conditions,
        })
    }

    fn person(id: i64, name: &str, age: i64) -> Vec<Value> {
        vec![id.into(), name.into(), age.into(), Value::Null]
    }

    #[test]
    fn insert_then_select() {
        logutil::init_test();

        let db = people_database(&[]);
        let session = Session::new(&db);

        let result = session
            .execute(&insert(vec![person(1, "ann", 30), person(2, "bob", 41)]))
            .unwrap();
        assert_eq!(Some(2), result.rows_affected);
        assert!(result.fields.is_empty());

        let result = session
            .execute(&select(
                vec![RelAttr::new("name"), RelAttr::new("age")],
                vec![ConditionNode::attr_value("age", ComparisonOperator::Gt, 35)],
            ))
            .unwrap();
        assert_eq!(vec!["name", "age"], result.fields);
        assert_eq!(vec![vec![Value::from("bob"), Value::from(41)]], result.rows);
        assert_eq!(None, result.rows_affected);
    }

    #[test]
    fn update_and_delete_filtered_rows() {
        let db = people_database(&[
            (1, "a", 29, None),
            (2, "b", 30, None),
            (3, "c", 30, None),
            (4, "d", 31, None),
        ]);
        let session = Session::new(&db);

        let result = session
            .execute(&SqlNode::Update(UpdateNode {
                relation_name: "people".to_string(),
                attribute_name: "score".to_string(),
                value: Some(Value::from(9.5)),
                conditions: vec![ConditionNode::attr_value("age", ComparisonOperator::Eq, 30)],
            }))
            .unwrap();
        assert_eq!(Some(2), result.rows_affected);

        let result = session
            .execute(&SqlNode::Delete(DeleteNode {
                relation_name: "people".to_string(),
                conditions: vec![ConditionNode::attr_value("age", ComparisonOperator::Lt, 30)],
            }))
            .unwrap();
        assert_eq!(Some(1), result.rows_affected);

        assert_eq!(
            vec![
                vec![2.into(), "b".into(), 30.into(), 9.5.into()],
                vec![3.into(), "c".into(), 30.into(), 9.5.into()],
                vec![4.into(), "d".into(), 31.into(), Value::Null],
            ],
            scan_people(&db)
        );
    }

    #[test]
    fn failed_statement_leaves_table_unchanged() {
        let db = people_database(&[(1, "a", 29, None)]);
        let session = Session::new(&db);
        let before = scan_people(&db);

        // Name is longer than the declared text length.
        let err = session
            .execute(&insert(vec![person(2, "b", 1), person(3, "much too long", 2)]))
            .unwrap_err();
        assert_eq!(ErrorKind::StorageError, err.kind());
        assert_eq!(before, scan_people(&db));
    }

    #[test]
    fn select_same_field_twice() {
        let db = people_database(&[(1, "a", 29, None), (2, "b", 30, None)]);
        let session = Session::new(&db);

        let result = session
            .execute(&select(vec![RelAttr::new("id"), RelAttr::new("id")], Vec::new()))
            .unwrap();
        assert_eq!(vec!["id", "id"], result.fields);
        assert_eq!(
            vec![
                vec![Value::from(1), Value::from(1)],
                vec![Value::from(2), Value::from(2)],
            ],
            result.rows
        );
    }

    #[test]
    fn validation_errors_returned() {
        let db = people_database(&[]);
        let session = Session::new(&db);

        let err = session
            .execute(&select(vec![RelAttr::new("height")], Vec::new()))
            .unwrap_err();
        assert_eq!(ErrorKind::FieldNotFound, err.kind());
    }

    #[test]
    fn max_insert_rows_enforced() {
        let db = people_database(&[]);
        let mut session = Session::new(&db);
        session
            .set_variable("max_insert_rows", &Value::from(1))
            .unwrap();

        let err = session
            .execute(&insert(vec![person(1, "a", 1), person(2, "b", 2)]))
            .unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
        assert!(scan_people(&db).is_empty());
    }

    #[test]
    fn vacuous_mode() {
        let db = people_database(&[]);
        let mut session = Session::new(&db);
        session
            .set_variable("transaction_mode", &Value::from("vacuous"))
            .unwrap();
        assert_eq!(
            Value::from("vacuous"),
            session.get_variable("transaction_mode").unwrap()
        );

        session.execute(&insert(vec![person(1, "a", 1)])).unwrap();
        assert_eq!(1, scan_people(&db).len());
    }

    #[test]
    fn explain_select() {
        let db = people_database(&[]);
        let session = Session::new(&db);

        let plan = session
            .explain(&select(
                vec![RelAttr::wildcard()],
                vec![ConditionNode::attr_value("age", ComparisonOperator::Eq, 30)],
            ))
            .unwrap();

        assert_eq!("Project", plan.logical.entry.name);
        assert_eq!("Filter", plan.logical.children[0].entry.name);
        assert_eq!("Scan", plan.logical.children[0].children[0].entry.name);
        assert_eq!("TableScan", plan.physical.children[0].children[0].entry.name);

        let text = plan.to_string();
        assert!(text.contains("Filter (predicates = [age = 30])"), "{text}");

        let json = plan.to_json().unwrap();
        let parsed: ExplainedPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, parsed);
    }

    #[test]
    fn explain_verbose() {
        let db = people_database(&[]);
        let mut session = Session::new(&db);
        session
            .set_variable("verbose_explain", &Value::from("true"))
            .unwrap();

        let plan = session
            .explain(&select(vec![RelAttr::new("id")], Vec::new()))
            .unwrap();
        assert!(plan.physical.entry.items.contains_key("record_size"));
    }
}
