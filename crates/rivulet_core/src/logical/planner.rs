use rivulet_error::Result;
use tracing::debug;

use super::logical_delete::LogicalDelete;
use super::logical_filter::LogicalFilter;
use super::logical_insert::LogicalInsert;
use super::logical_project::LogicalProject;
use super::logical_scan::LogicalScan;
use super::logical_update::LogicalUpdate;
use super::operator::{LogicalNode, LogicalOperator, Node};
use crate::statement::Statement;

/// Plans a validated statement into a logical operator tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalPlanner;

impl LogicalPlanner {
    pub fn plan<'a>(&self, stmt: &Statement<'a>) -> Result<LogicalOperator<'a>> {
        let plan = match stmt {
            Statement::Insert(insert) => LogicalOperator::Insert(Node::new(LogicalInsert {
                table: insert.table(),
                values: insert.values().to_vec(),
            })),
            Statement::Update(update) => LogicalOperator::Update(Node::new(LogicalUpdate {
                table: update.table(),
                field: update.field().clone(),
                value: update.value().clone(),
                filter: update.filter().clone(),
            })),
            Statement::Delete(delete) => LogicalOperator::Delete(Node::new(LogicalDelete {
                table: delete.table(),
                filter: delete.filter().clone(),
            })),
            Statement::Select(select) => {
                let mut plan = LogicalOperator::Scan(Node::new(LogicalScan {
                    table: select.table(),
                }));

                if !select.filter().is_empty() {
                    plan = LogicalOperator::Filter(Node::with_child(
                        LogicalFilter {
                            filter: select.filter().clone(),
                        },
                        plan,
                    ));
                }

                LogicalOperator::Project(Node::with_child(
                    LogicalProject {
                        fields: select.fields().to_vec(),
                    },
                    plan,
                ))
            }
        };

        debug!(statement = stmt.name(), root = plan.name(), "planned logical operator");

        Ok(plan)
    }
}
