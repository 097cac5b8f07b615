use rivulet_error::{DbError, OptionExt, Result};
use tracing::debug;

use super::operators::PhysicalOperator;
use super::operators::delete::PhysicalDelete;
use super::operators::filter::PhysicalFilter;
use super::operators::insert::PhysicalInsert;
use super::operators::project::PhysicalProject;
use super::operators::table_scan::PhysicalTableScan;
use super::operators::update::PhysicalUpdate;
use crate::logical::logical_filter::LogicalFilter;
use crate::logical::logical_project::LogicalProject;
use crate::logical::operator::{LogicalOperator, Node};

/// Lowers a logical plan into physical operators.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalPlanner;

impl PhysicalPlanner {
    pub fn plan<'a>(&self, root: LogicalOperator<'a>) -> Result<PhysicalOperator<'a>> {
        let plan = self.plan_operator(root)?;
        debug!(root = plan.name(), "planned physical operator");
        Ok(plan)
    }

    fn plan_operator<'a>(&self, op: LogicalOperator<'a>) -> Result<PhysicalOperator<'a>> {
        match op {
            LogicalOperator::Insert(insert) => {
                ensure_leaf(insert.children.len(), "Insert")?;
                let insert = insert.into_inner();
                Ok(PhysicalOperator::Insert(PhysicalInsert::new(
                    insert.table,
                    insert.values,
                )))
            }
            LogicalOperator::Update(update) => {
                ensure_leaf(update.children.len(), "Update")?;
                let update = update.into_inner();
                Ok(PhysicalOperator::Update(PhysicalUpdate::new(
                    update.table,
                    update.field,
                    update.value,
                    update.filter,
                )))
            }
            LogicalOperator::Delete(delete) => {
                ensure_leaf(delete.children.len(), "Delete")?;
                let delete = delete.into_inner();
                Ok(PhysicalOperator::Delete(PhysicalDelete::new(
                    delete.table,
                    delete.filter,
                )))
            }
            LogicalOperator::Scan(scan) => {
                ensure_leaf(scan.children.len(), "Scan")?;
                Ok(PhysicalOperator::TableScan(PhysicalTableScan::new(
                    scan.node.table,
                )))
            }
            LogicalOperator::Filter(filter) => self.plan_filter(filter),
            LogicalOperator::Project(project) => self.plan_project(project),
        }
    }

    fn plan_filter<'a>(&self, mut filter: Node<'a, LogicalFilter>) -> Result<PhysicalOperator<'a>> {
        let input = filter.take_one_child_exact()?;
        let child = self.plan_operator(input)?;
        Ok(PhysicalOperator::Filter(PhysicalFilter::new(
            filter.into_inner().filter,
            child,
        )))
    }

    fn plan_project<'a>(
        &self,
        mut project: Node<'a, LogicalProject>,
    ) -> Result<PhysicalOperator<'a>> {
        let input = project.take_one_child_exact()?;
        let child = self.plan_operator(input)?;

        let input_meta = child.output_meta().required("layout for project input")?;
        let output = input_meta.project(input_meta.name(), &project.node.ordinals())?;

        Ok(PhysicalOperator::Project(PhysicalProject::new(
            project.into_inner().fields,
            output,
            child,
        )))
    }
}

fn ensure_leaf(num_children: usize, operator: &'static str) -> Result<()> {
    if num_children != 0 {
        return Err(DbError::new("Operator expects no children")
            .with_field("operator", operator)
            .with_field("children", num_children));
    }
    Ok(())
}
