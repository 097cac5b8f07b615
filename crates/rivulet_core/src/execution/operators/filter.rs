use rivulet_error::Result;

use super::{OperatorState, PhysicalOperator, PollNext};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::statement::filter::FilterStmt;
use crate::transaction::Transaction;

#[derive(Debug)]
pub struct PhysicalFilter<'a> {
    filter: FilterStmt,
    pub(super) child: Box<PhysicalOperator<'a>>,
    pub(super) state: OperatorState,
}

impl<'a> PhysicalFilter<'a> {
    pub fn new(filter: FilterStmt, child: PhysicalOperator<'a>) -> Self {
        PhysicalFilter {
            filter,
            child: Box::new(child),
            state: OperatorState::Unopened,
        }
    }

    pub(super) fn open(&mut self, trx: &mut dyn Transaction) -> Result<()> {
        self.state.check_open("Filter")?;
        self.child.open(trx)?;
        self.state = OperatorState::Opened;
        Ok(())
    }

    pub(super) fn next(&mut self) -> Result<PollNext> {
        self.state.check_next("Filter")?;
        if self.state == OperatorState::Exhausted {
            return Ok(PollNext::RecordEnd);
        }

        loop {
            match self.child.next()? {
                PollNext::Ready(record) => {
                    if self.filter.evaluate(&record)? {
                        return Ok(PollNext::Ready(record));
                    }
                }
                PollNext::RecordEnd => {
                    self.state = OperatorState::Exhausted;
                    return Ok(PollNext::RecordEnd);
                }
            }
        }
    }

    pub(super) fn close(&mut self) -> Result<()> {
        self.state = OperatorState::Closed;
        self.child.close()
    }
}

impl Explainable for PhysicalFilter<'_> {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Filter").with_values("predicates", self.filter.comparisons())
    }
}
