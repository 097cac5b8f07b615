use rivulet_error::Result;
use tracing::{trace, warn};

use super::operators::{PhysicalOperator, PollNext};
use crate::storage::record::Record;
use crate::transaction::Transaction;

/// Open an operator tree, drain it, and close it.
///
/// The tree is closed exactly once whether or not open or pulling failed. An
/// open or pull error takes precedence over a close error.
pub fn run_operator(root: &mut PhysicalOperator, trx: &mut dyn Transaction) -> Result<Vec<Record>> {
    let result = drain(root, trx);
    let closed = root.close();

    match (result, closed) {
        (Ok(records), Ok(())) => {
            trace!(operator = root.name(), records = records.len(), "operator drained");
            Ok(records)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(operator = root.name(), %close_err, "failed to close operator after error");
            Err(e)
        }
    }
}

fn drain(root: &mut PhysicalOperator, trx: &mut dyn Transaction) -> Result<Vec<Record>> {
    root.open(trx)?;

    let mut records = Vec::new();
    loop {
        match root.next()? {
            PollNext::Ready(record) => records.push(record),
            PollNext::RecordEnd => return Ok(records),
        }
    }
}
