pub mod query_result;
pub mod session;
