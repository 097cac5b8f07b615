pub mod ast;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod execution;
pub mod explain;
pub mod logical;
pub mod statement;
pub mod storage;
pub mod transaction;
pub mod value;

#[cfg(test)]
pub(crate) mod testutil;
