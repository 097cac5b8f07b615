//! Logical plans describe what a statement does, without any execution
//! state.

pub mod logical_delete;
pub mod logical_filter;
pub mod logical_insert;
pub mod logical_project;
pub mod logical_scan;
pub mod logical_update;
pub mod operator;
pub mod planner;
