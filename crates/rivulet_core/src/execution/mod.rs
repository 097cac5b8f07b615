pub mod driver;
pub mod operators;
pub mod planner;
