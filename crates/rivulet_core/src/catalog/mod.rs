pub mod create;
pub mod database;
