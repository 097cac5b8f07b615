//! Record layout and the in-memory table heap.

pub mod record;
pub mod table;
pub mod table_meta;
