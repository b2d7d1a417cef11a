pub mod common;
pub mod order;
pub mod referencing;
pub mod scan;
