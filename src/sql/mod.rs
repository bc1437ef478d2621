//! SQL DDL generation for detected entities.

mod checks;
mod ddl;
mod order;
mod sample;

pub use ddl::SqlGenerator;
pub use order::creation_order;
