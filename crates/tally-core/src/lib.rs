//! Core data model and schema checks shared by every Tally crate.

pub mod schema;
pub mod types;

pub use schema::{
    check_state_document, check_todo_item, parse_todo_item, partition_todos,
    validate_state_document, validate_todo_item, SchemaError,
};
pub use types::*;
