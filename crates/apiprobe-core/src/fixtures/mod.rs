//! Negative test fixtures derived from a field-constraint schema

mod mutator;
mod schema;


pub use mutator::{generate, Fixture, Payload};
pub use schema::{FieldConstraint, FieldType, Schema, Violation};
