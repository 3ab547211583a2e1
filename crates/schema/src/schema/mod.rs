//! Schema node model.

mod build;
#[allow(clippy::module_inception)]
mod schema;
mod validate;

pub use schema::*;
pub use validate::{validate_schema, SchemaError};
