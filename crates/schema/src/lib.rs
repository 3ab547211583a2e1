//! `shapecheck-schema` - schema model and the value operations built on it.
//!
//! A [`Schema`] is an acyclic tree; recursion is expressed with `Ref` and
//! `This` nodes resolved against a reference list (see [`References`]).
//! Every operation takes the schema, a slice of caller-supplied named
//! schemas and the value it works on.

pub mod cast;
pub mod check;
pub mod clean;
pub mod compiler;
pub mod convert;
pub mod create;
pub mod default;
pub mod format;
pub mod references;
pub mod schema;
pub mod transform;

// Re-export the operations and their error types at crate root
pub use cast::{cast, CastError};
pub use check::{check, errors, ValueError, ValueErrorKind, ValueErrorRecord, ValueErrors};
pub use clean::clean;
pub use compiler::{CompileError, CompileMode, CompileOptions, TypeCheck, TypeCompiler};
pub use convert::convert;
pub use create::{create, CreateError};
pub use default::default;
pub use format::FormatRegistry;
pub use references::{dereference, validate_references, DereferenceError, References};
pub use schema::*;
pub use transform::{decode, encode, Direction, TransformError};
