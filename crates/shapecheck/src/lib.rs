//! `shapecheck` - describe the shape of data once and reuse it.
//!
//! A [`Schema`] tree checks values ([`check`], [`errors`]), compiles into a
//! reusable validator ([`TypeCompiler`]), repairs near-miss values
//! ([`convert`], [`default`], [`clean`], [`cast`], [`create`]) and runs
//! transform hooks ([`decode`], [`encode`]). [`diff`] and [`patch`] work on
//! plain values without a schema.
//!
//! ```
//! use shapecheck::{cast, check, Property, Schema, Value};
//!
//! let point = Schema::object([
//!     ("x", Property::new(Schema::number())),
//!     ("y", Property::new(Schema::number())),
//! ]);
//! let value = Value::from_entries([("x", Value::from(1)), ("y", Value::from("2"))]);
//! assert_eq!(check(&point, &[], &value), Ok(false));
//!
//! let fixed = cast(&point, &[], &value).unwrap();
//! assert_eq!(fixed, Value::from_entries([("x", Value::from(1)), ("y", Value::from(0))]));
//! ```

pub use shapecheck_delta::{diff, patch, patch_in_place, DiffError, Edit, PatchError};
pub use shapecheck_schema::*;
pub use shapecheck_value as value;
pub use shapecheck_value::{clone_deep, equal, hash, Date, Function, ObjectMap, PropertyKey, Symbol, TypedArray, Value};
