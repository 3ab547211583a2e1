//! shapecheck-value - the runtime value model consumed by the shapecheck engine.
//!
//! Values are a superset of JSON: besides null, booleans, numbers, strings,
//! arrays and objects they can hold `undefined`, big integers, symbols, dates,
//! typed buffers, functions and settled promises. Arrays and objects are
//! reference counted so that a value graph can share substructure; identity of
//! those allocations is observable through [`Value::identity`].

pub mod clone;
pub mod date;
pub mod equal;
pub mod hash;
pub mod pointer;
mod serde_impl;
pub mod typed_array;
pub mod value;

pub use clone::clone_deep;
pub use date::Date;
pub use equal::equal;
pub use hash::hash;
pub use pointer::PointerError;
pub use typed_array::{TypedArray, TypedArrayKind};
pub use value::{Function, FunctionKind, KeyRef, ObjectMap, PropertyKey, Symbol, Value};
