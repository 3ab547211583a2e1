//! `shapecheck-delta` - structural edit scripts between two values.
//!
//! [`diff`] compares two values without any schema and produces an ordered
//! list of [`Edit`]s; [`patch`] applies such a list to a copy of a value.
//! Paths are RFC 6901 pointers rooted at `""`.

pub mod diff;
pub mod edit;
pub mod patch;

pub use diff::{diff, DiffError};
pub use edit::Edit;
pub use patch::{patch, patch_in_place, PatchError};
pub use shapecheck_value::equal;
