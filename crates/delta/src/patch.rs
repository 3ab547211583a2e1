//! Applying edit scripts.

use shapecheck_value::{clone_deep, pointer, PointerError, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::edit::Edit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("edit {index} ({kind} at `{path}`) failed: {source}")]
pub struct PatchError {
    pub index: usize,
    pub kind: &'static str,
    pub path: String,
    pub source: PointerError,
}

/// Applies `edits` to a deep copy of `current`.
///
/// A lone root update returns a copy of its value and an empty script
/// returns a copy of `current`.
pub fn patch(current: &Value, edits: &[Edit]) -> Result<Value, PatchError> {
    if let [Edit::Update { path, value }] = edits {
        if path.is_empty() {
            return Ok(clone_deep(value));
        }
    }
    let mut working = clone_deep(current);
    patch_in_place(&mut working, edits)?;
    Ok(working)
}

/// Applies `edits` to `target` in order. Inserts and updates both write the
/// target path; deletes remove it.
///
/// Only a lone root update may replace `target` itself. On error the edits
/// before the failing one have already been applied.
pub fn patch_in_place(target: &mut Value, edits: &[Edit]) -> Result<(), PatchError> {
    if let [Edit::Update { path, value }] = edits {
        if path.is_empty() {
            *target = clone_deep(value);
            return Ok(());
        }
    }
    debug!(edits = edits.len(), "applying patch");
    for (index, edit) in edits.iter().enumerate() {
        trace!(index, kind = edit.kind(), path = edit.path(), "applying edit");
        let applied = match edit {
            Edit::Insert { path, value } | Edit::Update { path, value } => {
                pointer::set(target, path, clone_deep(value))
            }
            Edit::Delete { path } => pointer::delete(target, path),
        };
        applied.map_err(|source| PatchError {
            index,
            kind: edit.kind(),
            path: edit.path().to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use serde_json::json;
    use shapecheck_value::TypedArray;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn empty_script_copies() {
        let current = v(json!({"a": [1, 2]}));
        let out = patch(&current, &[]).unwrap();
        assert_eq!(out, current);
        assert_ne!(out.identity(), current.identity());
    }

    #[test]
    fn root_update_replaces() {
        let out = patch(&v(json!({"a": 1})), &[Edit::update("", v(json!([1])))]).unwrap();
        assert_eq!(out, v(json!([1])));
    }

    #[test]
    fn applies_in_order() {
        let edits = vec![
            Edit::insert("/b", 2),
            Edit::update("/a/0", "x"),
            Edit::delete("/c"),
            Edit::delete("/a/2"),
        ];
        let out = patch(&v(json!({"a": [1, 2, 3], "c": true})), &edits).unwrap();
        assert_eq!(out, v(json!({"a": ["x", 2], "b": 2})));
    }

    #[test]
    fn current_is_untouched() {
        let current = v(json!({"a": {"b": 1}}));
        let _ = patch(&current, &[Edit::update("/a/b", 2)]).unwrap();
        assert_eq!(current, v(json!({"a": {"b": 1}})));
    }

    #[test]
    fn root_edit_in_a_longer_script_fails() {
        let err = patch(&v(json!({})), &[Edit::insert("/a", 1), Edit::delete("")]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.source, PointerError::RootDelete);
        assert_eq!(err.to_string(), "edit 1 (delete at ``) failed: cannot delete the root value through a pointer");
    }

    #[test]
    fn writing_into_a_scalar_fails() {
        let err = patch(&v(json!({"a": 1})), &[Edit::insert("/a/b", 1), Edit::insert("/c", 1)]).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(matches!(err.source, PointerError::InvalidTarget(_)));
    }

    #[test]
    fn round_trip_through_diff() {
        let pairs = [
            (json!({"x": 1, "y": [1, 2, 3]}), json!({"y": [1], "z": {"k": null}})),
            (json!([1, [2, 3], {"a": 1}]), json!([[2], {"a": 2, "b": 3}])),
            (json!("a"), json!({"a": "b"})),
            (json!({"a/b": {"~": 1}}), json!({"a/b": {"~": 2, "c": []}})),
        ];
        for (current, next) in pairs {
            let (current, next) = (v(current), v(next));
            let edits = diff(&current, &next).unwrap();
            assert_eq!(patch(&current, &edits).unwrap(), next);
            assert!(diff(&next, &next).unwrap().is_empty());
        }
    }

    #[test]
    fn typed_array_elements() {
        let current = Value::TypedArray(TypedArray::Int16(vec![1, 2, 3]));
        let next = Value::TypedArray(TypedArray::Int16(vec![1, -2, 3]));
        let edits = diff(&current, &next).unwrap();
        assert_eq!(patch(&current, &edits).unwrap(), next);
    }
}
