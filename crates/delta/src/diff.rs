//! Schema-agnostic structural diff.

use shapecheck_value::pointer::join;
use shapecheck_value::{equal, KeyRef, ObjectMap, PropertyKey, TypedArray, Value};
use thiserror::Error;

use crate::edit::Edit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("object at `{path}` has a symbol key, which a pointer cannot address")]
    SymbolKey { path: String },
}

/// Computes the edits that turn `current` into `next`.
///
/// Objects yield all inserts (in `next` key order), then updates, then
/// deletes. Arrays are compared index by index; surplus elements of `next`
/// are inserted in ascending order and surplus elements of `current` are
/// deleted in descending order, so no delete shifts a later one. Everything
/// else is a single update when the two sides differ.
pub fn diff(current: &Value, next: &Value) -> Result<Vec<Edit>, DiffError> {
    let mut edits = Vec::new();
    visit(&mut edits, "", current, next)?;
    Ok(edits)
}

fn visit(edits: &mut Vec<Edit>, path: &str, current: &Value, next: &Value) -> Result<(), DiffError> {
    match (current, next) {
        (Value::Object(c), Value::Object(n)) => object(edits, path, c, n),
        (Value::Array(c), Value::Array(n)) => array(edits, path, c, n),
        (Value::TypedArray(c), Value::TypedArray(n)) if c.kind() == n.kind() && c.len() == n.len() => {
            typed_array(edits, path, c, n);
            Ok(())
        }
        _ => {
            if !equal(current, next) {
                edits.push(Edit::update(path, next.clone()));
            }
            Ok(())
        }
    }
}

fn string_key<'a>(key: &'a PropertyKey, path: &str) -> Result<&'a str, DiffError> {
    key.as_str().ok_or_else(|| DiffError::SymbolKey {
        path: path.to_string(),
    })
}

fn object(edits: &mut Vec<Edit>, path: &str, current: &ObjectMap, next: &ObjectMap) -> Result<(), DiffError> {
    for key in current.keys().chain(next.keys()) {
        string_key(key, path)?;
    }
    for (key, value) in next {
        let key = string_key(key, path)?;
        if !current.contains_key(&KeyRef(key)) {
            edits.push(Edit::insert(join(path, key), value.clone()));
        }
    }
    for (key, value) in current {
        let key = string_key(key, path)?;
        if let Some(other) = next.get(&KeyRef(key)) {
            if !equal(value, other) {
                visit(edits, &join(path, key), value, other)?;
            }
        }
    }
    for key in current.keys() {
        let key = string_key(key, path)?;
        if !next.contains_key(&KeyRef(key)) {
            edits.push(Edit::delete(join(path, key)));
        }
    }
    Ok(())
}

fn array(edits: &mut Vec<Edit>, path: &str, current: &[Value], next: &[Value]) -> Result<(), DiffError> {
    let shared = current.len().min(next.len());
    for i in 0..shared {
        visit(edits, &join(path, &i.to_string()), &current[i], &next[i])?;
    }
    for (i, value) in next.iter().enumerate().skip(shared) {
        edits.push(Edit::insert(join(path, &i.to_string()), value.clone()));
    }
    for i in (shared..current.len()).rev() {
        edits.push(Edit::delete(join(path, &i.to_string())));
    }
    Ok(())
}

fn typed_array(edits: &mut Vec<Edit>, path: &str, current: &TypedArray, next: &TypedArray) {
    for (i, (a, b)) in current.elements().iter().zip(next.elements()).enumerate() {
        if !equal(a, &b) {
            edits.push(Edit::update(join(path, &i.to_string()), b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shapecheck_value::{Date, Symbol};

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn identical_values_have_no_edits() {
        let value = v(json!({"a": [1, {"b": null}], "c": "d"}));
        assert_eq!(diff(&value, &value.clone()), Ok(vec![]));
    }

    #[test]
    fn updates_follow_key_order() {
        let edits = diff(&v(json!({"x": 1, "y": 1, "z": 1})), &v(json!({"x": 2, "y": 2, "z": 2})));
        assert_eq!(
            edits,
            Ok(vec![Edit::update("/x", 2), Edit::update("/y", 2), Edit::update("/z", 2)])
        );
    }

    #[test]
    fn array_deletes_descend() {
        let edits = diff(&v(json!([1, 2, 3, 4])), &v(json!([1, 2])));
        assert_eq!(edits, Ok(vec![Edit::delete("/3"), Edit::delete("/2")]));
    }

    #[test]
    fn array_inserts_ascend() {
        let edits = diff(&v(json!([1])), &v(json!([1, 2, 3])));
        assert_eq!(edits, Ok(vec![Edit::insert("/1", 2), Edit::insert("/2", 3)]));
    }

    #[test]
    fn inserts_then_updates_then_deletes() {
        let edits = diff(
            &v(json!({"x": 1, "w": 1, "y": 1})),
            &v(json!({"a": 2, "w": 2, "b": 2})),
        )
        .unwrap();
        assert_eq!(
            edits,
            vec![
                Edit::insert("/a", 2),
                Edit::insert("/b", 2),
                Edit::update("/w", 2),
                Edit::delete("/x"),
                Edit::delete("/y"),
            ]
        );
    }

    #[test]
    fn nested_paths_are_escaped() {
        let edits = diff(&v(json!({"a/b": {"c~d": 1}})), &v(json!({"a/b": {"c~d": 2}})));
        assert_eq!(edits, Ok(vec![Edit::update("/a~1b/c~0d", 2)]));
    }

    #[test]
    fn kind_mismatch_is_one_update() {
        let edits = diff(&v(json!({"a": 1})), &v(json!([1])));
        assert_eq!(edits, Ok(vec![Edit::update("", v(json!([1])))]));
    }

    #[test]
    fn dates_compare_by_time() {
        let a = Value::Date(Date::from_millis(5.0));
        assert_eq!(diff(&a, &Value::Date(Date::from_millis(5.0))), Ok(vec![]));
        assert_eq!(
            diff(&a, &Value::Date(Date::from_millis(6.0))),
            Ok(vec![Edit::update("", Value::Date(Date::from_millis(6.0)))])
        );
    }

    #[test]
    fn typed_arrays_diff_elementwise_when_compatible() {
        let a = Value::TypedArray(TypedArray::Uint8(vec![1, 2, 3]));
        let b = Value::TypedArray(TypedArray::Uint8(vec![1, 9, 3]));
        assert_eq!(diff(&a, &b), Ok(vec![Edit::update("/1", 9)]));

        let c = Value::TypedArray(TypedArray::Uint8(vec![1, 2]));
        assert_eq!(diff(&a, &c), Ok(vec![Edit::update("", c.clone())]));
    }

    #[test]
    fn symbol_keys_are_rejected() {
        let mut map = ObjectMap::new();
        map.insert(PropertyKey::from(Symbol::new(Some("s"))), Value::from(1));
        let with_symbol = Value::from_entries([("inner", Value::object(map))]);
        let plain = v(json!({"inner": {}}));
        assert_eq!(
            diff(&with_symbol, &plain),
            Err(DiffError::SymbolKey {
                path: "/inner".into()
            })
        );
        assert!(diff(&plain, &with_symbol).is_err());
    }
}
