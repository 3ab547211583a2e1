//! Deep cloning of values.
//!
//! `Value::clone` is shallow for arrays and objects (the allocation is
//! shared). [`clone_deep`] rebuilds every container so the result shares no
//! array or object with its source and can be mutated freely.

use std::sync::Arc;

use crate::value::Value;

/// Creates a deep clone of a value.
///
/// # Examples
///
/// ```
/// use shapecheck_value::{clone_deep, Value};
///
/// let original = Value::from_entries([("foo", Value::from(vec![Value::from(1)]))]);
/// let cloned = clone_deep(&original);
///
/// assert_eq!(original, cloned);
/// assert_ne!(original.identity(), cloned.identity());
/// ```
pub fn clone_deep(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(Arc::new(items.iter().map(clone_deep).collect())),
        Value::Object(map) => Value::Object(Arc::new(
            map.iter().map(|(k, v)| (k.clone(), clone_deep(v))).collect(),
        )),
        Value::Promise(inner) => Value::Promise(Arc::new(clone_deep(inner))),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_array::TypedArray;

    #[test]
    fn test_clone_scalars() {
        for v in [Value::Null, Value::Undefined, Value::from(true), Value::from(42), Value::from("x")] {
            assert_eq!(clone_deep(&v), v);
        }
    }

    #[test]
    fn test_clone_nested_containers_are_fresh() {
        let inner = Value::from_entries([("a", Value::from(1))]);
        let outer = Value::from(vec![inner.clone(), inner.clone()]);
        let cloned = clone_deep(&outer);
        assert_eq!(cloned, outer);
        let items = cloned.as_array().unwrap();
        assert_ne!(items[0].identity(), inner.identity());
        assert_ne!(items[0].identity(), items[1].identity());
    }

    #[test]
    fn test_clone_typed_array() {
        let v = Value::TypedArray(TypedArray::Uint8(vec![1, 2, 3]));
        assert_eq!(clone_deep(&v), v);
    }
}
