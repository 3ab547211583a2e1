//! Structural equality of values.

use crate::value::Value;

/// Performs a deep equality check between two values.
///
/// - numbers compare by plain equality (`NaN != NaN`, `0 == -0`)
/// - dates compare by epoch milliseconds
/// - typed arrays require the same element kind, the same length and equal
///   elements
/// - arrays compare element by element
/// - objects require identical key sets and recursively equal values; key
///   order is not significant
/// - symbols, functions and promises compare by identity
///
/// # Examples
///
/// ```
/// use shapecheck_value::{equal, Value};
///
/// let a = Value::from_entries([("foo", Value::from(vec![Value::from(1), Value::from(2)]))]);
/// let b = Value::from_entries([("foo", Value::from(vec![Value::from(1), Value::from(2)]))]);
/// let c = Value::from_entries([("foo", Value::from(vec![Value::from(1), Value::from(3)]))]);
///
/// assert!(equal(&a, &b));
/// assert!(!equal(&a, &c));
/// ```
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::BigInt(a), Value::BigInt(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a.millis() == b.millis(),
        (Value::TypedArray(a), Value::TypedArray(b)) => {
            a.kind() == b.kind()
                && a.len() == b.len()
                && (0..a.len()).all(|i| match (a.get(i), b.get(i)) {
                    (Some(x), Some(y)) => equal(&x, &y),
                    _ => false,
                })
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }
            a.iter().all(|(key, va)| match b.get(key) {
                Some(vb) => equal(va, vb),
                None => false,
            })
        }
        (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
        (Value::Promise(a), Value::Promise(b)) => std::sync::Arc::ptr_eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Date;
    use crate::typed_array::TypedArray;
    use crate::value::{PropertyKey, Symbol};

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert!(!equal(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn test_signed_zeros_are_equal() {
        assert!(equal(&Value::Number(0.0), &Value::Number(-0.0)));
    }

    #[test]
    fn test_zero_and_null_not_equal() {
        assert!(!equal(&Value::from(0), &Value::Null));
        assert!(!equal(&Value::Null, &Value::Undefined));
    }

    #[test]
    fn test_one_and_true_not_equal() {
        assert!(!equal(&Value::from(1), &Value::from(true)));
    }

    #[test]
    fn test_dates_compare_by_time() {
        assert!(equal(&Value::Date(Date::from_millis(5.0)), &Value::Date(Date::from_millis(5.0))));
        assert!(!equal(&Value::Date(Date::from_millis(5.0)), &Value::Date(Date::from_millis(6.0))));
    }

    #[test]
    fn test_typed_arrays_need_same_kind() {
        let a = Value::TypedArray(TypedArray::Uint8(vec![1, 2]));
        let b = Value::TypedArray(TypedArray::Int8(vec![1, 2]));
        let c = Value::TypedArray(TypedArray::Uint8(vec![1, 2]));
        assert!(!equal(&a, &b));
        assert!(equal(&a, &c));
    }

    #[test]
    fn test_object_key_order_is_ignored() {
        let a = Value::from_entries([("a", Value::from(1)), ("b", Value::from(2))]);
        let b = Value::from_entries([("b", Value::from(2)), ("a", Value::from(1))]);
        assert!(equal(&a, &b));
    }

    #[test]
    fn test_objects_with_different_keys() {
        let a = Value::from_entries([("a", Value::Undefined)]);
        let b = Value::from_entries([("b", Value::Undefined)]);
        assert!(!equal(&a, &b));
    }

    #[test]
    fn test_symbol_keys_participate() {
        let sym = Symbol::new(None);
        let mut map = crate::value::ObjectMap::new();
        map.insert(PropertyKey::Symbol(sym.clone()), Value::from(1));
        let a = Value::object(map.clone());
        let b = Value::object(map);
        assert!(equal(&a, &b));
    }

    #[test]
    fn test_array_and_object_not_equal() {
        assert!(!equal(&Value::from(Vec::<Value>::new()), &Value::empty_object()));
    }
}
