//! Value pointers (RFC 6901) - parse, format, get, set and delete.
//!
//! A pointer is either `""` (the root) or a sequence of `/`-prefixed,
//! escaped path components. `~1` encodes `/` and `~0` encodes `~`.
//!
//! # Example
//!
//! ```
//! use shapecheck_value::pointer::{format, get, parse, set};
//! use shapecheck_value::Value;
//!
//! let path = parse("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format(&path), "/foo/bar");
//!
//! let mut doc = Value::empty_object();
//! set(&mut doc, "/foo/bar", Value::from(42)).unwrap();
//! assert_eq!(get(&doc, "/foo/bar"), Some(Value::from(42)));
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::value::{KeyRef, PropertyKey, Value};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("cannot set the root value through a pointer")]
    RootSet,
    #[error("cannot delete the root value through a pointer")]
    RootDelete,
    #[error("invalid array index `{0}`")]
    InvalidIndex(String),
    #[error("value at `{0}` cannot hold children")]
    InvalidTarget(String),
}

/// Unescapes a pointer path component.
///
/// ```
/// use shapecheck_value::pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer path component.
///
/// ```
/// use shapecheck_value::pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a pointer into unescaped components. `""` is the root (no
/// components); a missing leading `/` is tolerated.
pub fn parse(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape_component).collect()
}

/// Formats components into a pointer. The empty path formats as `""`.
pub fn format(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Appends one escaped component to an existing pointer.
pub fn join(pointer: &str, component: &str) -> String {
    let mut out = String::with_capacity(pointer.len() + component.len() + 1);
    out.push_str(pointer);
    out.push('/');
    out.push_str(&escape_component(component));
    out
}

fn parse_index(key: &str) -> Result<usize, PointerError> {
    key.parse::<usize>()
        .map_err(|_| PointerError::InvalidIndex(key.to_string()))
}

/// Reads the value at `pointer`. Typed array elements are returned as
/// numbers (or bigints), which is why the result is owned.
pub fn get(value: &Value, pointer: &str) -> Option<Value> {
    let mut node = value;
    let path = parse(pointer);
    let Some((last, parents)) = path.split_last() else {
        return Some(value.clone());
    };
    for key in parents {
        node = match node {
            Value::Object(map) => map.get(&KeyRef(key))?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match node {
        Value::Object(map) => map.get(&KeyRef(last)).cloned(),
        Value::Array(items) => items.get(last.parse::<usize>().ok()?).cloned(),
        Value::TypedArray(t) => t.get(last.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Returns true if a value exists at `pointer`.
pub fn has(value: &Value, pointer: &str) -> bool {
    get(value, pointer).is_some()
}

/// Sets the value at `pointer`, creating intermediate objects for missing
/// components. Writing one past the end of an array appends; writing further
/// out pads the gap with `Undefined`.
pub fn set(value: &mut Value, pointer: &str, update: Value) -> Result<(), PointerError> {
    let path = parse(pointer);
    let Some((last, parents)) = path.split_last() else {
        return Err(PointerError::RootSet);
    };
    let mut node = value;
    for (depth, key) in parents.iter().enumerate() {
        node = descend_or_create(node, key, &path[..depth])?;
    }
    match node {
        Value::Object(map) => {
            Arc::make_mut(map).insert(PropertyKey::from(last.as_str()), update);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(last)?;
            let items = Arc::make_mut(items);
            if index >= items.len() {
                items.resize(index + 1, Value::Undefined);
            }
            items[index] = update;
            Ok(())
        }
        Value::TypedArray(t) => {
            let index = parse_index(last)?;
            if t.set(index, &update) {
                Ok(())
            } else {
                Err(PointerError::InvalidIndex(last.clone()))
            }
        }
        _ => Err(PointerError::InvalidTarget(format(parents))),
    }
}

fn descend_or_create<'a>(
    node: &'a mut Value,
    key: &str,
    at: &[String],
) -> Result<&'a mut Value, PointerError> {
    let slot = match node {
        Value::Object(map) => Arc::make_mut(map)
            .entry(PropertyKey::from(key))
            .or_insert(Value::Undefined),
        Value::Array(items) => {
            let index = parse_index(key)?;
            let items = Arc::make_mut(items);
            if index >= items.len() {
                items.resize(index + 1, Value::Undefined);
            }
            &mut items[index]
        }
        _ => return Err(PointerError::InvalidTarget(format(at))),
    };
    if slot.is_undefined() {
        *slot = Value::empty_object();
    }
    Ok(slot)
}

/// Deletes the value at `pointer`. Array elements are removed and later
/// elements shift down. Deleting a missing path is a no-op.
pub fn delete(value: &mut Value, pointer: &str) -> Result<(), PointerError> {
    let path = parse(pointer);
    let Some((last, parents)) = path.split_last() else {
        return Err(PointerError::RootDelete);
    };
    let mut node = value;
    for key in parents {
        let next = match node {
            Value::Object(map) => Arc::make_mut(map).get_mut(&KeyRef(key)),
            Value::Array(items) => match key.parse::<usize>() {
                Ok(index) => Arc::make_mut(items).get_mut(index),
                Err(_) => None,
            },
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return Ok(()),
        }
    }
    match node {
        Value::Object(map) => {
            Arc::make_mut(map).shift_remove(&KeyRef(last));
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(last)?;
            if index < items.len() {
                Arc::make_mut(items).remove(index);
            }
            Ok(())
        }
        Value::TypedArray(_) => Err(PointerError::InvalidTarget(format(parents))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        Value::from_entries([
            ("a", Value::from_entries([("b", Value::from(1))])),
            ("list", Value::from(vec![Value::from(1), Value::from(2), Value::from(3)])),
        ])
    }

    #[test]
    fn parse_and_format_round_trip_escapes() {
        assert_eq!(parse(""), Vec::<String>::new());
        assert_eq!(parse("/"), vec![""]);
        assert_eq!(parse("/a~0b/c~1d"), vec!["a~b", "c/d"]);
        assert_eq!(format(&parse("/a~0b/c~1d")), "/a~0b/c~1d");
        assert_eq!(join("/x", "a/b"), "/x/a~1b");
    }

    #[test]
    fn get_walks_objects_and_arrays() {
        let d = doc();
        assert_eq!(get(&d, "/a/b"), Some(Value::from(1)));
        assert_eq!(get(&d, "/list/2"), Some(Value::from(3)));
        assert_eq!(get(&d, "/list/9"), None);
        assert_eq!(get(&d, ""), Some(d.clone()));
        assert!(!has(&d, "/a/c"));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut d = Value::empty_object();
        set(&mut d, "/x/y/z", Value::from(true)).unwrap();
        assert_eq!(get(&d, "/x/y/z"), Some(Value::from(true)));
    }

    #[test]
    fn set_appends_and_pads_arrays() {
        let mut d = doc();
        set(&mut d, "/list/3", Value::from(4)).unwrap();
        set(&mut d, "/list/5", Value::from(6)).unwrap();
        let list = get(&d, "/list").unwrap();
        let items = list.as_array().unwrap();
        assert_eq!(items.len(), 6);
        assert!(items[4].is_undefined());
    }

    #[test]
    fn set_does_not_touch_shared_source() {
        let original = doc();
        let mut working = original.clone();
        set(&mut working, "/a/b", Value::from(2)).unwrap();
        assert_eq!(get(&original, "/a/b"), Some(Value::from(1)));
        assert_eq!(get(&working, "/a/b"), Some(Value::from(2)));
    }

    #[test]
    fn root_set_and_delete_fail() {
        let mut d = doc();
        assert_eq!(set(&mut d, "", Value::Null), Err(PointerError::RootSet));
        assert_eq!(delete(&mut d, ""), Err(PointerError::RootDelete));
    }

    #[test]
    fn delete_shifts_arrays_and_ignores_missing() {
        let mut d = doc();
        delete(&mut d, "/list/0").unwrap();
        assert_eq!(get(&d, "/list/0"), Some(Value::from(2)));
        delete(&mut d, "/nope/deeper").unwrap();
        delete(&mut d, "/a/b").unwrap();
        assert_eq!(get(&d, "/a"), Some(Value::empty_object()));
    }

    #[test]
    fn set_into_scalar_is_invalid_target() {
        let mut d = doc();
        assert!(matches!(
            set(&mut d, "/a/b/c", Value::Null),
            Err(PointerError::InvalidTarget(_))
        ));
    }
}
