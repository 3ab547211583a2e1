//! Structural validation.
//!
//! [`check`] answers yes or no and stops at the first failure. [`errors`]
//! walks the whole value and lazily yields one [`ValueErrorRecord`] per
//! violated constraint.

pub(crate) mod constraint;
mod errors;
pub(crate) mod keys;
mod kind;

pub use errors::ValueErrors;
pub use kind::{ValueErrorKind, ValueErrorRecord};

use shapecheck_value::{KeyRef, Value};
use thiserror::Error;

use self::constraint::passes;
use self::keys::KeyMatcher;
use crate::references::{dereference, validate_references, DereferenceError, References};
use crate::schema::{AdditionalProperties, Schema};

/// Failures that abort a check instead of being reported as validation
/// errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error(transparent)]
    Dereference(#[from] DereferenceError),
    #[error("record key cannot be of kind {0}")]
    RecordKey(&'static str),
}

/// Returns true if `value` conforms to `schema`.
///
/// `references` supplies named schemas for `Ref` nodes; named nodes inside
/// `schema` become visible to their descendants automatically.
pub fn check(schema: &Schema, references: &[Schema], value: &Value) -> Result<bool, ValueError> {
    visit(schema, &References::new(references), value)
}

/// Returns a lazy iterator over every validation failure of `value`.
///
/// All references reachable from `schema` are resolved before the iterator is
/// returned, so iteration itself cannot fail.
pub fn errors<'a>(
    schema: &'a Schema,
    references: &'a [Schema],
    value: &'a Value,
) -> Result<ValueErrors<'a>, ValueError> {
    let refs = References::new(references);
    validate_references(schema, &refs)?;
    Ok(ValueErrors::new(schema, refs, value))
}

pub(crate) fn visit<'a>(
    schema: &'a Schema,
    references: &References<'a>,
    value: &Value,
) -> Result<bool, ValueError> {
    let refs = references.extend(schema);
    match schema {
        Schema::Array(s) => {
            let Value::Array(items) = value else {
                return Ok(false);
            };
            if !passes(|out| constraint::array(s, items, out)) {
                return Ok(false);
            }
            for item in items.iter() {
                if !visit(&s.items, &refs, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Schema::Tuple(s) => {
            let Value::Array(items) = value else {
                return Ok(false);
            };
            if items.len() != s.items.len() {
                return Ok(false);
            }
            for (item, schema) in items.iter().zip(&s.items) {
                if !visit(schema, &refs, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Schema::Object(s) => {
            let Value::Object(map) = value else {
                return Ok(false);
            };
            if !passes(|out| constraint::property_count(s, map.len(), out)) {
                return Ok(false);
            }
            for (key, property) in &s.properties {
                match map.get(&KeyRef(key)) {
                    Some(v) if property.modifier.is_optional() && v.is_undefined() => {}
                    Some(v) => {
                        if !visit(&property.schema, &refs, v)? {
                            return Ok(false);
                        }
                    }
                    None if s.is_required(key) => return Ok(false),
                    None => {}
                }
            }
            for (key, v) in map.iter() {
                if key.as_str().is_some_and(|k| s.properties.contains_key(k)) {
                    continue;
                }
                match &s.additional_properties {
                    AdditionalProperties::Forbid => return Ok(false),
                    AdditionalProperties::Allow => {}
                    AdditionalProperties::Schema(extra) => {
                        if !visit(extra, &refs, v)? {
                            return Ok(false);
                        }
                    }
                }
            }
            Ok(true)
        }
        Schema::Record(s) => {
            let Value::Object(map) = value else {
                return Ok(false);
            };
            let keys = KeyMatcher::new(&s.key).map_err(ValueError::RecordKey)?;
            for (key, v) in map.iter() {
                let Some(key) = key.as_str() else {
                    return Ok(false);
                };
                if !keys.matches(key) || !visit(&s.value, &refs, v)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Schema::Union(s) => {
            for variant in &s.variants {
                if visit(variant, &refs, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Schema::Intersect(s) => {
            for member in &s.members {
                if !visit(member, &refs, value)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Schema::Ref(_) | Schema::This(_) => {
            let target = dereference(schema, &refs)?;
            visit(target, &refs, value)
        }
        _ => Ok(passes(|out| constraint::leaf(schema, value, out))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectSchema, Property};
    use serde_json::json;

    fn point() -> Schema {
        Schema::object([
            ("x", Property::new(Schema::number())),
            ("y", Property::new(Schema::string())),
        ])
    }

    #[test]
    fn unknown_keys_are_rejected_by_default() {
        let v = Value::from(json!({"x": 1, "y": "a", "z": true}));
        assert_eq!(check(&point(), &[], &v), Ok(false));
        let v = Value::from(json!({"x": 1, "y": "a"}));
        assert_eq!(check(&point(), &[], &v), Ok(true));
    }

    #[test]
    fn additional_properties_schema_checks_each_extra_value() {
        let mut obj = ObjectSchema::new([("x", Property::new(Schema::number()))]);
        obj.additional_properties = AdditionalProperties::Schema(Box::new(Schema::boolean()));
        let s = Schema::Object(obj);
        assert_eq!(check(&s, &[], &Value::from(json!({"x": 1, "flag": true}))), Ok(true));
        assert_eq!(check(&s, &[], &Value::from(json!({"x": 1, "flag": 1}))), Ok(false));
    }

    #[test]
    fn optional_properties_may_be_absent_or_undefined() {
        let s = Schema::object([("a", Property::optional(Schema::number()))]);
        assert_eq!(check(&s, &[], &Value::empty_object()), Ok(true));
        let v = Value::from_entries([("a", Value::Undefined)]);
        assert_eq!(check(&s, &[], &v), Ok(true));
        let v = Value::from_entries([("a", Value::from("x"))]);
        assert_eq!(check(&s, &[], &v), Ok(false));
    }

    #[test]
    fn recursive_schema_through_this() {
        let node = Schema::object([
            ("value", Property::new(Schema::number())),
            ("children", Property::new(Schema::array(Schema::this("Node")))),
        ])
        .with_id("Node");
        let tree = Value::from(json!({
            "value": 1,
            "children": [{"value": 2, "children": []}, {"value": 3, "children": []}]
        }));
        assert_eq!(check(&node, &[], &tree), Ok(true));
        let bad = Value::from(json!({"value": 1, "children": [{"value": "2", "children": []}]}));
        assert_eq!(check(&node, &[], &bad), Ok(false));
    }

    #[test]
    fn references_from_caller() {
        let id = Schema::string().with_id("Id");
        let s = Schema::array(Schema::reference("Id"));
        assert_eq!(check(&s, &[id], &Value::from(json!(["a", "b"]))), Ok(true));
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let s = Schema::reference("Missing");
        assert_eq!(
            check(&s, &[], &Value::Null),
            Err(ValueError::Dereference(DereferenceError {
                name: "Missing".into()
            }))
        );
    }

    #[test]
    fn record_keys_and_values() {
        let s = Schema::record(Schema::integer(), Schema::boolean());
        assert_eq!(check(&s, &[], &Value::from(json!({"1": true, "20": false}))), Ok(true));
        assert_eq!(check(&s, &[], &Value::from(json!({"a": true}))), Ok(false));
        let bad = Schema::record(Schema::boolean(), Schema::any());
        assert_eq!(
            check(&bad, &[], &Value::empty_object()),
            Err(ValueError::RecordKey("Boolean"))
        );
    }

    #[test]
    fn union_and_intersect() {
        let u = Schema::union(vec![Schema::string(), Schema::number()]);
        assert_eq!(check(&u, &[], &Value::from(1)), Ok(true));
        assert_eq!(check(&u, &[], &Value::Null), Ok(false));

        let mut a = ObjectSchema::new([("a", Property::new(Schema::number()))]);
        a.additional_properties = AdditionalProperties::Allow;
        let mut b = ObjectSchema::new([("b", Property::new(Schema::string()))]);
        b.additional_properties = AdditionalProperties::Allow;
        let both = Schema::intersect(vec![Schema::Object(a), Schema::Object(b)]);
        assert_eq!(check(&both, &[], &Value::from(json!({"a": 1, "b": "x"}))), Ok(true));
        assert_eq!(check(&both, &[], &Value::from(json!({"a": 1}))), Ok(false));
    }

    #[test]
    fn tuple_length_is_exact() {
        let s = Schema::tuple(vec![Schema::number(), Schema::string()]);
        assert_eq!(check(&s, &[], &Value::from(json!([1, "a"]))), Ok(true));
        assert_eq!(check(&s, &[], &Value::from(json!([1, "a", 2]))), Ok(false));
        assert_eq!(check(&s, &[], &Value::from(json!([1]))), Ok(false));
    }
}
