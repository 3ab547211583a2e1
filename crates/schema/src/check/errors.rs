use std::collections::VecDeque;

use shapecheck_value::pointer::join;
use shapecheck_value::{KeyRef, Value};

use super::keys::KeyMatcher;
use super::{constraint, visit, ValueErrorKind as K, ValueErrorRecord};
use crate::references::{dereference, References};
use crate::schema::{AdditionalProperties, Schema};

struct Frame<'a> {
    schema: &'a Schema,
    refs: References<'a>,
    path: String,
    value: &'a Value,
}

/// Lazy iterator over validation failures.
///
/// Work is done one schema node at a time as records are pulled, so taking
/// only the first record of a large value is cheap. Records of a node come
/// before the records of its children; siblings are visited in order.
pub struct ValueErrors<'a> {
    stack: Vec<Frame<'a>>,
    pending: VecDeque<ValueErrorRecord>,
}

impl<'a> ValueErrors<'a> {
    pub(crate) fn new(schema: &'a Schema, refs: References<'a>, value: &'a Value) -> Self {
        Self {
            stack: vec![Frame {
                schema,
                refs,
                path: String::new(),
                value,
            }],
            pending: VecDeque::new(),
        }
    }

    /// The first failure, if any.
    pub fn first(mut self) -> Option<ValueErrorRecord> {
        self.next()
    }

    fn report(&mut self, kind: K, path: String, schema: &Schema, actual: &Value) {
        self.pending.push_back(ValueErrorRecord::new(
            kind,
            path,
            schema.to_string(),
            actual.clone(),
        ));
    }

    fn expand(&mut self, frame: Frame<'a>) {
        let Frame {
            schema,
            refs,
            path,
            value,
        } = frame;
        let refs = refs.extend(schema);
        let mut children = Vec::new();
        let child = |schema: &'a Schema, path: String, value: &'a Value| Frame {
            schema,
            refs: refs.clone(),
            path,
            value,
        };
        match schema {
            Schema::Ref(_) | Schema::This(_) => match dereference(schema, &refs) {
                Ok(target) => children.push(child(target, path, value)),
                Err(e) => self.report(K::Dereference(e.name), path, schema, value),
            },
            Schema::Union(s) => {
                let matched = s
                    .variants
                    .iter()
                    .any(|variant| visit(variant, &refs, value).unwrap_or(false));
                if !matched {
                    self.report(K::Union, path, schema, value);
                }
            }
            Schema::Intersect(s) => {
                for member in &s.members {
                    children.push(child(member, path.clone(), value));
                }
            }
            Schema::Array(s) => match value {
                Value::Array(items) => {
                    let mut out: Vec<K> = Vec::new();
                    constraint::array(s, items, &mut out);
                    for kind in out {
                        self.report(kind, path.clone(), schema, value);
                    }
                    for (i, item) in items.iter().enumerate() {
                        children.push(child(&s.items, join(&path, &i.to_string()), item));
                    }
                }
                _ => self.report(K::Array, path, schema, value),
            },
            Schema::Tuple(s) => match value {
                Value::Array(items) => {
                    if items.len() != s.items.len() {
                        self.report(K::TupleLength(s.items.len()), path.clone(), schema, value);
                    }
                    for (i, (item, item_schema)) in items.iter().zip(&s.items).enumerate() {
                        children.push(child(item_schema, join(&path, &i.to_string()), item));
                    }
                }
                _ => self.report(K::Tuple, path, schema, value),
            },
            Schema::Object(s) => match value {
                Value::Object(map) => {
                    let mut out: Vec<K> = Vec::new();
                    constraint::property_count(s, map.len(), &mut out);
                    for kind in out {
                        self.report(kind, path.clone(), schema, value);
                    }
                    for (key, property) in &s.properties {
                        match map.get(&KeyRef(key)) {
                            Some(v) if property.modifier.is_optional() && v.is_undefined() => {}
                            Some(v) => children.push(child(&property.schema, join(&path, key), v)),
                            None if s.is_required(key) => self.report(
                                K::ObjectRequiredProperty,
                                join(&path, key),
                                &property.schema,
                                &Value::Undefined,
                            ),
                            None => {}
                        }
                    }
                    for (key, v) in map.iter() {
                        if key.as_str().is_some_and(|k| s.properties.contains_key(k)) {
                            continue;
                        }
                        let key_path = join(&path, &key.to_string());
                        match &s.additional_properties {
                            AdditionalProperties::Forbid => {
                                self.report(K::ObjectAdditionalProperty, key_path, schema, v)
                            }
                            AdditionalProperties::Allow => {}
                            AdditionalProperties::Schema(extra) => {
                                children.push(child(extra, key_path, v))
                            }
                        }
                    }
                }
                _ => self.report(K::Object, path, schema, value),
            },
            Schema::Record(s) => match value {
                Value::Object(map) => {
                    // An unsupported key pattern matches no key.
                    let keys = KeyMatcher::new(&s.key).ok();
                    for (key, v) in map.iter() {
                        let key_path = join(&path, &key.to_string());
                        let matched = match (&keys, key.as_str()) {
                            (Some(keys), Some(k)) => keys.matches(k),
                            _ => false,
                        };
                        if !matched {
                            self.report(K::RecordKey, key_path.clone(), &s.key, v);
                        }
                        children.push(child(&s.value, key_path, v));
                    }
                }
                _ => self.report(K::Object, path, schema, value),
            },
            _ => {
                let mut out: Vec<K> = Vec::new();
                constraint::leaf(schema, value, &mut out);
                for kind in out {
                    self.report(kind, path.clone(), schema, value);
                }
            }
        }
        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for ValueErrors<'_> {
    type Item = ValueErrorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            let frame = self.stack.pop()?;
            self.expand(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::check::errors as collect;
    use super::*;
    use crate::schema::Property;
    use serde_json::json;

    fn records(schema: &Schema, value: &Value) -> Vec<(K, String)> {
        collect(schema, &[], value)
            .unwrap()
            .map(|r| (r.kind, r.path))
            .collect()
    }

    #[test]
    fn reports_unexpected_and_missing_properties() {
        let s = Schema::object([
            ("x", Property::new(Schema::number())),
            ("y", Property::new(Schema::string())),
        ]);
        let v = Value::from(json!({"x": "1", "z": true}));
        assert_eq!(
            records(&s, &v),
            vec![
                (K::ObjectRequiredProperty, "/y".into()),
                (K::ObjectAdditionalProperty, "/z".into()),
                (K::Number, "/x".into()),
            ]
        );
    }

    #[test]
    fn array_paths_are_indexed() {
        let s = Schema::array(Schema::integer());
        let v = Value::from(json!([1, 2.5, "x"]));
        assert_eq!(
            records(&s, &v),
            vec![(K::Integer, "/1".into()), (K::Integer, "/2".into())]
        );
    }

    #[test]
    fn union_failure_is_one_record() {
        let s = Schema::union(vec![Schema::string(), Schema::number()]);
        let errs: Vec<_> = collect(&s, &[], &Value::Null).unwrap().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, K::Union);
        assert_eq!(errs[0].expected, "Union");
        assert_eq!(errs[0].actual, Value::Null);
    }

    #[test]
    fn keys_are_escaped_in_paths() {
        let s = Schema::record(Schema::string(), Schema::number());
        let v = Value::from(json!({"a/b": "x"}));
        assert_eq!(records(&s, &v), vec![(K::Number, "/a~1b".into())]);
    }

    #[test]
    fn valid_value_has_no_errors() {
        let s = Schema::tuple(vec![Schema::boolean(), Schema::null()]);
        assert!(collect(&s, &[], &Value::from(json!([true, null])))
            .unwrap()
            .first()
            .is_none());
    }

    #[test]
    fn dangling_reference_fails_before_iteration() {
        let s = Schema::object([("a", Property::new(Schema::reference("Nope")))]);
        assert!(collect(&s, &[], &Value::empty_object()).is_err());
    }
}
