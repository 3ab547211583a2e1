//! Decoding and encoding through transform hooks.
//!
//! A schema node may carry a [`Transform`]. [`decode`] validates a value
//! against the schema and then rewrites it bottom-up with each node's decode
//! hook, so a hook sees children that are already decoded. [`encode`] runs
//! the encode hooks top-down and validates the result.

use std::fmt;

use shapecheck_value::{pointer, ObjectMap, PropertyKey, Value};
use thiserror::Error;

use crate::check::keys::KeyMatcher;
use crate::check::{visit as check, ValueError, ValueErrorRecord, ValueErrors};
use crate::references::{dereference, validate_references, References};
use crate::schema::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
        })
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("{direction} hook on {schema} failed at `{path}`: {source}")]
    Hook {
        schema: String,
        direction: Direction,
        path: String,
        value: Value,
        source: HookError,
    },
    #[error("{direction} expects a value that conforms to {schema} ({} errors)", .errors.len())]
    Check {
        schema: String,
        direction: Direction,
        errors: Vec<ValueErrorRecord>,
    },
}

/// Checks `value` against `schema`, then applies decode hooks from the
/// leaves up.
pub fn decode(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, TransformError> {
    let refs = References::new(references);
    conforms(schema, &refs, value, Direction::Decode)?;
    Walker {
        direction: Direction::Decode,
    }
    .visit(schema, &refs, value, "")
}

/// Applies encode hooks from the root down, then checks the result against
/// `schema`.
pub fn encode(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, TransformError> {
    let refs = References::new(references);
    let out = Walker {
        direction: Direction::Encode,
    }
    .visit(schema, &refs, value, "")?;
    conforms(schema, &refs, &out, Direction::Encode)?;
    Ok(out)
}

fn conforms<'a>(
    schema: &'a Schema,
    refs: &References<'a>,
    value: &Value,
    direction: Direction,
) -> Result<(), TransformError> {
    if check(schema, refs, value)? {
        return Ok(());
    }
    validate_references(schema, refs).map_err(ValueError::from)?;
    Err(TransformError::Check {
        schema: schema.to_string(),
        direction,
        errors: ValueErrors::new(schema, refs.clone(), value).collect(),
    })
}

struct Walker {
    direction: Direction,
}

impl Walker {
    fn hook(&self, schema: &Schema, value: Value, path: &str) -> Result<Value, TransformError> {
        let Some(transform) = &schema.base().transform else {
            return Ok(value);
        };
        let hook = match self.direction {
            Direction::Decode => &transform.decode,
            Direction::Encode => &transform.encode,
        };
        hook(value.clone()).map_err(|source| TransformError::Hook {
            schema: schema.to_string(),
            direction: self.direction,
            path: path.to_string(),
            value,
            source,
        })
    }

    fn visit<'a>(
        &self,
        schema: &'a Schema,
        references: &References<'a>,
        value: &Value,
        path: &str,
    ) -> Result<Value, TransformError> {
        let refs = references.extend(schema);
        match self.direction {
            Direction::Decode => {
                let inner = self.children(schema, &refs, value, path)?;
                self.hook(schema, inner, path)
            }
            Direction::Encode => {
                let outer = self.hook(schema, value.clone(), path)?;
                self.children(schema, &refs, &outer, path)
            }
        }
    }

    fn children<'a>(
        &self,
        schema: &'a Schema,
        refs: &References<'a>,
        value: &Value,
        path: &str,
    ) -> Result<Value, TransformError> {
        let out = match (schema, value) {
            (Schema::Ref(_) | Schema::This(_), _) => {
                let target = dereference(schema, refs).map_err(ValueError::from)?;
                self.visit(target, refs, value, path)?
            }
            (Schema::Array(s), Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.visit(&s.items, refs, item, &pointer::join(path, &i.to_string()))?);
                }
                Value::array(out)
            }
            (Schema::Tuple(s), Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(match s.items.get(i) {
                        Some(item_schema) => {
                            self.visit(item_schema, refs, item, &pointer::join(path, &i.to_string()))?
                        }
                        None => item.clone(),
                    });
                }
                Value::array(out)
            }
            (Schema::Object(s), Value::Object(map)) => {
                let mut out = ObjectMap::with_capacity(map.len());
                for (key, v) in map.iter() {
                    let property = key.as_str().and_then(|k| s.properties.get(k));
                    let next = match (property, &s.additional_properties) {
                        (Some(p), _) if !v.is_undefined() => {
                            self.visit(&p.schema, refs, v, &child_path(path, key))?
                        }
                        (None, AdditionalProperties::Schema(extra)) => {
                            self.visit(extra, refs, v, &child_path(path, key))?
                        }
                        _ => v.clone(),
                    };
                    out.insert(key.clone(), next);
                }
                Value::object(out)
            }
            (Schema::Record(s), Value::Object(map)) => {
                let keys = KeyMatcher::new(&s.key).map_err(ValueError::RecordKey)?;
                let mut out = ObjectMap::with_capacity(map.len());
                for (key, v) in map.iter() {
                    let next = if key.as_str().is_some_and(|k| keys.matches(k)) {
                        self.visit(&s.value, refs, v, &child_path(path, key))?
                    } else {
                        v.clone()
                    };
                    out.insert(key.clone(), next);
                }
                Value::object(out)
            }
            (Schema::Union(s), _) => self.union(s, refs, value, path)?,
            (Schema::Intersect(s), _) => {
                let mut current = value.clone();
                for member in &s.members {
                    current = self.visit(member, refs, &current, path)?;
                }
                current
            }
            (Schema::Promise(s), Value::Promise(resolved)) => {
                Value::promise(self.visit(&s.item, refs, resolved, path)?)
            }
            _ => value.clone(),
        };
        Ok(out)
    }

    /// Decoding follows the first variant the input checks against. Encoding
    /// keeps the first variant whose encoded output checks.
    fn union<'a>(
        &self,
        s: &'a UnionSchema,
        refs: &References<'a>,
        value: &Value,
        path: &str,
    ) -> Result<Value, TransformError> {
        for variant in &s.variants {
            match self.direction {
                Direction::Decode => {
                    if check(variant, refs, value)? {
                        return self.visit(variant, refs, value, path);
                    }
                }
                Direction::Encode => {
                    let Ok(encoded) = self.visit(variant, refs, value, path) else {
                        continue;
                    };
                    if check(variant, refs, &encoded)? {
                        return Ok(encoded);
                    }
                }
            }
        }
        Ok(value.clone())
    }
}

fn child_path(path: &str, key: &PropertyKey) -> String {
    pointer::join(path, &key.to_string())
}
