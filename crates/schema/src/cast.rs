//! Coercing arbitrary values into conformance.

use std::collections::HashMap;

use shapecheck_value::{equal, hash, KeyRef, ObjectMap, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::check::keys::KeyMatcher;
use crate::check::{visit as check, ValueError};
use crate::create::{visit as create, CreateError};
use crate::references::{dereference, DereferenceError, References};
use crate::schema::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CastError {
    #[error(transparent)]
    Dereference(#[from] DereferenceError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error("Never types cannot be cast")]
    Never,
    #[error("array cast produced items that cannot be made unique")]
    UniqueItems,
    #[error("cast produced a value that does not satisfy {0}")]
    Unsatisfiable(String),
}

/// Union score for a literal property matching the value.
const SCORE_LITERAL: usize = 100;
/// Union score for a property whose value checks.
const SCORE_CHECK: usize = 10;
/// Union score for a property that is present.
const SCORE_PRESENT: usize = 1;

/// Results already computed for a shared allocation, keyed by the address of
/// the allocation and of the schema node it was cast against.
#[derive(Default)]
struct IdentityCache {
    entries: HashMap<(usize, usize), Value>,
}

/// Returns a value that conforms to `schema`, keeping as much of `value` as is
/// compatible.
///
/// A value that already conforms is returned as is. Otherwise the result is
/// built from [`create`](crate::create) and the compatible parts of `value`.
/// Arrays and objects reachable through more than one path are cast once and
/// the result is shared.
pub fn cast(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, CastError> {
    let refs = References::new(references);
    let mut cache = IdentityCache::default();
    let out = visit(schema, &refs, value, &mut cache)?;
    if !check(schema, &refs, &out)? {
        return Err(CastError::Unsatisfiable(schema.to_string()));
    }
    Ok(out)
}

fn visit<'a>(
    schema: &'a Schema,
    references: &References<'a>,
    value: &Value,
    cache: &mut IdentityCache,
) -> Result<Value, CastError> {
    let refs = references.extend(schema);
    if let Schema::Ref(_) | Schema::This(_) = schema {
        let target = dereference(schema, &refs)?;
        return visit(target, &refs, value, cache);
    }
    if let Schema::Never(_) = schema {
        return Err(CastError::Never);
    }
    if check(schema, &refs, value)? {
        return Ok(value.clone());
    }

    let key = value
        .identity()
        .map(|id| (id, schema as *const Schema as usize));
    if let Some(hit) = key.and_then(|k| cache.entries.get(&k)) {
        trace!("cast identity cache hit for {schema}");
        return Ok(hit.clone());
    }

    let out = match (schema, value) {
        (Schema::Array(s), Value::Array(items)) => array(s, &refs, items, cache)?,
        (Schema::Tuple(s), Value::Array(items)) => {
            let mut out = Vec::with_capacity(s.items.len());
            for (i, item_schema) in s.items.iter().enumerate() {
                out.push(match items.get(i) {
                    Some(item) => visit(item_schema, &refs, item, cache)?,
                    None => create(item_schema, &refs)?,
                });
            }
            Value::array(out)
        }
        (Schema::Object(s), Value::Object(map)) => {
            let mut out = ObjectMap::with_capacity(s.properties.len());
            for (key, property) in &s.properties {
                let current = map.get(&KeyRef(key));
                let cast = match current {
                    None if !s.is_required(key) => continue,
                    Some(v) if v.is_undefined() && !s.is_required(key) => continue,
                    Some(v) => visit(&property.schema, &refs, v, cache)?,
                    None => visit(&property.schema, &refs, &Value::Undefined, cache)?,
                };
                out.insert(key.as_str().into(), cast);
            }
            for (key, v) in map.iter() {
                if key.as_str().is_some_and(|k| s.properties.contains_key(k)) {
                    continue;
                }
                match &s.additional_properties {
                    AdditionalProperties::Forbid => {}
                    AdditionalProperties::Allow => {
                        out.insert(key.clone(), v.clone());
                    }
                    AdditionalProperties::Schema(extra) => {
                        out.insert(key.clone(), visit(extra, &refs, v, cache)?);
                    }
                }
            }
            Value::object(out)
        }
        (Schema::Record(s), Value::Object(map)) => {
            let keys = KeyMatcher::new(&s.key).map_err(ValueError::RecordKey)?;
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                if key.as_str().is_some_and(|k| keys.matches(k)) {
                    out.insert(key.clone(), visit(&s.value, &refs, v, cache)?);
                }
            }
            Value::object(out)
        }
        (Schema::Union(s), _) => match select(s, &refs, value)? {
            Some(variant) => visit(variant, &refs, value, cache)?,
            None => create(schema, &refs)?,
        },
        (Schema::Intersect(_), _) => {
            let created = create(schema, &refs)?;
            let merged = match (&created, value) {
                (Value::Object(base), Value::Object(map)) => {
                    let mut merged = (**base).clone();
                    for (k, v) in map.iter() {
                        merged.insert(k.clone(), v.clone());
                    }
                    Value::object(merged)
                }
                _ => value.clone(),
            };
            if check(schema, &refs, &merged)? {
                merged
            } else {
                created
            }
        }
        _ => create(schema, &refs)?,
    };

    if let Some(k) = key {
        cache.entries.insert(k, out.clone());
    }
    Ok(out)
}

fn array<'a>(
    s: &'a ArraySchema,
    refs: &References<'a>,
    items: &[Value],
    cache: &mut IdentityCache,
) -> Result<Value, CastError> {
    let mut working: Vec<Value> = items.to_vec();
    if let Some(min) = s.min_items {
        if working.len() < min {
            working.resize(min, Value::Undefined);
        }
    }
    if let Some(max) = s.max_items {
        working.truncate(max);
    }
    let mut out = Vec::with_capacity(working.len());
    for item in &working {
        out.push(visit(&s.items, refs, item, cache)?);
    }
    if s.unique_items {
        out = dedup(out);
        if s.min_items.is_some_and(|min| out.len() < min) {
            return Err(CastError::UniqueItems);
        }
    }
    Ok(Value::array(out))
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut seen: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        let bucket = seen.entry(hash(&item)).or_default();
        if bucket.iter().any(|&i| equal(&out[i], &item)) {
            continue;
        }
        bucket.push(out.len());
        out.push(item);
    }
    out
}

/// Picks the union variant `value` most resembles. Ties go to the earlier
/// variant.
fn select<'a>(
    s: &'a UnionSchema,
    refs: &References<'a>,
    value: &Value,
) -> Result<Option<&'a Schema>, CastError> {
    let mut selected = s.variants.first();
    let mut best = 0;
    for (index, variant) in s.variants.iter().enumerate() {
        let points = score(variant, refs, value)?;
        if points > best {
            best = points;
            selected = Some(variant);
            trace!(index, points, "union variant leads");
        }
    }
    debug!(variants = s.variants.len(), best, "selected union variant for cast");
    Ok(selected)
}

fn score<'a>(variant: &'a Schema, refs: &References<'a>, value: &Value) -> Result<usize, CastError> {
    let refs = refs.extend(variant);
    let target = dereference(variant, &refs)?;
    let refs = refs.extend(target);
    match (target, value) {
        (Schema::Object(o), Value::Object(map)) => {
            let mut points = 0;
            for (key, property) in &o.properties {
                let current = map.get(&KeyRef(key));
                let v = current.unwrap_or(&Value::Undefined);
                if let Schema::Literal(l) = dereference(&property.schema, &refs)? {
                    if l.value.matches(v) {
                        points += SCORE_LITERAL;
                    }
                }
                if check(&property.schema, &refs, v)? {
                    points += SCORE_CHECK;
                }
                if current.is_some() {
                    points += SCORE_PRESENT;
                }
            }
            Ok(points)
        }
        _ => Ok(usize::from(check(target, &refs, value)?)),
    }
}
