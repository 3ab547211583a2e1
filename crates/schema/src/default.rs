//! Filling absent values from `default` annotations.

use shapecheck_value::{KeyRef, ObjectMap, Value};

use crate::check::{visit as check, ValueError};
use crate::references::{dereference, References};
use crate::schema::{AdditionalProperties, Schema};

/// Returns `value` with every absent part that has a declared `default`
/// filled in. `Undefined` counts as absent. Present values are never
/// replaced.
pub fn default(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, ValueError> {
    visit(schema, &References::new(references), value)
}

fn visit<'a>(schema: &'a Schema, references: &References<'a>, value: &Value) -> Result<Value, ValueError> {
    let refs = references.extend(schema);
    if value.is_undefined() {
        if let Some(d) = schema.default_value() {
            return Ok(d.clone());
        }
    }
    let out = match (schema, value) {
        (Schema::Ref(_) | Schema::This(_), _) => {
            let target = dereference(schema, &refs)?;
            return visit(target, &refs, value);
        }
        (Schema::Object(s), Value::Object(map)) => {
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                let property = key.as_str().and_then(|k| s.properties.get(k));
                let filled = match (property, &s.additional_properties) {
                    (Some(p), _) => visit(&p.schema, &refs, v)?,
                    (None, AdditionalProperties::Schema(extra)) => visit(extra, &refs, v)?,
                    (None, _) => v.clone(),
                };
                out.insert(key.clone(), filled);
            }
            for (key, property) in &s.properties {
                if map.contains_key(&KeyRef(key)) {
                    continue;
                }
                let filled = visit(&property.schema, &refs, &Value::Undefined)?;
                if !filled.is_undefined() {
                    out.insert(key.as_str().into(), filled);
                }
            }
            Value::object(out)
        }
        (Schema::Record(s), Value::Object(map)) => {
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                out.insert(key.clone(), visit(&s.value, &refs, v)?);
            }
            Value::object(out)
        }
        (Schema::Array(s), Value::Array(items)) => Value::array(
            items
                .iter()
                .map(|item| visit(&s.items, &refs, item))
                .collect::<Result<_, _>>()?,
        ),
        (Schema::Tuple(s), Value::Array(items)) => {
            let mut out = Vec::with_capacity(s.items.len().max(items.len()));
            for (i, item_schema) in s.items.iter().enumerate() {
                let item = items.get(i).cloned().unwrap_or_default();
                out.push(visit(item_schema, &refs, &item)?);
            }
            out.extend(items.iter().skip(s.items.len()).cloned());
            // Trailing positions that stayed undefined were absent, not filled.
            while out.len() > items.len() && out.last().is_some_and(Value::is_undefined) {
                out.pop();
            }
            Value::array(out)
        }
        (Schema::Union(s), _) => {
            for variant in &s.variants {
                let filled = visit(variant, &refs, value)?;
                if check(variant, &refs, &filled)? {
                    return Ok(filled);
                }
            }
            value.clone()
        }
        (Schema::Intersect(s), _) => {
            let mut current = value.clone();
            for member in &s.members {
                current = visit(member, &refs, &current)?;
            }
            current
        }
        _ => value.clone(),
    };
    Ok(out)
}
