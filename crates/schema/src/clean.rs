//! Removing parts of a value the schema does not describe.

use shapecheck_value::{ObjectMap, PropertyKey, Value};

use crate::check::keys::KeyMatcher;
use crate::check::{visit as check, ValueError};
use crate::references::{dereference, References};
use crate::schema::{AdditionalProperties, ObjectSchema, Schema};

/// Returns `value` without object properties, record entries and tuple
/// elements that `schema` does not describe. Nothing else changes, so the
/// result may still fail a check.
pub fn clean(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, ValueError> {
    visit(schema, &References::new(references), value)
}

fn visit<'a>(schema: &'a Schema, references: &References<'a>, value: &Value) -> Result<Value, ValueError> {
    let refs = references.extend(schema);
    let out = match (schema, value) {
        (Schema::Ref(_) | Schema::This(_), _) => {
            let target = dereference(schema, &refs)?;
            return visit(target, &refs, value);
        }
        (Schema::Object(s), Value::Object(map)) => {
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                if let Some(kept) = object_entry(s, &refs, key, v)? {
                    out.insert(key.clone(), kept);
                }
            }
            Value::object(out)
        }
        (Schema::Record(s), Value::Object(map)) => {
            let keys = KeyMatcher::new(&s.key).map_err(ValueError::RecordKey)?;
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                if key.as_str().is_some_and(|k| keys.matches(k)) {
                    out.insert(key.clone(), visit(&s.value, &refs, v)?);
                }
            }
            Value::object(out)
        }
        (Schema::Array(s), Value::Array(items)) => Value::array(
            items
                .iter()
                .map(|item| visit(&s.items, &refs, item))
                .collect::<Result<_, _>>()?,
        ),
        (Schema::Tuple(s), Value::Array(items)) => Value::array(
            items
                .iter()
                .zip(&s.items)
                .map(|(item, item_schema)| visit(item_schema, &refs, item))
                .collect::<Result<_, _>>()?,
        ),
        (Schema::Union(s), _) => {
            for variant in &s.variants {
                if check(variant, &refs, value)? {
                    return visit(variant, &refs, value);
                }
            }
            value.clone()
        }
        (Schema::Intersect(s), Value::Object(map)) => {
            let mut members = Vec::new();
            for member in &s.members {
                if let Schema::Object(o) = dereference(member, &refs)? {
                    members.push(o);
                }
            }
            let mut out = ObjectMap::with_capacity(map.len());
            for (key, v) in map.iter() {
                let mut kept = None;
                for member in &members {
                    let current = kept.clone().unwrap_or_else(|| v.clone());
                    if let Some(cleaned) = object_entry(member, &refs, key, &current)? {
                        kept = Some(cleaned);
                    }
                }
                if let Some(kept) = kept {
                    out.insert(key.clone(), kept);
                }
            }
            Value::object(out)
        }
        _ => value.clone(),
    };
    Ok(out)
}

/// The cleaned value of one object entry, or `None` if the entry is not
/// described by `s`.
fn object_entry<'a>(
    s: &'a ObjectSchema,
    refs: &References<'a>,
    key: &PropertyKey,
    value: &Value,
) -> Result<Option<Value>, ValueError> {
    if let Some(property) = key.as_str().and_then(|k| s.properties.get(k)) {
        return visit(&property.schema, refs, value).map(Some);
    }
    match &s.additional_properties {
        AdditionalProperties::Forbid => Ok(None),
        AdditionalProperties::Allow => Ok(Some(value.clone())),
        AdditionalProperties::Schema(extra) => {
            if check(extra, refs, value)? {
                visit(extra, refs, value).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}
