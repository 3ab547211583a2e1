//! Leaf-local value repair.
//!
//! [`convert`] reinterprets scalars that are near misses for the schema (a
//! numeric string where a number is expected, `"true"` where a boolean is
//! expected and so on). Composite values are walked and rebuilt, but nothing
//! is added or removed: missing properties stay missing.

use once_cell::sync::Lazy;
use regex::Regex;
use shapecheck_value::{Date, ObjectMap, Symbol, Value};

use crate::check::{keys::number_key, visit as check, ValueError};
use crate::references::{dereference, References};
use crate::schema::{AdditionalProperties, LiteralValue, Schema};

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d{2}:\d{2}:\d{2}(\.\d+)?(z|[+-]\d{2}:?\d{2})?$").unwrap()
});
static DATE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

/// Converts what can be converted in `value` towards `schema`.
///
/// The result is not guaranteed to conform; pair with
/// [`check`](crate::check) or use [`cast`](crate::cast) for that.
pub fn convert(schema: &Schema, references: &[Schema], value: &Value) -> Result<Value, ValueError> {
    visit(schema, &References::new(references), value)
}

pub(crate) fn visit<'a>(
    schema: &'a Schema,
    references: &References<'a>,
    value: &Value,
) -> Result<Value, ValueError> {
    let refs = references.extend(schema);
    let converted = match schema {
        Schema::Ref(_) | Schema::This(_) => {
            let target = dereference(schema, &refs)?;
            return visit(target, &refs, value);
        }
        Schema::Boolean(_) => to_boolean(value),
        Schema::Number(_) => to_number(value),
        Schema::Integer(_) => to_number(value).map(|v| match v {
            Value::Number(n) if n.is_finite() => Value::Number(n.trunc()),
            other => other,
        }),
        Schema::BigInt(_) => to_bigint(value),
        Schema::String(_) => to_string(value),
        Schema::Symbol(_) => to_symbol(value),
        Schema::Null(_) => match value {
            Value::String(s) if s == "null" => Some(Value::Null),
            _ => None,
        },
        Schema::Undefined(_) | Schema::Void(_) => match value {
            Value::String(s) if s == "undefined" => Some(Value::Undefined),
            _ => None,
        },
        Schema::Date(_) => to_date(value),
        Schema::Literal(s) => {
            let candidate = match &s.value {
                LiteralValue::String(_) => to_string(value),
                LiteralValue::Number(_) => to_number(value),
                LiteralValue::Boolean(_) => to_boolean(value),
            };
            candidate.filter(|c| s.value.matches(c))
        }
        Schema::Array(s) => match value {
            Value::Array(items) => Some(Value::array(
                items
                    .iter()
                    .map(|item| visit(&s.items, &refs, item))
                    .collect::<Result<_, _>>()?,
            )),
            _ => None,
        },
        Schema::Tuple(s) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(match s.items.get(i) {
                        Some(item_schema) => visit(item_schema, &refs, item)?,
                        None => item.clone(),
                    });
                }
                Some(Value::array(out))
            }
            _ => None,
        },
        Schema::Object(s) => match value {
            Value::Object(map) => {
                let mut out = ObjectMap::with_capacity(map.len());
                for (key, v) in map.iter() {
                    let property = key.as_str().and_then(|k| s.properties.get(k));
                    let converted = match (property, &s.additional_properties) {
                        (Some(p), _) => visit(&p.schema, &refs, v)?,
                        (None, AdditionalProperties::Schema(extra)) => visit(extra, &refs, v)?,
                        (None, _) => v.clone(),
                    };
                    out.insert(key.clone(), converted);
                }
                Some(Value::object(out))
            }
            _ => None,
        },
        Schema::Record(s) => match value {
            Value::Object(map) => {
                let mut out = ObjectMap::with_capacity(map.len());
                for (key, v) in map.iter() {
                    out.insert(key.clone(), visit(&s.value, &refs, v)?);
                }
                Some(Value::object(out))
            }
            _ => None,
        },
        Schema::Union(s) => {
            let mut found = None;
            for variant in &s.variants {
                let candidate = visit(variant, &refs, value)?;
                if check(variant, &refs, &candidate)? {
                    found = Some(candidate);
                    break;
                }
            }
            found
        }
        Schema::Intersect(s) => {
            let mut current = value.clone();
            for member in &s.members {
                current = visit(member, &refs, &current)?;
            }
            Some(current)
        }
        _ => None,
    };
    Ok(converted.unwrap_or_else(|| value.clone()))
}

fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if !t.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if *n == 1.0 => Some(Value::Bool(true)),
        Value::Number(n) if *n == 0.0 => Some(Value::Bool(false)),
        Value::BigInt(1) => Some(Value::Bool(true)),
        Value::BigInt(0) => Some(Value::Bool(false)),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => parse_number(s).map(Value::Number),
        Value::Bool(b) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::BigInt(n) => Some(Value::Number(*n as f64)),
        _ => None,
    }
}

fn to_bigint(value: &Value) -> Option<Value> {
    let n = match value {
        Value::String(s) => parse_number(s)?,
        Value::Number(n) if n.is_finite() => *n,
        Value::Bool(b) => return Some(Value::BigInt(i128::from(*b))),
        _ => return None,
    };
    Some(Value::BigInt(n.trunc() as i128))
}

pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.into()
    } else {
        number_key(n)
    }
}

fn to_string(value: &Value) -> Option<Value> {
    let s = match value {
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Symbol(sym) => sym.description()?.to_string(),
        _ => return None,
    };
    Some(Value::String(s))
}

fn to_symbol(value: &Value) -> Option<Value> {
    let description = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(n) => n.to_string(),
        _ => return None,
    };
    Some(Value::Symbol(Symbol::new(Some(&description))))
}

fn to_date(value: &Value) -> Option<Value> {
    let date = match value {
        Value::Number(n) => Date::from_millis(*n),
        Value::BigInt(n) => Date::from_millis(*n as f64),
        Value::Bool(b) => Date::from_millis(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            if let Some(n) = parse_number(s) {
                Date::from_millis(n)
            } else if TIME.is_match(s) {
                Date::parse(&format!("1970-01-01T{s}")).unwrap_or(Date::EPOCH)
            } else if DATE_LIKE.is_match(s) {
                Date::parse(s).unwrap_or(Date::EPOCH)
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(Value::Date(date))
}
