//! Minimal values from a schema alone.

use shapecheck_value::{Date, Function, ObjectMap, Symbol, TypedArray, Value};
use thiserror::Error;

use crate::check::{visit as check, ValueError};
use crate::references::{dereference, DereferenceError, References};
use crate::schema::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CreateError {
    #[error(transparent)]
    Dereference(#[from] DereferenceError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("Never types cannot be created")]
    Never,
    #[error("{kind} with {constraint} requires a default value")]
    RequiresDefault {
        kind: &'static str,
        constraint: &'static str,
    },
    #[error("an empty union cannot be created")]
    EmptyUnion,
    #[error("intersect members do not combine into a value that satisfies all of them")]
    Intersect,
    #[error("`{name}` cannot be created without creating itself")]
    Recursive { name: String },
}

/// Creates the smallest value conforming to `schema`.
///
/// A declared `default` always wins. Otherwise objects get their required
/// properties (and optional ones that declare a default), arrays and strings
/// their minimum length, numbers and dates the first step at or above their
/// lower bound, and unions their first variant that can be created without
/// re-entering a named node already under construction.
pub fn create(schema: &Schema, references: &[Schema]) -> Result<Value, CreateError> {
    visit(schema, &References::new(references))
}

pub(crate) fn visit<'a>(schema: &'a Schema, references: &References<'a>) -> Result<Value, CreateError> {
    build(schema, references, &mut Vec::new())
}

/// `active` holds the addresses of the named nodes being created.
fn build<'a>(
    schema: &'a Schema,
    references: &References<'a>,
    active: &mut Vec<usize>,
) -> Result<Value, CreateError> {
    let refs = references.extend(schema);
    if let Some(default) = schema.default_value() {
        return Ok(default.clone());
    }
    let Some(name) = schema.id() else {
        return kind(schema, &refs, active);
    };
    let address = schema as *const Schema as usize;
    if active.contains(&address) {
        return Err(CreateError::Recursive {
            name: name.to_string(),
        });
    }
    active.push(address);
    let value = kind(schema, &refs, active);
    active.pop();
    value
}

fn kind<'a>(
    schema: &'a Schema,
    refs: &References<'a>,
    active: &mut Vec<usize>,
) -> Result<Value, CreateError> {
    let value = match schema {
        Schema::Ref(_) | Schema::This(_) => {
            let target = dereference(schema, refs)?;
            build(target, refs, active)?
        }
        Schema::Any(_) | Schema::Unknown(_) => Value::empty_object(),
        Schema::Never(_) => return Err(CreateError::Never),
        Schema::Null(_) => Value::Null,
        Schema::Undefined(_) | Schema::Void(_) => Value::Undefined,
        Schema::Boolean(_) => Value::Bool(false),
        Schema::Number(s) => Value::Number(number(s, false)),
        Schema::Integer(s) => Value::Number(number(s, true)),
        Schema::BigInt(s) => Value::BigInt(bigint(s)),
        Schema::String(s) => {
            if s.pattern.is_some() {
                return Err(CreateError::RequiresDefault {
                    kind: "String",
                    constraint: "pattern",
                });
            }
            if s.format.is_some() {
                return Err(CreateError::RequiresDefault {
                    kind: "String",
                    constraint: "format",
                });
            }
            Value::String(".".repeat(s.min_length.unwrap_or(0)))
        }
        Schema::Symbol(_) => Value::Symbol(Symbol::new(None)),
        Schema::Literal(s) => s.value.to_value(),
        Schema::Uint8Array(s) => {
            Value::TypedArray(TypedArray::Uint8(vec![0; s.min_byte_length.unwrap_or(0)]))
        }
        Schema::Date(s) => Value::Date(Date::from_millis(stepped(
            [s.minimum_timestamp, s.exclusive_minimum_timestamp],
            [s.maximum_timestamp, s.exclusive_maximum_timestamp],
            Some(s.multiple_of_timestamp.filter(|m| *m > 0.0).unwrap_or(1.0)),
        ))),
        Schema::Array(s) => {
            let min = s.min_items.unwrap_or(0);
            if s.unique_items && min > 1 {
                return Err(CreateError::RequiresDefault {
                    kind: "Array",
                    constraint: "uniqueItems",
                });
            }
            let items = (0..min)
                .map(|_| build(&s.items, refs, active))
                .collect::<Result<_, _>>()?;
            Value::array(items)
        }
        Schema::Tuple(s) => Value::array(
            s.items
                .iter()
                .map(|item| build(item, refs, active))
                .collect::<Result<_, _>>()?,
        ),
        Schema::Object(s) => {
            let mut map = ObjectMap::with_capacity(s.required.len());
            for (key, property) in &s.properties {
                if s.is_required(key) {
                    map.insert(key.as_str().into(), build(&property.schema, refs, active)?);
                } else if let Some(default) = property.schema.default_value() {
                    map.insert(key.as_str().into(), default.clone());
                }
            }
            Value::object(map)
        }
        Schema::Record(_) => Value::empty_object(),
        Schema::Union(s) => union(s, refs, active)?,
        Schema::Intersect(s) => {
            let mut acc = Value::empty_object();
            for member in &s.members {
                let next = build(member, refs, active)?;
                acc = match (acc, next) {
                    (Value::Object(mut a), Value::Object(b)) => {
                        let merged = std::sync::Arc::make_mut(&mut a);
                        for (k, v) in b.iter() {
                            merged.insert(k.clone(), v.clone());
                        }
                        Value::Object(a)
                    }
                    (_, next) => next,
                };
            }
            if !check(schema, refs, &acc)? {
                return Err(CreateError::Intersect);
            }
            acc
        }
        Schema::Promise(s) => Value::promise(build(&s.item, refs, active)?),
        Schema::Function(s) => {
            let returns = build(&s.returns, refs, active)?;
            Value::Function(Function::new(s.params.len(), move |_| returns.clone()))
        }
        Schema::Constructor(s) => {
            let instance = build(&s.instance, refs, active)?;
            Value::Function(Function::constructor(s.params.len(), move |_| instance.clone()))
        }
    };
    Ok(value)
}

/// First variant that does not recurse into a node under construction. Any
/// other failure of that variant is returned as is.
fn union<'a>(
    s: &'a UnionSchema,
    refs: &References<'a>,
    active: &mut Vec<usize>,
) -> Result<Value, CreateError> {
    let mut recursive = None;
    for variant in &s.variants {
        match build(variant, refs, active) {
            Err(err @ CreateError::Recursive { .. }) => {
                recursive.get_or_insert(err);
            }
            created => return created,
        }
    }
    Err(recursive.unwrap_or(CreateError::EmptyUnion))
}

fn number(s: &NumberSchema, integer: bool) -> f64 {
    let step = s
        .multiple_of
        .filter(|m| *m > 0.0)
        .or(integer.then_some(1.0));
    stepped(
        [s.minimum, s.exclusive_minimum],
        [s.maximum, s.exclusive_maximum],
        step,
    )
}

/// Lowest multiple of `step` within `[minimum, exclusive_minimum]`, or zero
/// when unbounded below. If that passes `[maximum, exclusive_maximum]` the
/// highest multiple under them is used instead. Without a step, exclusive
/// bounds move by one.
fn stepped(lower: [Option<f64>; 2], upper: [Option<f64>; 2], step: Option<f64>) -> f64 {
    let up = |n: f64, strict: bool| match step {
        Some(m) => {
            let c = (n / m).ceil() * m;
            if strict && c <= n {
                c + m
            } else {
                c
            }
        }
        None if strict => n + 1.0,
        None => n,
    };
    let down = |n: f64, strict: bool| match step {
        Some(m) => {
            let c = (n / m).floor() * m;
            if strict && c >= n {
                c - m
            } else {
                c
            }
        }
        None if strict => n - 1.0,
        None => n,
    };
    let [minimum, exclusive_minimum] = lower;
    let [maximum, exclusive_maximum] = upper;
    let floor = [minimum.map(|m| up(m, false)), exclusive_minimum.map(|m| up(m, true))]
        .into_iter()
        .flatten()
        .reduce(f64::max)
        .unwrap_or(0.0);
    let ceiling = [maximum.map(|m| down(m, false)), exclusive_maximum.map(|m| down(m, true))]
        .into_iter()
        .flatten()
        .reduce(f64::min);
    let n = match ceiling {
        Some(c) if floor > c => c,
        _ => floor,
    };
    // Rounding can yield -0.
    n + 0.0
}

fn bigint(s: &BigIntSchema) -> i128 {
    let step = s.multiple_of.filter(|m| *m != 0).map_or(1, i128::abs);
    let up = |n: i128| n.saturating_add((step - n.rem_euclid(step)) % step);
    let down = |n: i128| n.saturating_sub(n.rem_euclid(step));
    let floor = [
        s.minimum.map(up),
        s.exclusive_minimum.map(|m| up(m.saturating_add(1))),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0);
    let ceiling = [
        s.maximum.map(down),
        s.exclusive_maximum.map(|m| down(m.saturating_sub(1))),
    ]
    .into_iter()
    .flatten()
    .min();
    match ceiling {
        Some(c) if floor > c => c,
        _ => floor,
    }
}
