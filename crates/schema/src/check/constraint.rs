//! Per-kind constraint tests shared by the interpreter, the error iterator
//! and compiled routines. Each function reports violated constraints to a
//! [`Sink`]; a sink that saw no failure means the value passes.

use std::collections::HashMap;

use shapecheck_value::{equal, hash, FunctionKind, TypedArrayKind, Value};

use super::ValueErrorKind as K;
use crate::format::FormatRegistry;
use crate::schema::*;

/// Receiver of constraint violations.
pub(crate) trait Sink {
    /// Records a violation. `kind` is only evaluated by sinks that keep it.
    fn fail(&mut self, kind: impl FnOnce() -> K);

    /// True once further tests cannot change the outcome.
    fn settled(&self) -> bool;
}

impl Sink for Vec<K> {
    fn fail(&mut self, kind: impl FnOnce() -> K) {
        self.push(kind());
    }

    fn settled(&self) -> bool {
        false
    }
}

/// Sink for boolean checks. Keeps nothing but whether anything failed.
#[derive(Debug, Default)]
pub(crate) struct Failed(bool);

impl Sink for Failed {
    fn fail(&mut self, _: impl FnOnce() -> K) {
        self.0 = true;
    }

    fn settled(&self) -> bool {
        self.0
    }
}

/// Runs `test` against a [`Failed`] sink.
pub(crate) fn passes(test: impl FnOnce(&mut Failed)) -> bool {
    let mut out = Failed::default();
    test(&mut out);
    !out.0
}

/// Tests a non-composite kind. Composite kinds report nothing.
pub(crate) fn leaf(schema: &Schema, value: &Value, out: &mut impl Sink) {
    match schema {
        Schema::Any(_) | Schema::Unknown(_) => {}
        Schema::Never(_) => out.fail(|| K::Never),
        Schema::Null(_) => {
            if !value.is_null() {
                out.fail(|| K::Null)
            }
        }
        Schema::Undefined(_) => {
            if !value.is_undefined() {
                out.fail(|| K::Undefined)
            }
        }
        Schema::Void(_) => {
            if !value.is_undefined() {
                out.fail(|| K::Void)
            }
        }
        Schema::Boolean(_) => {
            if !matches!(value, Value::Bool(_)) {
                out.fail(|| K::Boolean)
            }
        }
        Schema::Number(s) => number(s, false, value, out),
        Schema::Integer(s) => number(s, true, value, out),
        Schema::BigInt(s) => bigint(s, value, out),
        Schema::String(s) => match value {
            Value::String(text) => string(s, text, out),
            _ => out.fail(|| K::String),
        },
        Schema::Symbol(_) => {
            if !matches!(value, Value::Symbol(_)) {
                out.fail(|| K::Symbol)
            }
        }
        Schema::Literal(s) => {
            if !s.value.matches(value) {
                out.fail(|| K::Literal(s.value.clone()))
            }
        }
        Schema::Uint8Array(s) => bytes(s, value, out),
        Schema::Date(s) => date(s, value, out),
        Schema::Promise(_) => {
            if !matches!(value, Value::Promise(_)) {
                out.fail(|| K::Promise)
            }
        }
        Schema::Function(_) => {
            if !matches!(value, Value::Function(f) if f.kind() == FunctionKind::Function) {
                out.fail(|| K::Function)
            }
        }
        Schema::Constructor(_) => {
            if !matches!(value, Value::Function(f) if f.kind() == FunctionKind::Constructor) {
                out.fail(|| K::Constructor)
            }
        }
        _ => {}
    }
}

pub(crate) fn number(s: &NumberSchema, integer: bool, value: &Value, out: &mut impl Sink) {
    let n = match value {
        Value::Number(n) if n.is_finite() => *n,
        _ => return out.fail(|| if integer { K::Integer } else { K::Number }),
    };
    if integer && n.fract() != 0.0 {
        return out.fail(|| K::Integer);
    }
    if let Some(m) = s.minimum {
        if n < m {
            out.fail(|| K::NumberMinimum(m));
        }
    }
    if let Some(m) = s.maximum {
        if n > m {
            out.fail(|| K::NumberMaximum(m));
        }
    }
    if let Some(m) = s.exclusive_minimum {
        if n <= m {
            out.fail(|| K::NumberExclusiveMinimum(m));
        }
    }
    if let Some(m) = s.exclusive_maximum {
        if n >= m {
            out.fail(|| K::NumberExclusiveMaximum(m));
        }
    }
    if let Some(m) = s.multiple_of {
        if n % m != 0.0 {
            out.fail(|| K::NumberMultipleOf(m));
        }
    }
}

pub(crate) fn bigint(s: &BigIntSchema, value: &Value, out: &mut impl Sink) {
    let Value::BigInt(n) = value else {
        return out.fail(|| K::BigInt);
    };
    let n = *n;
    if let Some(m) = s.minimum {
        if n < m {
            out.fail(|| K::BigIntMinimum(m));
        }
    }
    if let Some(m) = s.maximum {
        if n > m {
            out.fail(|| K::BigIntMaximum(m));
        }
    }
    if let Some(m) = s.exclusive_minimum {
        if n <= m {
            out.fail(|| K::BigIntExclusiveMinimum(m));
        }
    }
    if let Some(m) = s.exclusive_maximum {
        if n >= m {
            out.fail(|| K::BigIntExclusiveMaximum(m));
        }
    }
    if let Some(m) = s.multiple_of {
        if m != 0 && n % m != 0 {
            out.fail(|| K::BigIntMultipleOf(m));
        }
    }
}

pub(crate) fn string(s: &StringSchema, text: &str, out: &mut impl Sink) {
    if s.min_length.is_some() || s.max_length.is_some() {
        let len = text.chars().count();
        if let Some(m) = s.min_length {
            if len < m {
                out.fail(|| K::StringMinLength(m));
            }
        }
        if let Some(m) = s.max_length {
            if len > m {
                out.fail(|| K::StringMaxLength(m));
            }
        }
    }
    if out.settled() {
        return;
    }
    if let Some(re) = &s.pattern {
        if !re.is_match(text) {
            out.fail(|| K::StringPattern(re.as_str().to_string()));
        }
    }
    if out.settled() {
        return;
    }
    if let Some(name) = &s.format {
        match FormatRegistry::global().check(name, text) {
            Some(true) => {}
            Some(false) => out.fail(|| K::StringFormat(name.clone())),
            None => out.fail(|| K::StringFormatUnknown(name.clone())),
        }
    }
}

pub(crate) fn bytes(s: &BytesSchema, value: &Value, out: &mut impl Sink) {
    let len = match value {
        Value::TypedArray(t) if t.kind() == TypedArrayKind::Uint8 => t.len(),
        _ => return out.fail(|| K::Uint8Array),
    };
    if let Some(m) = s.min_byte_length {
        if len < m {
            out.fail(|| K::Uint8ArrayMinByteLength(m));
        }
    }
    if let Some(m) = s.max_byte_length {
        if len > m {
            out.fail(|| K::Uint8ArrayMaxByteLength(m));
        }
    }
}

pub(crate) fn date(s: &DateSchema, value: &Value, out: &mut impl Sink) {
    let Value::Date(d) = value else {
        return out.fail(|| K::Date);
    };
    if !d.is_valid() {
        return out.fail(|| K::DateInvalid);
    }
    let t = d.millis();
    if let Some(m) = s.minimum_timestamp {
        if t < m {
            out.fail(|| K::DateMinimumTimestamp(m));
        }
    }
    if let Some(m) = s.maximum_timestamp {
        if t > m {
            out.fail(|| K::DateMaximumTimestamp(m));
        }
    }
    if let Some(m) = s.exclusive_minimum_timestamp {
        if t <= m {
            out.fail(|| K::DateExclusiveMinimumTimestamp(m));
        }
    }
    if let Some(m) = s.exclusive_maximum_timestamp {
        if t >= m {
            out.fail(|| K::DateExclusiveMaximumTimestamp(m));
        }
    }
    if let Some(m) = s.multiple_of_timestamp {
        if t % m != 0.0 {
            out.fail(|| K::DateMultipleOfTimestamp(m));
        }
    }
}

/// Item-count and uniqueness constraints of an array. Element schemas are
/// tested by the caller.
pub(crate) fn array(s: &ArraySchema, items: &[Value], out: &mut impl Sink) {
    if let Some(m) = s.min_items {
        if items.len() < m {
            out.fail(|| K::ArrayMinItems(m));
        }
    }
    if let Some(m) = s.max_items {
        if items.len() > m {
            out.fail(|| K::ArrayMaxItems(m));
        }
    }
    if s.unique_items && !out.settled() && !all_unique(items) {
        out.fail(|| K::ArrayUniqueItems);
    }
}

pub(crate) fn property_count(s: &ObjectSchema, len: usize, out: &mut impl Sink) {
    if let Some(m) = s.min_properties {
        if len < m {
            out.fail(|| K::ObjectMinProperties(m));
        }
    }
    if let Some(m) = s.max_properties {
        if len > m {
            out.fail(|| K::ObjectMaxProperties(m));
        }
    }
}

/// True if no two items are structurally equal. Items are bucketed by
/// structural hash and only compared within a bucket.
pub(crate) fn all_unique(items: &[Value]) -> bool {
    let mut buckets: HashMap<u64, Vec<&Value>> = HashMap::with_capacity(items.len());
    for item in items {
        let bucket = buckets.entry(hash(item)).or_default();
        if bucket.iter().any(|seen| equal(seen, item)) {
            return false;
        }
        bucket.push(item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use shapecheck_value::{Date, TypedArray};

    fn violations(schema: &Schema, value: &Value) -> Vec<K> {
        let mut out: Vec<K> = Vec::new();
        leaf(schema, value, &mut out);
        out
    }

    #[test]
    fn integers_reject_fractions_and_non_finite() {
        assert!(violations(&Schema::integer(), &Value::from(3)).is_empty());
        assert_eq!(violations(&Schema::integer(), &Value::from(3.5)), vec![K::Integer]);
        assert_eq!(violations(&Schema::number(), &Value::from(f64::NAN)), vec![K::Number]);
    }

    #[test]
    fn number_bounds_accumulate() {
        let s = Schema::Number(NumberSchema {
            minimum: Some(10.0),
            multiple_of: Some(4.0),
            ..Default::default()
        });
        assert_eq!(
            violations(&s, &Value::from(3)),
            vec![K::NumberMinimum(10.0), K::NumberMultipleOf(4.0)]
        );
    }

    #[test]
    fn string_length_pattern_and_format() {
        let s = Schema::String(StringSchema {
            min_length: Some(2),
            pattern: Some(Regex::new("^[a-z]+$").unwrap()),
            format: Some("no-such-format".into()),
            ..Default::default()
        });
        assert_eq!(
            violations(&s, &Value::from("A")),
            vec![
                K::StringMinLength(2),
                K::StringPattern("^[a-z]+$".into()),
                K::StringFormatUnknown("no-such-format".into()),
            ]
        );
    }

    #[test]
    fn boolean_sink_never_builds_kinds() {
        let mut out = Failed::default();
        assert!(!out.settled());
        out.fail(|| unreachable!("boolean checks keep no kinds"));
        assert!(out.settled());
    }

    #[test]
    fn boolean_checks_agree_with_collected_kinds() {
        let s = StringSchema {
            min_length: Some(2),
            pattern: Some(Regex::new("^[a-z]+$").unwrap()),
            ..Default::default()
        };
        for (text, ok) in [("ab", true), ("a", false), ("AB", false), ("", false)] {
            let mut kinds: Vec<K> = Vec::new();
            string(&s, text, &mut kinds);
            assert_eq!(kinds.is_empty(), ok, "{text:?}");
            assert_eq!(passes(|out| string(&s, text, out)), ok, "{text:?}");
        }
    }

    #[test]
    fn void_accepts_only_undefined() {
        assert!(violations(&Schema::void(), &Value::Undefined).is_empty());
        assert_eq!(violations(&Schema::void(), &Value::Null), vec![K::Void]);
    }

    #[test]
    fn dates_must_be_valid() {
        assert!(violations(&Schema::date(), &Value::Date(Date::EPOCH)).is_empty());
        assert_eq!(violations(&Schema::date(), &Value::Date(Date::invalid())), vec![K::DateInvalid]);
    }

    #[test]
    fn byte_buffers_are_uint8_only() {
        let bytes = Value::TypedArray(TypedArray::Uint8(vec![1, 2]));
        let words = Value::TypedArray(TypedArray::Uint16(vec![1, 2]));
        assert!(violations(&Schema::uint8array(), &bytes).is_empty());
        assert_eq!(violations(&Schema::uint8array(), &words), vec![K::Uint8Array]);
    }

    #[test]
    fn uniqueness_uses_structural_equality() {
        let a = Value::from_entries([("x", Value::from(1))]);
        let b = Value::from_entries([("x", Value::from(1))]);
        assert!(!all_unique(&[a, b]));
        assert!(all_unique(&[Value::from(1), Value::from("1")]));
        assert!(!all_unique(&[Value::from(0.0), Value::from(-0.0)]));
    }
}
