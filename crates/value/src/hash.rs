//! FNV-1a 64-bit structural hash.
//!
//! Values that are [`equal`](crate::equal) always hash to the same value, so
//! the hash can bucket candidates before an exact comparison. Object entries
//! are combined order-independently to match key-order-insensitive equality.

use crate::value::{PropertyKey, Value};

const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Clone, Copy)]
#[repr(u8)]
enum Marker {
    Undefined = 1,
    Null,
    Bool,
    Number,
    BigInt,
    String,
    Symbol,
    Date,
    TypedArray,
    Array,
    Object,
    Function,
    Promise,
}

struct Fnv(u64);

impl Fnv {
    fn new() -> Self {
        Self(OFFSET)
    }

    fn byte(&mut self, b: u8) {
        self.0 ^= b as u64;
        self.0 = self.0.wrapping_mul(PRIME);
    }

    fn bytes(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.byte(*b);
        }
    }

    fn marker(&mut self, m: Marker) {
        self.byte(m as u8);
    }

    fn number(&mut self, n: f64) {
        // 0 and -0 are equal, so they must hash alike.
        let n = if n == 0.0 { 0.0 } else { n };
        self.bytes(&n.to_le_bytes());
    }
}

/// Computes the structural hash of a value.
pub fn hash(value: &Value) -> u64 {
    let mut h = Fnv::new();
    visit(&mut h, value);
    h.0
}

fn visit(h: &mut Fnv, value: &Value) {
    match value {
        Value::Undefined => h.marker(Marker::Undefined),
        Value::Null => h.marker(Marker::Null),
        Value::Bool(b) => {
            h.marker(Marker::Bool);
            h.byte(*b as u8);
        }
        Value::Number(n) => {
            h.marker(Marker::Number);
            h.number(*n);
        }
        Value::BigInt(b) => {
            h.marker(Marker::BigInt);
            h.bytes(&b.to_le_bytes());
        }
        Value::String(s) => {
            h.marker(Marker::String);
            h.bytes(s.as_bytes());
        }
        Value::Symbol(s) => {
            h.marker(Marker::Symbol);
            h.bytes(&s.id().to_le_bytes());
        }
        Value::Date(d) => {
            h.marker(Marker::Date);
            h.number(d.millis());
        }
        Value::TypedArray(t) => {
            h.marker(Marker::TypedArray);
            h.bytes(t.kind().name().as_bytes());
            for e in t.elements() {
                visit(h, &e);
            }
        }
        Value::Array(items) => {
            h.marker(Marker::Array);
            for item in items.iter() {
                visit(h, item);
            }
        }
        Value::Object(map) => {
            h.marker(Marker::Object);
            let mut acc: u64 = 0;
            for (key, val) in map.iter() {
                let mut entry = Fnv::new();
                match key {
                    PropertyKey::String(s) => entry.bytes(s.as_bytes()),
                    PropertyKey::Symbol(s) => {
                        entry.marker(Marker::Symbol);
                        entry.bytes(&s.id().to_le_bytes());
                    }
                }
                visit(&mut entry, val);
                acc = acc.wrapping_add(entry.0);
            }
            h.bytes(&acc.to_le_bytes());
        }
        Value::Function(_) => h.marker(Marker::Function),
        Value::Promise(_) => h.marker(Marker::Promise),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_hash_alike() {
        let a = Value::from_entries([("a", Value::from(1)), ("b", Value::from("x"))]);
        let b = Value::from_entries([("b", Value::from("x")), ("a", Value::from(1))]);
        assert_eq!(hash(&a), hash(&b));
        assert_eq!(hash(&Value::Number(0.0)), hash(&Value::Number(-0.0)));
    }

    #[test]
    fn distinct_types_hash_apart() {
        assert_ne!(hash(&Value::Null), hash(&Value::Undefined));
        assert_ne!(hash(&Value::from(1)), hash(&Value::from("1")));
        assert_ne!(
            hash(&Value::from(vec![Value::from(1), Value::from(2)])),
            hash(&Value::from(vec![Value::from(2), Value::from(1)]))
        );
    }
}
