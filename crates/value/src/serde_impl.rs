//! Bridge between [`Value`] and serde / `serde_json`.
//!
//! Serialization is JSON-shaped: `undefined` becomes `null`, dates become
//! RFC 3339 strings and typed arrays become number sequences. Symbols,
//! functions, promises and symbol-keyed properties have no serialized form and
//! fail.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::{ObjectMap, PropertyKey, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::BigInt(b) => serializer.serialize_i128(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => match d.to_iso_string() {
                Some(s) => serializer.serialize_str(&s),
                None => serializer.serialize_unit(),
            },
            Value::TypedArray(t) => {
                let elements = t.elements();
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for e in &elements {
                    seq.serialize_element(e)?;
                }
                seq.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, val) in map.iter() {
                    match key {
                        PropertyKey::String(k) => out.serialize_entry(k, val)?,
                        PropertyKey::Symbol(_) => {
                            return Err(S::Error::custom("symbol keys cannot be serialized"))
                        }
                    }
                }
                out.end()
            }
            Value::Symbol(_) | Value::Function(_) | Value::Promise(_) => Err(S::Error::custom(
                format!("{} values cannot be serialized", self.type_name()),
            )),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_i128<E: de::Error>(self, n: i128) -> Result<Value, E> {
        Ok(Value::BigInt(n))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Number(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = ObjectMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, val)) = access.next_entry::<String, Value>()? {
            map.insert(PropertyKey::String(key), val);
        }
        Ok(Value::object(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::object(
                obj.into_iter()
                    .map(|(k, v)| (PropertyKey::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Converts to a `serde_json::Value`, failing for unrepresentable values.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Date;
    use crate::value::Symbol;
    use serde_json::json;

    #[test]
    fn from_json_preserves_key_order() {
        let v = Value::from(json!({"z": 1, "a": 2}));
        let keys: Vec<String> = v.as_object().unwrap().keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn integers_serialize_without_fraction() {
        let v = Value::from(json!({"a": [1, 2.5]}));
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"a":[1,2.5]}"#);
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let v = Value::Date(Date::EPOCH);
        assert_eq!(v.to_json().unwrap(), json!("1970-01-01T00:00:00.000Z"));
    }

    #[test]
    fn symbols_do_not_serialize() {
        assert!(Value::Symbol(Symbol::new(None)).to_json().is_err());
    }

    #[test]
    fn deserialize_round_trip() {
        let v: Value = serde_json::from_str(r#"{"a":[true,null,"s"]}"#).unwrap();
        assert_eq!(v, Value::from(json!({"a": [true, null, "s"]})));
    }
}
