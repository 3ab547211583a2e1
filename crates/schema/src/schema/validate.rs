//! Structural invariants of a schema tree.

use thiserror::Error;

use super::schema::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("required property `{0}` is not declared in properties")]
    RequiredNotDeclared(String),
    #[error("property `{0}` is required but carries an optional modifier")]
    OptionalRequired(String),
    #[error("record key cannot be of kind {0}")]
    InvalidRecordKey(&'static str),
    #[error("{kind} bounds are inverted: {detail}")]
    InvalidBounds { kind: &'static str, detail: String },
}

/// Verifies the invariants every engine operation relies on: object required
/// sets name declared, non-optional properties; record keys are string-like;
/// lower bounds do not exceed upper bounds.
///
/// Reference resolution is a separate concern, see
/// [`validate_references`](crate::validate_references).
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    match schema {
        Schema::Number(s) | Schema::Integer(s) => {
            bounds(schema.kind(), s.minimum, s.maximum)?;
            bounds(schema.kind(), s.exclusive_minimum, s.exclusive_maximum)
        }
        Schema::BigInt(s) => bounds(schema.kind(), s.minimum, s.maximum),
        Schema::String(s) => bounds(schema.kind(), s.min_length, s.max_length),
        Schema::Uint8Array(s) => bounds(schema.kind(), s.min_byte_length, s.max_byte_length),
        Schema::Date(s) => bounds(schema.kind(), s.minimum_timestamp, s.maximum_timestamp),
        Schema::Array(s) => {
            bounds(schema.kind(), s.min_items, s.max_items)?;
            validate_schema(&s.items)
        }
        Schema::Tuple(s) => s.items.iter().try_for_each(validate_schema),
        Schema::Object(s) => {
            bounds(schema.kind(), s.min_properties, s.max_properties)?;
            for key in &s.required {
                match s.properties.get(key) {
                    None => return Err(SchemaError::RequiredNotDeclared(key.clone())),
                    Some(p) if p.modifier.is_optional() => {
                        return Err(SchemaError::OptionalRequired(key.clone()))
                    }
                    Some(_) => {}
                }
            }
            for property in s.properties.values() {
                validate_schema(&property.schema)?;
            }
            match &s.additional_properties {
                AdditionalProperties::Schema(extra) => validate_schema(extra),
                _ => Ok(()),
            }
        }
        Schema::Record(s) => {
            record_key(&s.key)?;
            validate_schema(&s.key)?;
            validate_schema(&s.value)
        }
        Schema::Union(s) => s.variants.iter().try_for_each(validate_schema),
        Schema::Intersect(s) => s.members.iter().try_for_each(validate_schema),
        Schema::Promise(s) => validate_schema(&s.item),
        Schema::Function(s) => {
            s.params.iter().try_for_each(validate_schema)?;
            validate_schema(&s.returns)
        }
        Schema::Constructor(s) => {
            s.params.iter().try_for_each(validate_schema)?;
            validate_schema(&s.instance)
        }
        _ => Ok(()),
    }
}

fn record_key(key: &Schema) -> Result<(), SchemaError> {
    match key {
        Schema::String(_) | Schema::Number(_) | Schema::Integer(_) | Schema::Literal(_) => Ok(()),
        Schema::Union(u) => u.variants.iter().try_for_each(record_key),
        other => Err(SchemaError::InvalidRecordKey(other.kind())),
    }
}

fn bounds<T: PartialOrd + std::fmt::Display>(
    kind: &'static str,
    lower: Option<T>,
    upper: Option<T>,
) -> Result<(), SchemaError> {
    match (lower, upper) {
        (Some(lo), Some(hi)) if lo > hi => Err(SchemaError::InvalidBounds {
            kind,
            detail: format!("{lo} > {hi}"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    #[test]
    fn accepts_well_formed_tree() {
        let s = Schema::object([
            ("id", Property::new(Schema::integer())),
            ("tags", Property::optional(Schema::array(Schema::string()))),
            (
                "meta",
                Property::new(Schema::record(
                    Schema::union(vec![Schema::literal("a"), Schema::integer()]),
                    Schema::any(),
                )),
            ),
        ]);
        assert_eq!(validate_schema(&s), Ok(()));
    }

    #[test]
    fn rejects_undeclared_required() {
        let mut obj = ObjectSchema::new([("a", Property::new(Schema::number()))]);
        obj.required = IndexSet::from(["a".to_string(), "b".to_string()]);
        assert_eq!(
            validate_schema(&Schema::Object(obj)),
            Err(SchemaError::RequiredNotDeclared("b".into()))
        );
    }

    #[test]
    fn rejects_required_optional() {
        let mut obj = ObjectSchema::new([("a", Property::optional(Schema::number()))]);
        obj.required.insert("a".into());
        assert_eq!(
            validate_schema(&Schema::Object(obj)),
            Err(SchemaError::OptionalRequired("a".into()))
        );
    }

    #[test]
    fn rejects_bad_record_key() {
        let s = Schema::record(Schema::boolean(), Schema::any());
        assert_eq!(validate_schema(&s), Err(SchemaError::InvalidRecordKey("Boolean")));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let s = Schema::String(StringSchema {
            min_length: Some(4),
            max_length: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            validate_schema(&s),
            Err(SchemaError::InvalidBounds { kind: "String", .. })
        ));
    }
}
