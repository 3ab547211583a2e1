use std::fmt;

use shapecheck_value::Value;

use crate::schema::LiteralValue;

/// What a single validation failure is about.
///
/// Kinds carry the constraint they were tested against, so the boolean check
/// path can collect them without formatting any text.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueErrorKind {
    Array,
    ArrayMinItems(usize),
    ArrayMaxItems(usize),
    ArrayUniqueItems,
    BigInt,
    BigIntMinimum(i128),
    BigIntMaximum(i128),
    BigIntExclusiveMinimum(i128),
    BigIntExclusiveMaximum(i128),
    BigIntMultipleOf(i128),
    Boolean,
    Constructor,
    Date,
    DateInvalid,
    DateMinimumTimestamp(f64),
    DateMaximumTimestamp(f64),
    DateExclusiveMinimumTimestamp(f64),
    DateExclusiveMaximumTimestamp(f64),
    DateMultipleOfTimestamp(f64),
    Function,
    Integer,
    Literal(LiteralValue),
    Never,
    Null,
    Number,
    NumberMinimum(f64),
    NumberMaximum(f64),
    NumberExclusiveMinimum(f64),
    NumberExclusiveMaximum(f64),
    NumberMultipleOf(f64),
    Object,
    ObjectMinProperties(usize),
    ObjectMaxProperties(usize),
    ObjectRequiredProperty,
    ObjectAdditionalProperty,
    Promise,
    RecordKey,
    String,
    StringMinLength(usize),
    StringMaxLength(usize),
    StringPattern(String),
    StringFormat(String),
    StringFormatUnknown(String),
    Symbol,
    Tuple,
    TupleLength(usize),
    Uint8Array,
    Uint8ArrayMinByteLength(usize),
    Uint8ArrayMaxByteLength(usize),
    Undefined,
    Union,
    Void,
    /// A reference that could not be resolved while iterating errors.
    Dereference(String),
}

impl ValueErrorKind {
    /// Human readable description of the failure.
    pub fn message(&self) -> String {
        match self {
            Self::Array => "Expected array".into(),
            Self::ArrayMinItems(n) => format!("Expected array length to be greater or equal to {n}"),
            Self::ArrayMaxItems(n) => format!("Expected array length to be less or equal to {n}"),
            Self::ArrayUniqueItems => "Expected array elements to be unique".into(),
            Self::BigInt => "Expected bigint".into(),
            Self::BigIntMinimum(n) => format!("Expected bigint to be greater or equal to {n}"),
            Self::BigIntMaximum(n) => format!("Expected bigint to be less or equal to {n}"),
            Self::BigIntExclusiveMinimum(n) => format!("Expected bigint to be greater than {n}"),
            Self::BigIntExclusiveMaximum(n) => format!("Expected bigint to be less than {n}"),
            Self::BigIntMultipleOf(n) => format!("Expected bigint to be a multiple of {n}"),
            Self::Boolean => "Expected boolean".into(),
            Self::Constructor => "Expected constructor".into(),
            Self::Date => "Expected Date".into(),
            Self::DateInvalid => "Invalid Date".into(),
            Self::DateMinimumTimestamp(n) => {
                format!("Expected Date timestamp to be greater or equal to {n}")
            }
            Self::DateMaximumTimestamp(n) => {
                format!("Expected Date timestamp to be less or equal to {n}")
            }
            Self::DateExclusiveMinimumTimestamp(n) => {
                format!("Expected Date timestamp to be greater than {n}")
            }
            Self::DateExclusiveMaximumTimestamp(n) => {
                format!("Expected Date timestamp to be less than {n}")
            }
            Self::DateMultipleOfTimestamp(n) => {
                format!("Expected Date timestamp to be a multiple of {n}")
            }
            Self::Function => "Expected function".into(),
            Self::Integer => "Expected integer".into(),
            Self::Literal(v) => format!("Expected {v}"),
            Self::Never => "Never".into(),
            Self::Null => "Expected null".into(),
            Self::Number => "Expected number".into(),
            Self::NumberMinimum(n) => format!("Expected number to be greater or equal to {n}"),
            Self::NumberMaximum(n) => format!("Expected number to be less or equal to {n}"),
            Self::NumberExclusiveMinimum(n) => format!("Expected number to be greater than {n}"),
            Self::NumberExclusiveMaximum(n) => format!("Expected number to be less than {n}"),
            Self::NumberMultipleOf(n) => format!("Expected number to be a multiple of {n}"),
            Self::Object => "Expected object".into(),
            Self::ObjectMinProperties(n) => format!("Expected object to have at least {n} properties"),
            Self::ObjectMaxProperties(n) => {
                format!("Expected object to have no more than {n} properties")
            }
            Self::ObjectRequiredProperty => "Expected required property".into(),
            Self::ObjectAdditionalProperty => "Unexpected property".into(),
            Self::Promise => "Expected Promise".into(),
            Self::RecordKey => "Expected record key to match key pattern".into(),
            Self::String => "Expected string".into(),
            Self::StringMinLength(n) => {
                format!("Expected string length greater or equal to {n}")
            }
            Self::StringMaxLength(n) => format!("Expected string length less or equal to {n}"),
            Self::StringPattern(p) => format!("Expected string to match '{p}'"),
            Self::StringFormat(f) => format!("Expected string to match '{f}' format"),
            Self::StringFormatUnknown(f) => format!("Unknown format '{f}'"),
            Self::Symbol => "Expected symbol".into(),
            Self::Tuple => "Expected tuple".into(),
            Self::TupleLength(n) => format!("Expected tuple to have {n} elements"),
            Self::Uint8Array => "Expected Uint8Array".into(),
            Self::Uint8ArrayMinByteLength(n) => {
                format!("Expected byte length greater or equal to {n}")
            }
            Self::Uint8ArrayMaxByteLength(n) => format!("Expected byte length less or equal to {n}"),
            Self::Undefined => "Expected undefined".into(),
            Self::Union => "Expected union value".into(),
            Self::Void => "Expected void".into(),
            Self::Dereference(name) => format!("Unable to dereference schema with $id '{name}'"),
        }
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueErrorRecord {
    pub kind: ValueErrorKind,
    /// Pointer to the offending value, `""` for the root.
    pub path: String,
    pub message: String,
    /// The schema kind the value was checked against.
    pub expected: String,
    pub actual: Value,
}

impl ValueErrorRecord {
    pub(crate) fn new(kind: ValueErrorKind, path: String, expected: String, actual: Value) -> Self {
        Self {
            message: kind.message(),
            kind,
            path,
            expected,
            actual,
        }
    }
}

impl fmt::Display for ValueErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
