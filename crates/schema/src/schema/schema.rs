use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use shapecheck_value::Value;

/// Boxed error returned by transform hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

type Hook = dyn Fn(Value) -> Result<Value, HookError> + Send + Sync;

/// A pair of caller-supplied conversion hooks attached to a schema node.
///
/// `decode` maps a value that conforms to the schema into its runtime
/// representation; `encode` maps it back.
#[derive(Clone)]
pub struct Transform {
    pub(crate) decode: Arc<Hook>,
    pub(crate) encode: Arc<Hook>,
}

impl Transform {
    pub fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(Value) -> Result<Value, HookError> + Send + Sync + 'static,
        E: Fn(Value) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform")
    }
}

/// Fields common to all schema nodes.
#[derive(Debug, Clone, Default)]
pub struct SchemaBase {
    /// Identity name used to resolve `Ref` and `This` nodes.
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub examples: Vec<Value>,
    pub transform: Option<Transform>,
}

/// A node with no kind-specific fields.
#[derive(Debug, Clone, Default)]
pub struct BasicSchema {
    pub base: SchemaBase,
}

/// Number or Integer constraints.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub base: SchemaBase,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct BigIntSchema {
    pub base: SchemaBase,
    pub minimum: Option<i128>,
    pub maximum: Option<i128>,
    pub exclusive_minimum: Option<i128>,
    pub exclusive_maximum: Option<i128>,
    pub multiple_of: Option<i128>,
}

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub base: SchemaBase,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    /// Name of a format registered in the [`FormatRegistry`](crate::FormatRegistry).
    pub format: Option<String>,
}

/// The constant of a Literal node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(*n),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Returns true if `value` is exactly this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(a), Value::String(b)) => a == b,
            (Self::Number(a), Value::Number(b)) => a == b,
            (Self::Boolean(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

#[derive(Debug, Clone)]
pub struct LiteralSchema {
    pub base: SchemaBase,
    pub value: LiteralValue,
}

/// A byte buffer (`Uint8Array`).
#[derive(Debug, Clone, Default)]
pub struct BytesSchema {
    pub base: SchemaBase,
    pub min_byte_length: Option<usize>,
    pub max_byte_length: Option<usize>,
}

/// Timestamp bounds are epoch milliseconds.
#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    pub base: SchemaBase,
    pub minimum_timestamp: Option<f64>,
    pub maximum_timestamp: Option<f64>,
    pub exclusive_minimum_timestamp: Option<f64>,
    pub exclusive_maximum_timestamp: Option<f64>,
    pub multiple_of_timestamp: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub base: SchemaBase,
    pub items: Box<Schema>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TupleSchema {
    pub base: SchemaBase,
    pub items: Vec<Schema>,
}

/// Property modifier. Only meaningful on object property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    Optional,
    Readonly,
    ReadonlyOptional,
}

impl Modifier {
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ReadonlyOptional)
    }

    pub fn is_readonly(self) -> bool {
        matches!(self, Self::Readonly | Self::ReadonlyOptional)
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub schema: Schema,
    pub modifier: Modifier,
}

/// Policy for keys not named in an object's properties.
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    /// Unknown keys fail validation.
    #[default]
    Forbid,
    /// Unknown keys are accepted with any value.
    Allow,
    /// Unknown keys are accepted if their values match.
    Schema(Box<Schema>),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub base: SchemaBase,
    pub properties: IndexMap<String, Property>,
    pub required: IndexSet<String>,
    pub additional_properties: AdditionalProperties,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

impl ObjectSchema {
    pub fn is_required(&self, key: &str) -> bool {
        self.required.contains(key)
    }
}

/// A map keyed by strings matching `key`.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub base: SchemaBase,
    pub key: Box<Schema>,
    pub value: Box<Schema>,
}

#[derive(Debug, Clone, Default)]
pub struct UnionSchema {
    pub base: SchemaBase,
    pub variants: Vec<Schema>,
}

#[derive(Debug, Clone, Default)]
pub struct IntersectSchema {
    pub base: SchemaBase,
    pub members: Vec<Schema>,
}

#[derive(Debug, Clone)]
pub struct PromiseSchema {
    pub base: SchemaBase,
    pub item: Box<Schema>,
}

#[derive(Debug, Clone)]
pub struct FunctionSchema {
    pub base: SchemaBase,
    pub params: Vec<Schema>,
    pub returns: Box<Schema>,
}

#[derive(Debug, Clone)]
pub struct ConstructorSchema {
    pub base: SchemaBase,
    pub params: Vec<Schema>,
    pub instance: Box<Schema>,
}

/// Symbolic reference to a node carrying the given identity name.
#[derive(Debug, Clone)]
pub struct RefSchema {
    pub base: SchemaBase,
    pub name: String,
}

/// The schema node: a closed, tagged union over every supported kind.
#[derive(Debug, Clone)]
pub enum Schema {
    Any(BasicSchema),
    Unknown(BasicSchema),
    Never(BasicSchema),
    Null(BasicSchema),
    Undefined(BasicSchema),
    Void(BasicSchema),
    Boolean(BasicSchema),
    Number(NumberSchema),
    Integer(NumberSchema),
    BigInt(BigIntSchema),
    String(StringSchema),
    Symbol(BasicSchema),
    Literal(LiteralSchema),
    Uint8Array(BytesSchema),
    Date(DateSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Object(ObjectSchema),
    Record(RecordSchema),
    Union(UnionSchema),
    Intersect(IntersectSchema),
    Promise(PromiseSchema),
    Function(FunctionSchema),
    Constructor(ConstructorSchema),
    Ref(RefSchema),
    /// Self-reference to an enclosing named node.
    This(RefSchema),
}

impl Schema {
    /// Returns the kind name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any(_) => "Any",
            Self::Unknown(_) => "Unknown",
            Self::Never(_) => "Never",
            Self::Null(_) => "Null",
            Self::Undefined(_) => "Undefined",
            Self::Void(_) => "Void",
            Self::Boolean(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::Integer(_) => "Integer",
            Self::BigInt(_) => "BigInt",
            Self::String(_) => "String",
            Self::Symbol(_) => "Symbol",
            Self::Literal(_) => "Literal",
            Self::Uint8Array(_) => "Uint8Array",
            Self::Date(_) => "Date",
            Self::Array(_) => "Array",
            Self::Tuple(_) => "Tuple",
            Self::Object(_) => "Object",
            Self::Record(_) => "Record",
            Self::Union(_) => "Union",
            Self::Intersect(_) => "Intersect",
            Self::Promise(_) => "Promise",
            Self::Function(_) => "Function",
            Self::Constructor(_) => "Constructor",
            Self::Ref(_) => "Ref",
            Self::This(_) => "This",
        }
    }

    pub fn base(&self) -> &SchemaBase {
        match self {
            Self::Any(s)
            | Self::Unknown(s)
            | Self::Never(s)
            | Self::Null(s)
            | Self::Undefined(s)
            | Self::Void(s)
            | Self::Boolean(s)
            | Self::Symbol(s) => &s.base,
            Self::Number(s) | Self::Integer(s) => &s.base,
            Self::BigInt(s) => &s.base,
            Self::String(s) => &s.base,
            Self::Literal(s) => &s.base,
            Self::Uint8Array(s) => &s.base,
            Self::Date(s) => &s.base,
            Self::Array(s) => &s.base,
            Self::Tuple(s) => &s.base,
            Self::Object(s) => &s.base,
            Self::Record(s) => &s.base,
            Self::Union(s) => &s.base,
            Self::Intersect(s) => &s.base,
            Self::Promise(s) => &s.base,
            Self::Function(s) => &s.base,
            Self::Constructor(s) => &s.base,
            Self::Ref(s) | Self::This(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SchemaBase {
        match self {
            Self::Any(s)
            | Self::Unknown(s)
            | Self::Never(s)
            | Self::Null(s)
            | Self::Undefined(s)
            | Self::Void(s)
            | Self::Boolean(s)
            | Self::Symbol(s) => &mut s.base,
            Self::Number(s) | Self::Integer(s) => &mut s.base,
            Self::BigInt(s) => &mut s.base,
            Self::String(s) => &mut s.base,
            Self::Literal(s) => &mut s.base,
            Self::Uint8Array(s) => &mut s.base,
            Self::Date(s) => &mut s.base,
            Self::Array(s) => &mut s.base,
            Self::Tuple(s) => &mut s.base,
            Self::Object(s) => &mut s.base,
            Self::Record(s) => &mut s.base,
            Self::Union(s) => &mut s.base,
            Self::Intersect(s) => &mut s.base,
            Self::Promise(s) => &mut s.base,
            Self::Function(s) => &mut s.base,
            Self::Constructor(s) => &mut s.base,
            Self::Ref(s) | Self::This(s) => &mut s.base,
        }
    }

    /// The identity name (`$id`) of this node, if any.
    pub fn id(&self) -> Option<&str> {
        self.base().id.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.base().default.as_ref()
    }

    /// True for `Ref` and `This` nodes.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::This(_))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}<{id}>", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}
