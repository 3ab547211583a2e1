//! The `Value` enum and its supporting key, symbol and function types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::{Equivalent, IndexMap};

use crate::date::Date;
use crate::typed_array::TypedArray;

/// Ordered property storage of an object value.
pub type ObjectMap = IndexMap<PropertyKey, Value>;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique symbol. Two symbols are equal only if they were produced by the
/// same call to [`Symbol::new`], regardless of description.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(Arc::from),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "Symbol({d})"),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Key of an object property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKey {
    String(String),
    Symbol(Symbol),
}

// String keys hash exactly like `str` so that `KeyRef` lookups find them.
impl std::hash::Hash for PropertyKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::String(s) => s.as_str().hash(state),
            Self::Symbol(sym) => {
                state.write_u8(0xfe);
                sym.hash(state);
            }
        }
    }
}

/// Borrowed string key for allocation-free lookups in an [`ObjectMap`].
#[derive(Clone, Copy, Debug)]
pub struct KeyRef<'a>(pub &'a str);

impl std::hash::Hash for KeyRef<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Equivalent<PropertyKey> for KeyRef<'_> {
    fn equivalent(&self, key: &PropertyKey) -> bool {
        matches!(key, PropertyKey::String(s) if s == self.0)
    }
}

impl PropertyKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Symbol(_) => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(s: Symbol) -> Self {
        Self::Symbol(s)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Symbol(s) => write!(f, "{s:?}"),
        }
    }
}

/// Distinguishes plain callables from constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Constructor,
}

type Callable = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A callable value. Equality is identity of the underlying closure.
#[derive(Clone)]
pub struct Function {
    kind: FunctionKind,
    arity: usize,
    call: Arc<Callable>,
}

impl Function {
    pub fn new<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            kind: FunctionKind::Function,
            arity,
            call: Arc::new(f),
        }
    }

    pub fn constructor<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            kind: FunctionKind::Constructor,
            arity,
            call: Arc::new(f),
        }
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.call)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FunctionKind::Function => write!(f, "[Function/{}]", self.arity),
            FunctionKind::Constructor => write!(f, "[Constructor/{}]", self.arity),
        }
    }
}

/// A runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Date(Date),
    TypedArray(TypedArray),
    Array(Arc<Vec<Value>>),
    Object(Arc<ObjectMap>),
    Function(Function),
    /// A settled promise carrying its resolution.
    Promise(Arc<Value>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(Arc::new(items))
    }

    pub fn object(map: ObjectMap) -> Self {
        Self::Object(Arc::new(map))
    }

    pub fn empty_object() -> Self {
        Self::Object(Arc::new(ObjectMap::new()))
    }

    /// Builds an object from string-keyed entries, preserving order.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (PropertyKey::String(k.into()), v))
            .collect();
        Self::Object(Arc::new(map))
    }

    pub fn promise(resolved: Value) -> Self {
        Self::Promise(Arc::new(resolved))
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Date(_) => "Date",
            Self::TypedArray(t) => t.kind().name(),
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(f) => match f.kind() {
                FunctionKind::Function => "function",
                FunctionKind::Constructor => "constructor",
            },
            Self::Promise(_) => "Promise",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up a string-keyed property. Missing properties and non-objects
    /// yield `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(&KeyRef(key)))
    }

    /// Address of the shared allocation behind an array or object, if any.
    ///
    /// Two values with the same identity are the same instance reachable
    /// through different paths.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Array(a) => Some(Arc::as_ptr(a) as *const () as usize),
            Self::Object(o) => Some(Arc::as_ptr(o) as *const () as usize),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::equal::equal(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::array(items)
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Self::object(map)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Self::Date(d)
    }
}

impl From<TypedArray> for Value {
    fn from(t: TypedArray) -> Self {
        Self::TypedArray(t)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Self::Symbol(s)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}
