//! Record key patterns.

use once_cell::sync::Lazy;
use regex::Regex;

use super::constraint;
use crate::schema::{LiteralValue, Schema, StringSchema};

static INTEGER_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap());
static NUMBER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?$").unwrap());

/// Owned matcher for the key pattern of a `Record`.
#[derive(Debug, Clone)]
pub(crate) enum KeyMatcher {
    String(StringSchema),
    Integer,
    Number,
    Literal(String),
    Any(Vec<KeyMatcher>),
}

impl KeyMatcher {
    /// Builds a matcher, or returns the kind of an unsupported key schema.
    pub(crate) fn new(schema: &Schema) -> Result<Self, &'static str> {
        match schema {
            Schema::String(s) => Ok(Self::String(s.clone())),
            Schema::Integer(_) => Ok(Self::Integer),
            Schema::Number(_) => Ok(Self::Number),
            Schema::Literal(l) => Ok(Self::Literal(literal_key(&l.value))),
            Schema::Union(u) => u
                .variants
                .iter()
                .map(Self::new)
                .collect::<Result<_, _>>()
                .map(Self::Any),
            other => Err(other.kind()),
        }
    }

    pub(crate) fn matches(&self, key: &str) -> bool {
        match self {
            Self::String(s) => constraint::passes(|out| constraint::string(s, key, out)),
            Self::Integer => INTEGER_KEY.is_match(key),
            Self::Number => NUMBER_KEY.is_match(key),
            Self::Literal(lit) => lit == key,
            Self::Any(all) => all.iter().any(|m| m.matches(key)),
        }
    }

    /// Key pattern as rendered in compiled listings.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::String(_) => "string".into(),
            Self::Integer => "integer".into(),
            Self::Number => "number".into(),
            Self::Literal(lit) => format!("{lit:?}"),
            Self::Any(all) => all.iter().map(Self::describe).collect::<Vec<_>>().join("|"),
        }
    }
}

/// The property-key spelling of a literal.
pub(crate) fn literal_key(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => s.clone(),
        LiteralValue::Number(n) => number_key(*n),
        LiteralValue::Boolean(b) => b.to_string(),
    }
}

/// Renders a number the way it is spelled as a property key: integral values
/// without a fraction.
pub(crate) fn number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        n.to_string()
    }
}
