use serde::{Deserialize, Serialize};
use shapecheck_value::Value;

/// One step of an edit script.
///
/// Serializes as `{"type": "insert" | "update" | "delete", "path": "...",
/// "value": ...}`; deletes carry no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Edit {
    Insert { path: String, value: Value },
    Update { path: String, value: Value },
    Delete { path: String },
}

impl Edit {
    pub fn insert(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Insert {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn update(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Update {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::Delete { path: path.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Insert { path, .. } | Self::Update { path, .. } | Self::Delete { path } => path,
        }
    }

    /// The value written by an insert or update.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Insert { value, .. } | Self::Update { value, .. } => Some(value),
            Self::Delete { .. } => None,
        }
    }
}
