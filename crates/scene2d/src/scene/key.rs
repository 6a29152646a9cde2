use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("no layer named \"{name}\" has been found")]
    LayerNotFound { name: String },
    #[error("no object with id \"{id}\" has been found")]
    ObjectNotFound { id: String },
    #[error("argument `{argument}` must be a {expected}, got {found}")]
    ArgumentType {
        argument: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// A lookup key as handed over by host/application code.
///
/// Layers and objects are addressed by string; any other kind of value is an
/// argument-type failure rather than a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key<'a> {
    Str(&'a str),
    Other { kind: &'static str },
}

impl<'a> Key<'a> {
    pub(crate) fn require_str(self, argument: &'static str) -> Result<&'a str, SceneError> {
        match self {
            Key::Str(value) => Ok(value),
            Key::Other { kind } => Err(SceneError::ArgumentType {
                argument,
                expected: "string",
                found: kind,
            }),
        }
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(value: &'a str) -> Self {
        Key::Str(value)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(value: &'a String) -> Self {
        Key::Str(value.as_str())
    }
}

impl From<i64> for Key<'static> {
    fn from(_: i64) -> Self {
        Key::Other { kind: "number" }
    }
}

impl From<u64> for Key<'static> {
    fn from(_: u64) -> Self {
        Key::Other { kind: "number" }
    }
}

impl From<f64> for Key<'static> {
    fn from(_: f64) -> Self {
        Key::Other { kind: "number" }
    }
}

impl From<bool> for Key<'static> {
    fn from(_: bool) -> Self {
        Key::Other { kind: "boolean" }
    }
}

impl<'a> From<&'a Value> for Key<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Key::Str(text.as_str()),
            other => Key::Other {
                kind: json_kind(other),
            },
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
