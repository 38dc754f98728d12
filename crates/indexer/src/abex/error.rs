use serde_json::Value;
use thiserror::Error;

/// Failure to decode an envelope, type tag or vault object.
///
/// Variants that concern payload contents carry the offending JSON node so the
/// caller can log exactly what the chain sent.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed type tag '{tag}': {reason}")]
    MalformedTypeTag { tag: String, reason: &'static str },

    #[error("Type tag '{tag}' has {found} generic parameters, expected at least {expected}")]
    MissingTypeParam {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("Missing field '{field}' in {node}")]
    MissingField { field: &'static str, node: Value },

    #[error("Invalid integer literal {node}")]
    InvalidInteger { node: Value },

    #[error("Expected {expected}, got {node}")]
    UnexpectedShape { expected: &'static str, node: Value },
}

impl DecodeError {
    pub(crate) fn missing(field: &'static str, node: &Value) -> Self {
        DecodeError::MissingField {
            field,
            node: node.clone(),
        }
    }
}
