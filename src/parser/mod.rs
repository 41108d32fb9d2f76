//! Front-ends turning schema source text into a [`NormalizedPayload`].

#[cfg(not(target_arch = "wasm32"))]
mod node;

#[cfg(not(target_arch = "wasm32"))]
pub use node::NodeDbmlParser;

use std::path::PathBuf;

use serde_json::Value;

use crate::normalizer::{NormalizeError, normalize};
use crate::payload::NormalizedPayload;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parser script not found: {}", .0.display())]
    ScriptMissing(PathBuf),
    #[error("node executable `{0}` not found")]
    NodeNotFound(String),
    #[error("failed to start parser: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("parser timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("{0}")]
    Failed(String),
    #[error("parser output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected parser output: {0}")]
    UnexpectedPayload(String),
}

impl From<NormalizeError> for ParseError {
    fn from(err: NormalizeError) -> Self {
        ParseError::UnexpectedPayload(err.to_string())
    }
}

/// Parse DBML (or a pre-parsed export of it).
pub trait DbmlParser {
    fn parse(&self, source: &str) -> Result<NormalizedPayload, ParseError>;
}

/// Reads JSON holding either a raw database export or a normalized payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadParser;

impl DbmlParser for JsonPayloadParser {
    fn parse(&self, source: &str) -> Result<NormalizedPayload, ParseError> {
        decode_payload(source)
    }
}

/// Decode parser output. A `schemas` key marks a raw export, which goes
/// through the normalizer; `tables` marks an already-normalized payload.
pub fn decode_payload(text: &str) -> Result<NormalizedPayload, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let Some(root) = value.as_object() else {
        return Err(NormalizeError::NotAnObject.into());
    };

    if root.contains_key("schemas") {
        Ok(normalize(&value)?)
    } else if root.contains_key("tables") {
        Ok(serde_json::from_value(value)?)
    } else {
        Err(ParseError::UnexpectedPayload(
            "expected `schemas` or `tables` at the top level".to_string(),
        ))
    }
}
