//! Collapses transport-shaped tool output into a single JSON value.

use super::result::{ContentBlock, RawToolResult};
use crate::domain::EntityKey;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use utoipa::ToSchema;

const PREVIEW_LIMIT: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    Structured,
    Parsed,
    Text,
    TextSequence,
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    pub entity: EntityKey,
    pub operation: String,
    pub used_fallback: bool,
    pub shape: ResultShape,
    pub value: Value,
}

impl NormalizedResult {
    /// Row list carried by the value, looking through common wrapper keys.
    pub fn rows(&self) -> Vec<&Value> {
        fn find(value: &Value) -> Option<&Vec<Value>> {
            match value {
                Value::Array(items) => Some(items),
                Value::Object(map) => ["rows", "items", "data", "results", "records"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(find))
                    .or_else(|| {
                        let mut arrays = map.values().filter_map(Value::as_array);
                        match (arrays.next(), arrays.next()) {
                            (Some(only), None) => Some(only),
                            _ => None,
                        }
                    }),
                _ => None,
            }
        }
        find(&self.value)
            .map(|items| items.iter().collect())
            .unwrap_or_default()
    }
}

/// Applies the shape rules in priority order. Never fails: output that
/// cannot be interpreted is reported as a diagnostic object.
pub fn normalize(entity: &EntityKey, operation: &str, raw: RawToolResult) -> NormalizedResult {
    let (shape, value) = match raw {
        RawToolResult::Structured(value) => (ResultShape::Structured, value),
        RawToolResult::Blocks(blocks) => from_blocks(entity, operation, blocks),
        RawToolResult::Blob(bytes) => {
            warn!(
                entity = %entity,
                operation,
                bytes = bytes.len(),
                "tool returned an opaque payload"
            );
            (
                ResultShape::Diagnostic,
                diagnostic("tool returned an opaque payload", "blob", &bytes),
            )
        }
    };
    debug!(entity = %entity, operation, shape = ?shape, "normalized tool result");
    NormalizedResult {
        entity: entity.clone(),
        operation: operation.to_string(),
        used_fallback: false,
        shape,
        value,
    }
}

fn from_blocks(
    entity: &EntityKey,
    operation: &str,
    blocks: Vec<ContentBlock>,
) -> (ResultShape, Value) {
    let mut texts = Vec::new();
    let mut structured = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Text(text) => texts.push(text),
            ContentBlock::Structured(value) => structured.push(value),
        }
    }

    match texts.len() {
        0 => {}
        1 => {
            let text = texts.remove(0);
            return match serde_json::from_str::<Value>(&text) {
                Ok(parsed) => (ResultShape::Parsed, parsed),
                Err(err) => {
                    debug!(entity = %entity, operation, %err, "text block is not JSON, keeping raw text");
                    (ResultShape::Text, Value::String(text))
                }
            };
        }
        _ => {
            let sequence = texts.into_iter().map(Value::String).collect();
            return (ResultShape::TextSequence, Value::Array(sequence));
        }
    }

    match structured.len() {
        0 => {
            warn!(entity = %entity, operation, "tool returned no content");
            (
                ResultShape::Diagnostic,
                diagnostic("tool returned no content", "empty", &[]),
            )
        }
        1 => (ResultShape::Structured, structured.remove(0)),
        _ => (ResultShape::Structured, Value::Array(structured)),
    }
}

fn diagnostic(message: &str, kind: &str, bytes: &[u8]) -> Value {
    let preview: String = String::from_utf8_lossy(bytes)
        .chars()
        .take(PREVIEW_LIMIT)
        .collect();
    json!({
        "diagnostic": message,
        "kind": kind,
        "bytes": bytes.len(),
        "preview": preview,
    })
}
