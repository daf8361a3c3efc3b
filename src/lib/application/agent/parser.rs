use super::directive::Directive;
use crate::domain::{EntityKey, Filters, Intent};
use serde_json::{Map, Value};
use tracing::warn;

const TEXT_FIELDS: [&str; 5] = ["response", "answer", "message", "text", "content"];

/// Turns raw completion output into a [`Directive`].
///
/// Never fails: output that is not a usable directive degrades to a final
/// answer carrying the most useful text found in it.
pub fn classify_response(content: &str, current: &Intent) -> Directive {
    match extract_json(content) {
        Some(Value::Object(map)) => classify_object(map, content, current),
        Some(Value::String(text)) => Directive::Final {
            answer: text.trim().to_string(),
        },
        _ => Directive::Final {
            answer: content.trim().to_string(),
        },
    }
}

fn classify_object(map: Map<String, Value>, raw: &str, current: &Intent) -> Directive {
    let action = map
        .get("action")
        .and_then(Value::as_str)
        .map(|a| a.trim().to_lowercase());

    match action.as_deref() {
        Some("call_tool" | "tool" | "fetch") => match map.get("entity").and_then(Value::as_str) {
            Some(entity) if !entity.trim().is_empty() => {
                let instruction = map
                    .get("instruction")
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::trim)
                    .unwrap_or(current.instruction.as_str());
                let filters: Filters = match map.get("filters") {
                    Some(Value::Object(filters)) => filters
                        .iter()
                        .filter(|(_, v)| !v.is_null())
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    _ => Filters::new(),
                };
                Directive::CallTool {
                    intent: Intent::new(EntityKey::from(entity), instruction).with_filters(filters),
                }
            }
            _ => {
                warn!("call_tool directive without an entity, treating as final answer");
                degrade(&map, raw)
            }
        },
        Some("final" | "answer" | "respond") => match best_text(&map) {
            Some(answer) => Directive::Final { answer },
            None => {
                warn!("final directive without a response field");
                degrade(&map, raw)
            }
        },
        Some(other) => {
            warn!(action = other, "unknown directive action, treating as final answer");
            degrade(&map, raw)
        }
        None => match best_text(&map) {
            Some(answer) => Directive::Final { answer },
            None => Directive::Final {
                answer: raw.trim().to_string(),
            },
        },
    }
}

fn degrade(map: &Map<String, Value>, raw: &str) -> Directive {
    Directive::Final {
        answer: best_text(map).unwrap_or_else(|| raw.trim().to_string()),
    }
}

fn best_text(map: &Map<String, Value>) -> Option<String> {
    TEXT_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Direct parse, then a fenced block, then the outermost brace pair.
fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after
            .strip_prefix("json")
            .or_else(|| after.strip_prefix("JSON"))
            .unwrap_or(after);
        if let Some(end) = after.find("```") {
            if let Ok(value) = serde_json::from_str::<Value>(after[..end].trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    None
}
