use super::state::LoopState;
use crate::application::registry::ToolRegistry;
use serde_json::{Value, json};

/// Serialized result data above this size is replaced by a preview.
const MAX_DATA_CHARS: usize = 12_000;

pub const PROTOCOL: &str = "\
Every reply must be a single JSON object without commentary.
To fetch more business data reply: {\"action\":\"call_tool\",\"entity\":\"<entity>\",\"instruction\":\"<what to do with the rows>\",\"filters\":{...}}.
Valid filter keys: date_from, date_to (YYYY-MM-DD), status, source, limit, page_size, min_value, max_value, query.
When the results are enough to answer reply: {\"action\":\"final\",\"response\":\"<answer for the user>\"}.
Answer in the language of the question and only state figures present in the results.";

/// Lists the entities the engine may ask for.
pub fn entity_guidance(registry: &ToolRegistry) -> String {
    let mut lines = vec!["Entities you can request:".to_string()];
    for (entity, descriptor) in registry.iter() {
        lines.push(format!("- {entity} (operation {})", descriptor.operation));
    }
    lines.join("\n")
}

/// The user prompt for one reasoning round: the original question and
/// every result gathered so far, oldest first.
pub fn round_prompt(state: &LoopState, tenant_id: &str, max_rounds: usize) -> String {
    let results: Vec<Value> = state
        .history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            json!({
                "round": i + 1,
                "entity": entry.intent.entity,
                "instruction": entry.intent.instruction,
                "filters": entry.intent.filters,
                "operation": entry.result.operation,
                "used_fallback": entry.result.used_fallback,
                "shape": entry.result.shape,
                "digest": entry.reduction.digest(),
                "reduction": entry.reduction,
                "data": clip(&entry.result.value),
            })
        })
        .collect();

    json!({
        "action": "tool_results",
        "question": state.original.instruction,
        "tenant_id": tenant_id,
        "round": state.round,
        "rounds_remaining": max_rounds.saturating_sub(state.round),
        "results": results,
    })
    .to_string()
}

fn clip(value: &Value) -> Value {
    let serialized = value.to_string();
    if serialized.chars().count() <= MAX_DATA_CHARS {
        return value.clone();
    }
    let preview: String = serialized.chars().take(MAX_DATA_CHARS).collect();
    json!({
        "truncated": true,
        "total_chars": serialized.chars().count(),
        "preview": preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tooling::{NormalizedResult, ResultShape};
    use crate::domain::{EntityKey, Intent};

    #[test]
    fn guidance_lists_registered_entities() {
        let guidance = entity_guidance(&ToolRegistry::builtin());
        assert!(guidance.contains("- lead (operation leads.list)"));
        assert!(guidance.contains("- daily_summary (operation daily_summary.generate)"));
    }

    #[test]
    fn round_prompt_carries_full_history() {
        let first = Intent::new(EntityKey::Lead, "new leads");
        let mut state = LoopState::new(first.clone());
        for entity in [EntityKey::Lead, EntityKey::Invoice] {
            state.record(
                Intent::new(entity.clone(), "rows"),
                json!({}),
                NormalizedResult {
                    entity,
                    operation: "op".into(),
                    used_fallback: false,
                    shape: ResultShape::Structured,
                    value: json!([{"id": 1}]),
                },
            );
        }
        let prompt: Value = serde_json::from_str(&round_prompt(&state, "biz-1", 5)).expect("json");
        assert_eq!(prompt["question"], "new leads");
        assert_eq!(prompt["rounds_remaining"], 3);
        assert_eq!(prompt["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(prompt["results"][1]["entity"], "invoice");
    }

    #[test]
    fn oversized_data_is_previewed() {
        let big = Value::String("x".repeat(MAX_DATA_CHARS + 10));
        let clipped = clip(&big);
        assert_eq!(clipped["truncated"], true);
    }
}
