use serde_json::Value;

/// One element of a tool's content list.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Structured(Value),
    Text(String),
}

/// Tool output exactly as the transport delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToolResult {
    /// Typed payload the server already decoded for us.
    Structured(Value),
    /// Ordered content blocks; may be empty.
    Blocks(Vec<ContentBlock>),
    /// Bytes nothing upstream could interpret.
    Blob(Vec<u8>),
}

impl RawToolResult {
    /// Converts an MCP `tools/call` result object.
    ///
    /// `structuredContent` wins over `content`. Anything that carries neither
    /// is kept as an opaque blob of its serialized form.
    pub fn from_call_result(result: Value) -> Self {
        match result.get("structuredContent") {
            Some(Value::Null) | None => {}
            Some(structured) => return RawToolResult::Structured(structured.clone()),
        }

        if let Some(items) = result.get("content").and_then(Value::as_array) {
            let blocks = items
                .iter()
                .map(|item| match item.get("type").and_then(Value::as_str) {
                    Some("text") => ContentBlock::Text(
                        item.get("text")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    ),
                    _ => ContentBlock::Structured(item.clone()),
                })
                .collect();
            return RawToolResult::Blocks(blocks);
        }

        RawToolResult::Blob(serde_json::to_vec(&result).unwrap_or_default())
    }
}
