pub const DEFAULT_MODEL: &str = "llama3.1";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_API_PATH: &str = "v1/chat/completions";
pub const DEFAULT_TRANSPORT_NAME: &str = "business-tools";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ROUNDS: usize = 5;
pub const DEFAULT_MAX_SESSIONS: usize = 8;
pub const DEFAULT_MEMORY_TURNS: usize = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"
You are a business operations assistant. Answer questions about the owner's appointments, invoices, leads, reviews and performance using only data returned by the tools.

{{custom_instruction}}

{{entity_guidance}}

{{protocol}}

Keep answers short, quote concrete numbers, and say plainly when the data does not cover the question.
"#;
