use crate::types::{ChatMessage, MessageRole};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::debug;

/// Last few (question, answer) pairs per conversation.
pub struct ConversationMemory {
    max_turns: usize,
    turns: Mutex<HashMap<String, VecDeque<(String, String)>>>,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            turns: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_turns > 0
    }

    /// Prior turns as alternating user/assistant messages, oldest first.
    pub async fn history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let turns = self.turns.lock().await;
        turns
            .get(conversation_id)
            .map(|window| {
                window
                    .iter()
                    .flat_map(|(question, answer)| {
                        [
                            ChatMessage::new(MessageRole::User, question.clone()),
                            ChatMessage::new(MessageRole::Assistant, answer.clone()),
                        ]
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn record(&self, conversation_id: &str, question: &str, answer: &str) {
        if !self.is_enabled() {
            return;
        }
        let mut turns = self.turns.lock().await;
        let window = turns.entry(conversation_id.to_string()).or_default();
        window.push_back((question.to_string(), answer.to_string()));
        while window.len() > self.max_turns {
            window.pop_front();
        }
        debug!(
            conversation_id,
            turns = window.len(),
            "Recorded conversation turn"
        );
    }

    pub async fn clear(&self, conversation_id: &str) -> bool {
        self.turns.lock().await.remove(conversation_id).is_some()
    }
}
