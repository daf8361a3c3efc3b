use super::entity::EntityKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named filter values extracted from an utterance or requested by the model.
pub type Filters = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub entity: EntityKey,
    pub instruction: String,
    #[serde(default)]
    pub filters: Filters,
}

impl Intent {
    pub fn new(entity: EntityKey, instruction: impl Into<String>) -> Self {
        Self {
            entity,
            instruction: instruction.into(),
            filters: Filters::new(),
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn filter_str(&self, name: &str) -> Option<&str> {
        self.filters.get(name).and_then(Value::as_str)
    }
}
