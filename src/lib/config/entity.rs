use super::error::ConfigError;
use crate::domain::EntityKey;
use serde::Deserialize;

/// `[[entities]]` entry: overrides a builtin entity's operation names or
/// declares a new entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityConfig {
    pub key: EntityKey,
    pub operation: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawEntity {
    key: String,
    operation: Option<String>,
    fallback: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawEntity {
    pub(super) fn build(self) -> Result<EntityConfig, ConfigError> {
        if self.key.trim().is_empty() {
            return Err(ConfigError::InvalidEntity {
                key: self.key,
                reason: "key must not be empty".into(),
            });
        }
        let key = EntityKey::from(self.key.as_str());
        let operation = non_blank(self.operation);
        if matches!(key, EntityKey::Other(_)) && operation.is_none() {
            return Err(ConfigError::InvalidEntity {
                key: key.to_string(),
                reason: "new entities must name an operation".into(),
            });
        }
        Ok(EntityConfig {
            key,
            operation,
            fallback: non_blank(self.fallback),
        })
    }
}
