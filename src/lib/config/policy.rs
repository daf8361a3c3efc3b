use super::defaults::{
    DEFAULT_MAX_ROUNDS, DEFAULT_MAX_SESSIONS, DEFAULT_MEMORY_TURNS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which declared operation is tried first, and whether the other one is
/// tried on a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    #[default]
    NativeFirst,
    NativeOnly,
    FallbackFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub max_rounds: usize,
    pub fallback: FallbackPolicy,
    pub utc_offset_minutes: i32,
    pub max_sessions: usize,
    pub request_timeout: Option<Duration>,
    pub memory_turns: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            fallback: FallbackPolicy::default(),
            utc_offset_minutes: 0,
            max_sessions: DEFAULT_MAX_SESSIONS,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            memory_turns: DEFAULT_MEMORY_TURNS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawPolicy {
    max_rounds: Option<usize>,
    #[serde(default)]
    fallback: Option<FallbackPolicy>,
    utc_offset_minutes: Option<i32>,
    max_sessions: Option<usize>,
    /// `0` disables the overall deadline.
    request_timeout_secs: Option<u64>,
    memory_turns: Option<usize>,
}

impl RawPolicy {
    pub(super) fn build(self) -> Result<PolicyConfig, ConfigError> {
        let defaults = PolicyConfig::default();
        let max_rounds = self.max_rounds.unwrap_or(defaults.max_rounds);
        if max_rounds == 0 {
            return Err(ConfigError::InvalidPolicy {
                field: "max_rounds",
                reason: "must be at least 1".into(),
            });
        }
        let utc_offset_minutes = self.utc_offset_minutes.unwrap_or(0);
        if utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidPolicy {
                field: "utc_offset_minutes",
                reason: format!("{utc_offset_minutes} is outside ±24h"),
            });
        }
        let request_timeout = match self.request_timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };
        Ok(PolicyConfig {
            max_rounds,
            fallback: self.fallback.unwrap_or_default(),
            utc_offset_minutes,
            max_sessions: self.max_sessions.unwrap_or(defaults.max_sessions).max(1),
            request_timeout,
            memory_turns: self.memory_turns.unwrap_or(defaults.memory_turns),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        assert_eq!(
            RawPolicy::default().build().expect("valid"),
            PolicyConfig::default()
        );
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let raw = RawPolicy {
            max_rounds: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            raw.build(),
            Err(ConfigError::InvalidPolicy { field: "max_rounds", .. })
        ));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let raw = RawPolicy {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(raw.build().expect("valid").request_timeout, None);
    }
}
