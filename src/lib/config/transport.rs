use super::defaults::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TRANSPORT_NAME};
use super::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioTransportConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Where the business-data tools live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Stdio(StdioTransportConfig),
    Http(HttpTransportConfig),
}

impl TransportConfig {
    pub fn name(&self) -> &str {
        match self {
            TransportConfig::Stdio(config) => &config.name,
            TransportConfig::Http(config) => &config.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawTransport {
    #[serde(default)]
    kind: String,
    name: Option<String>,
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
}

/// Expands `~` and `${VAR}`; unresolvable input is kept as written.
pub(super) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl RawTransport {
    pub(crate) fn build(self) -> Result<TransportConfig, ConfigError> {
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_TRANSPORT_NAME.to_string());
        match self.kind.trim().to_ascii_lowercase().as_str() {
            "" | "stdio" => {
                let command = self
                    .command
                    .ok_or_else(|| ConfigError::MissingTransportField {
                        kind: "stdio".into(),
                        field: "command",
                    })?;
                Ok(TransportConfig::Stdio(StdioTransportConfig {
                    name,
                    command: expand(&command),
                    args: self.args.iter().map(|arg| expand(arg)).collect(),
                    env: self
                        .env
                        .into_iter()
                        .map(|(key, value)| (key, expand(&value)))
                        .collect(),
                    workdir: self.workdir.map(|dir| PathBuf::from(expand(&dir))),
                }))
            }
            "http" => {
                let base_url = self
                    .base_url
                    .ok_or_else(|| ConfigError::MissingTransportField {
                        kind: "http".into(),
                        field: "base_url",
                    })?;
                let api_key = self
                    .api_key
                    .map(|key| expand(&key))
                    .or_else(|| self.api_key_env.and_then(|var| env::var(var).ok()))
                    .filter(|key| !key.trim().is_empty());
                Ok(TransportConfig::Http(HttpTransportConfig {
                    name,
                    base_url: expand(&base_url),
                    api_key,
                    timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
                }))
            }
            other => Err(ConfigError::UnknownTransportKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn expands_env_vars_in_command_and_args() {
        unsafe {
            env::set_var("BIZOPS_TOOL_ROOT", "/opt/tools");
            env::set_var("BIZOPS_TOOL_ARG", "--verbose");
        }

        let raw = RawTransport {
            command: Some("${BIZOPS_TOOL_ROOT}/server".into()),
            args: vec!["run".into(), "${BIZOPS_TOOL_ARG}".into()],
            workdir: Some("${BIZOPS_TOOL_ROOT}/work".into()),
            ..Default::default()
        };
        let TransportConfig::Stdio(config) = raw.build().expect("valid") else {
            panic!("expected stdio transport");
        };
        assert_eq!(config.command, "/opt/tools/server");
        assert_eq!(config.args, vec!["run", "--verbose"]);
        assert_eq!(config.workdir, Some(PathBuf::from("/opt/tools/work")));
        assert_eq!(config.name, DEFAULT_TRANSPORT_NAME);

        unsafe {
            env::remove_var("BIZOPS_TOOL_ROOT");
            env::remove_var("BIZOPS_TOOL_ARG");
        }
    }

    #[test]
    #[serial]
    fn http_reads_key_from_named_variable() {
        unsafe {
            env::set_var("BIZOPS_TEST_KEY", "secret");
        }
        let raw = RawTransport {
            kind: "http".into(),
            base_url: Some("http://localhost:8000".into()),
            api_key_env: Some("BIZOPS_TEST_KEY".into()),
            ..Default::default()
        };
        let TransportConfig::Http(config) = raw.build().expect("valid") else {
            panic!("expected http transport");
        };
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        unsafe {
            env::remove_var("BIZOPS_TEST_KEY");
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        let stdio = RawTransport::default();
        assert!(matches!(
            stdio.build(),
            Err(ConfigError::MissingTransportField { field: "command", .. })
        ));
        let http = RawTransport {
            kind: "http".into(),
            ..Default::default()
        };
        assert!(matches!(
            http.build(),
            Err(ConfigError::MissingTransportField { field: "base_url", .. })
        ));
    }
}
