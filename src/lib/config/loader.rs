use super::defaults::{DEFAULT_MODEL, DEFAULT_PROMPT_TEMPLATE};
use super::entity::RawEntity;
use super::error::ConfigError;
use super::policy::RawPolicy;
use super::provider::RawProviderConfig;
use super::transport::RawTransport;
use super::AppConfig;
use crate::constants::{CONFIG_PATH, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    system_prompt: Option<String>,
    prompt_template: Option<String>,
    #[serde(default)]
    provider: RawProviderConfig,
    transport: Option<RawTransport>,
    #[serde(default)]
    policy: RawPolicy,
    #[serde(default)]
    entities: Vec<RawEntity>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. When no path is given and the default file
/// is absent, built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            match read_config(default_path) {
                Err(ConfigError::NotFound { .. }) => {
                    info!(path = CONFIG_PATH, "No configuration file found, using defaults");
                    Ok(AppConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, origin: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let model = parsed
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let prompt_template = parsed
        .prompt_template
        .unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string());
    let provider = parsed.provider.build()?;
    let transport = parsed.transport.map(RawTransport::build).transpose()?;
    let policy = parsed.policy.build()?;
    let entities = parsed
        .entities
        .into_iter()
        .map(RawEntity::build)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        model = model.as_str(),
        transport = transport.as_ref().map(|t| t.name()),
        entities = entities.len(),
        "Configuration validated"
    );

    Ok(AppConfig {
        model,
        system_prompt: parsed.system_prompt,
        prompt_template,
        provider,
        transport,
        policy,
        entities,
    })
}
