//! Application constants
//!
//! Single source of truth for paths and other constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

