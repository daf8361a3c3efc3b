pub mod app;
pub mod defaults;
pub mod entity;
pub mod error;
pub mod loader;
pub mod policy;
pub mod provider;
pub mod transport;

/// Default config file path - can be overridden via CLI argument
pub use crate::constants::CONFIG_PATH;

pub use app::AppConfig;
pub use entity::EntityConfig;
pub use error::ConfigError;
pub use policy::{FallbackPolicy, PolicyConfig};
pub use provider::{ProviderConfig, ProviderKind};
pub use transport::{HttpTransportConfig, StdioTransportConfig, TransportConfig};
