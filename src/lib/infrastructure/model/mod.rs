//! Model infrastructure module
//!
//! Completion engine adapters behind the [`ModelProvider`] trait.
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - ModelProvider trait
//! - `adapter` - Message format adapters
//! - `factory` - Builds the configured client
//! - `clients` - Individual client implementations

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use factory::ProviderFactory;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse};
