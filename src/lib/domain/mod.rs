//! Domain vocabulary shared by every layer: business entities, intents and
//! chat messages exchanged with the completion engine.

pub mod entity;
pub mod intent;
pub mod types;

pub use entity::EntityKey;
pub use intent::{Filters, Intent};
pub use types::{ChatMessage, MessageRole};
