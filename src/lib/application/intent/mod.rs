//! Free text → structured intent.

mod clock;
mod parser;

pub use clock::{Clock, FixedClock, SystemClock};
pub use parser::{IntentError, IntentParser};
