//! # Agent Module
//!
//! Answers a business question by alternating remote tool calls with
//! reasoning rounds on the completion engine.
//!
//! ## Key Types
//!
//! - [`Orchestrator`] - Caller-facing entry point (`answer`, `answer_with`, `answer_within`)
//! - [`OrchestrationLoop`] - The per-request state machine
//! - [`AgentOutcome`] - Final or partial answer plus the tool steps taken
//! - [`AgentError`] - Hard failures surfaced to the caller
//!
//! ## Loop
//!
//! 1. Fetch rows for the current intent
//! 2. Send every result so far to the completion engine
//! 3. On a tool-call directive fetch again, on a final directive stop
//! 4. Past `max_rounds` stop with a partial answer built from row digests

mod directive;
mod errors;
mod models;
mod orchestrator;
mod parser;
mod prompt;
mod runner;
mod state;

pub use directive::Directive;
pub use errors::AgentError;
pub use models::{AgentOutcome, AgentStep, AnswerRequest};
pub use orchestrator::Orchestrator;
pub use parser::classify_response;
pub use prompt::PROTOCOL;
pub use runner::OrchestrationLoop;
pub use state::{HistoryEntry, LoopPhase, LoopState};

#[cfg(test)]
mod tests;
