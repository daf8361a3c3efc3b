//! # Application Module
//!
//! Core orchestration logic, independent of how it is exposed.
//!
//! ## Submodules
//!
//! - [`agent`] - Orchestration loop and the caller-facing [`agent::Orchestrator`]
//! - [`analysis`] - Deterministic row reductions sent alongside tool results
//! - [`client`] - Completion client wrapping a model provider
//! - [`dispatcher`] - Entity to tool call with fallback and normalization
//! - [`intent`] - Utterance to intent parsing and date filters
//! - [`memory`] - Per-conversation turn window
//! - [`registry`] - Entity to tool descriptor table
//! - [`stdio`] - JSON-lines interface
//! - [`tooling`] - Tool transports, session pool and result normalization

pub mod agent;
pub mod analysis;
pub mod client;
pub mod dispatcher;
pub mod intent;
pub mod memory;
pub mod registry;
pub mod stdio;
pub mod tooling;
