//! Core data model and collaborator trait contracts for the voice agent.
//!
//! This crate owns the types threaded through the Intake Pipeline, the
//! Invoice Draft Generator, and the Support Router, plus the abstract
//! collaborator interfaces (speech-to-text, chat-completion, messaging,
//! data-store, catalog, support ticketing) that the workflow crates depend
//! on but never implement directly.

pub mod error;
pub mod model;
pub mod money;
pub mod traits;

pub use error::VoiceAgentError;
pub use money::Money;
