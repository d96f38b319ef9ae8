//! Configuration loading for the voice agent.
//!
//! Supports loading configuration from YAML files and `VOICE_AGENT_*`
//! environment variables, following the layering convention in
//! `crates/config/src/settings.rs::load_settings` of the teacher
//! workspace this crate is adapted from.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{load_settings, Deadlines, Settings, Thresholds};
