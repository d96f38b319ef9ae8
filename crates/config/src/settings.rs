//! Startup-supplied, immutable-per-process configuration (`spec.md` §6).

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use voice_agent_core::model::Permissions;

use crate::error::ConfigError;

/// Confidence thresholds that split routing/classification decisions.
/// Boundaries are inclusive toward the higher-confidence branch
/// (`spec.md` §8, Routing determinism).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Intake auto-create threshold (default 0.85).
    #[serde(default = "default_intake_high")]
    pub intake_high: f32,
    /// Intake confirm threshold (default 0.50).
    #[serde(default = "default_intake_medium")]
    pub intake_medium: f32,
    /// Invoice line "clean" threshold (default 0.85).
    #[serde(default = "default_invoice_high")]
    pub invoice_high: f32,
    /// Invoice line "partial match" threshold (default 0.70).
    #[serde(default = "default_invoice_medium")]
    pub invoice_medium: f32,
}

fn default_intake_high() -> f32 {
    0.85
}
fn default_intake_medium() -> f32 {
    0.50
}
fn default_invoice_high() -> f32 {
    0.85
}
fn default_invoice_medium() -> f32 {
    0.70
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            intake_high: default_intake_high(),
            intake_medium: default_intake_medium(),
            invoice_high: default_invoice_high(),
            invoice_medium: default_invoice_medium(),
        }
    }
}

/// Per-collaborator call deadlines, in milliseconds (`spec.md` §5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Deadlines {
    #[serde(default = "default_stt_ms")]
    pub stt_ms: u64,
    #[serde(default = "default_extraction_ms")]
    pub extraction_ms: u64,
    #[serde(default = "default_messaging_ms")]
    pub messaging_ms: u64,
    #[serde(default = "default_catalog_ms")]
    pub catalog_ms: u64,
}

fn default_stt_ms() -> u64 {
    30_000
}
fn default_extraction_ms() -> u64 {
    30_000
}
fn default_messaging_ms() -> u64 {
    30_000
}
fn default_catalog_ms() -> u64 {
    10_000
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            stt_ms: default_stt_ms(),
            extraction_ms: default_extraction_ms(),
            messaging_ms: default_messaging_ms(),
            catalog_ms: default_catalog_ms(),
        }
    }
}

impl Deadlines {
    pub fn stt(&self) -> Duration {
        Duration::from_millis(self.stt_ms)
    }
    pub fn extraction(&self) -> Duration {
        Duration::from_millis(self.extraction_ms)
    }
    pub fn messaging(&self) -> Duration {
        Duration::from_millis(self.messaging_ms)
    }
    pub fn catalog(&self) -> Duration {
        Duration::from_millis(self.catalog_ms)
    }
}

/// Main application settings, loaded via `load_settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub deadlines: Deadlines,
    /// Tax rate applied to invoice subtotals (default 0.21, `spec.md` §3).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// STT language hint passed to the speech-to-text collaborator.
    #[serde(default = "default_stt_language_hint")]
    pub stt_language_hint: String,
    /// Default area code used by the Phone Normalizer when a token does
    /// not carry its own (`spec.md` §4.2).
    #[serde(default = "default_area_code")]
    pub default_area_code: String,
    #[serde(default)]
    pub default_permissions: Permissions,
}

fn default_tax_rate() -> f64 {
    0.21
}

fn default_stt_language_hint() -> String {
    "es".to_string()
}

fn default_area_code() -> String {
    "11".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            deadlines: Deadlines::default(),
            tax_rate: default_tax_rate(),
            stt_language_hint: default_stt_language_hint(),
            default_area_code: default_area_code(),
            default_permissions: Permissions::default(),
        }
    }
}

/// Load configuration layered `config/default.yaml` < `config/{env}.yaml`
/// < `VOICE_AGENT_*` environment variables, following the same
/// builder chain the teacher workspace uses in
/// `crates/config/src/settings.rs::load_settings`.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize().unwrap_or_default();

    Ok(settings)
}
