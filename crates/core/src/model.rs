//! The record types threaded through the three workflows (`spec.md` §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::money::Money;

/// One prior turn in a conversation history, grounded on
/// `original_source/.../models/schemas.py::ConversationMessage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".to_string()
}

/// Status vocabulary for the Intake Pipeline state machine (`spec.md` §3,
/// §4.4). Advances only through the transitions named in §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Transcribing,
    Translating,
    Extracting,
    Routing,
    Confirming,
    Completed,
    Failed,
    HumanReview,
}

/// Stable status strings persisted via the data-store collaborator
/// (`spec.md` §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistedStatus {
    Transcribed,
    Extracted,
    AwaitingConfirmation,
    JobCreated,
    QueuedForReview,
    ProcessingFailed,
}

/// A small enumerated tag for the kind of service a request concerns.
/// Open-ended in the original system; kept as a free string with a closed
/// set of well-known values used by the seed scenarios and the demo
/// catalog, since the spec does not enumerate the full set.
pub type ServiceType = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Urgente,
    Emergencia,
}

/// Structured result of parsing a customer request (`spec.md` §3).
/// Every attribute slot is optional and carries an independent confidence
/// in `field_confidences`; `overall_confidence` is the aggregate used for
/// routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobExtraction {
    pub title: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub urgency: Option<Urgency>,
    pub customer_name: Option<String>,
    pub appliance_brand: Option<String>,
    pub appliance_model: Option<String>,
    pub problem_description: Option<String>,
    #[serde(default)]
    pub field_confidences: HashMap<String, f32>,
    #[serde(default)]
    pub overall_confidence: f32,
}

impl JobExtraction {
    /// The low-confidence fallback used when the chat-completion
    /// collaborator's structured output cannot be deserialized
    /// (`spec.md` §4.4, `extract` node).
    pub fn fallback_from_transcription(transcription: &str) -> Self {
        Self {
            description: Some(transcription.to_string()),
            overall_confidence: 0.3,
            ..Default::default()
        }
    }
}

/// The record threaded through the Intake graph (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceIntakeState {
    // Inputs
    pub message_id: String,
    pub audio_url: String,
    pub customer_phone: String,
    pub organization_id: String,
    pub conversation_history: Vec<ConversationMessage>,

    // Policy inputs
    pub business_languages: Vec<String>,
    pub permissions: Permissions,

    // Status
    pub status: IntakeStatus,

    // Derived fields
    pub transcription: Option<String>,
    pub detected_language: Option<String>,
    pub detected_language_name: Option<String>,
    pub language_confidence: Option<f32>,
    pub original_transcription: Option<String>,
    pub translated_transcription: Option<String>,
    pub extraction: Option<JobExtraction>,
    pub overall_confidence: Option<f32>,
    pub job_id: Option<String>,
    pub error: Option<String>,
    pub confirmation_sent: bool,
    pub confirmation_message_id: Option<String>,
}

impl VoiceIntakeState {
    pub fn new(
        message_id: impl Into<String>,
        audio_url: impl Into<String>,
        customer_phone: impl Into<String>,
        organization_id: impl Into<String>,
        conversation_history: Vec<ConversationMessage>,
        business_languages: Vec<String>,
        permissions: Permissions,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            audio_url: audio_url.into(),
            customer_phone: customer_phone.into(),
            organization_id: organization_id.into(),
            conversation_history,
            business_languages,
            permissions,
            status: IntakeStatus::Transcribing,
            transcription: None,
            detected_language: None,
            detected_language_name: None,
            language_confidence: None,
            original_transcription: None,
            translated_transcription: None,
            extraction: None,
            overall_confidence: None,
            job_id: None,
            error: None,
            confirmation_sent: false,
            confirmation_message_id: None,
        }
    }
}

/// The workflow-permission set consulted by Intake nodes (`spec.md` §4.4).
/// Unrecognized permissions default to enabled; only `translate_messages`
/// is actually consulted by the specified nodes (reserved fields exist so
/// the interface boundary accepts the full set, per the Open Question in
/// `spec.md` §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default = "t")]
    pub suggest_responses: bool,
    #[serde(default = "t")]
    pub translate_messages: bool,
    #[serde(default = "t")]
    pub suggest_actions: bool,
    #[serde(default = "t")]
    pub access_database: bool,
    #[serde(default = "t")]
    pub access_schedule: bool,
    #[serde(default)]
    pub auto_approve_small_price_adjustments: bool,
    #[serde(default = "default_auto_approve_threshold_percent")]
    pub auto_approve_threshold_percent: u8,
    #[serde(default)]
    pub auto_assign_technicians: bool,
}

fn t() -> bool {
    true
}

fn default_auto_approve_threshold_percent() -> u8 {
    5
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            suggest_responses: true,
            translate_messages: true,
            suggest_actions: true,
            access_database: true,
            access_schedule: true,
            auto_approve_small_price_adjustments: false,
            auto_approve_threshold_percent: 5,
            auto_assign_technicians: false,
        }
    }
}

// ---------------------------------------------------------------------
// Technician report / invoice draft generator types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Piece,
    Meter,
    Kg,
    Liter,
    Roll,
    Box,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Piece => "piece",
            Unit::Meter => "meter",
            Unit::Kg => "kg",
            Unit::Liter => "liter",
            Unit::Roll => "roll",
            Unit::Box => "box",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPart {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub source_span: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedService {
    pub description: String,
    pub duration_minutes: Option<u32>,
    pub service_type: Option<ServiceType>,
    pub source_span: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Working,
    NeedsFollowup,
    Unrepairable,
}

/// Structured result of parsing a technician job-completion voice memo
/// (`spec.md` §3). A deserialization failure on the chat-completion
/// response yields `TechnicianReport::default()` with `overall_confidence
/// == 0.0`, per `spec.md` §4.5 step 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicianReport {
    pub summary: Option<String>,
    pub narrative: Option<String>,
    #[serde(default)]
    pub parts: Vec<ExtractedPart>,
    #[serde(default)]
    pub services: Vec<ExtractedService>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub total_labor_hours: Option<f64>,
    pub equipment_status: Option<EquipmentStatus>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    #[serde(default)]
    pub photos_mentioned: bool,
    #[serde(default)]
    pub signature_mentioned: bool,
    #[serde(default)]
    pub overall_confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEntryType {
    Product,
    Service,
}

/// Read-only catalog entry owned by the catalog collaborator
/// (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub unit: String,
    pub entry_type: CatalogEntryType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Part,
    Service,
    Custom,
}

/// One candidate alternative match surfaced alongside the best match
/// (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeMatch {
    pub catalog_id: String,
    pub name: String,
    pub price: Money,
    pub unit: String,
    pub entry_type: CatalogEntryType,
    pub score: f32,
}

/// One row of the invoice draft, one-to-one with an extracted part or
/// service (`spec.md` §3). The review-flag law:
/// `needs_review == true` iff `unit_price` is absent, or
/// `match_confidence < H`, or `source_type == Custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: Option<Money>,
    pub total: Option<Money>,
    pub tax_rate: f64,
    pub source_type: SourceType,
    pub source_span: String,
    pub matched_catalog_id: Option<String>,
    pub matched_name: Option<String>,
    pub match_confidence: Option<f32>,
    #[serde(default)]
    pub alternatives: Vec<AlternativeMatch>,
    pub needs_review: bool,
    pub review_reason: Option<String>,
}

/// Emitted by the Invoice Draft Generator (`spec.md` §3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub job_id: String,
    pub organization_id: String,
    pub technician_report: TechnicianReport,
    pub original_transcription: String,
    pub line_items: Vec<DraftLineItem>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub processing_duration_ms: u64,
    pub overall_match_confidence: f32,
    pub requires_review: bool,
    pub review_notes: Vec<String>,
}
