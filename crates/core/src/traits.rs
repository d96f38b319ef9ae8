//! Abstract collaborator contracts (`spec.md` §6).
//!
//! The workflow crates (`voice-agent-intake`, `voice-agent-invoice`,
//! `voice-agent-support`) depend only on these traits, never on a concrete
//! HTTP/gRPC/database client. Every call carries an explicit deadline
//! (`spec.md` §5, Cancellation and timeouts); a deadline expiry is the
//! implementor's responsibility to surface as
//! `VoiceAgentError::DeadlineExceeded` or `VoiceAgentError::CollaboratorIo`.
//! The core performs no retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::VoiceAgentError;
use crate::model::{CatalogEntry, JobExtraction};

/// Speech-to-text collaborator (`spec.md` §6.1).
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio_bytes: &[u8],
        language_hint: &str,
        deadline: Duration,
    ) -> Result<String, VoiceAgentError>;
}

/// What kind of response the chat-completion collaborator should produce
/// (`spec.md` §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    StructuredJson,
    FreeText,
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub response: ResponseMode,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            response: ResponseMode::FreeText,
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

/// Chat-completion collaborator (`spec.md` §6.2). When the collaborator
/// cannot enforce JSON mode, the core falls back to a best-effort parse
/// with the low-confidence path rather than failing the node.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
        deadline: Duration,
    ) -> Result<String, VoiceAgentError>;
}

#[derive(Debug, Clone)]
pub struct LanguageDetection {
    pub code: String,
    pub display_name: String,
    pub confidence: f32,
}

/// Language detect + translate collaborator (`spec.md` §6.3). Both calls
/// must tolerate sub-sentence input.
#[async_trait]
pub trait LanguageService: Send + Sync {
    async fn detect(&self, text: &str, deadline: Duration) -> Result<LanguageDetection, VoiceAgentError>;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        deadline: Duration,
    ) -> Result<String, VoiceAgentError>;
}

#[derive(Debug, Clone)]
pub struct SendResult {
    pub message_id: String,
}

/// Outbound messenger collaborator (`spec.md` §6.4).
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        org_id: &str,
        deadline: Duration,
    ) -> Result<SendResult, VoiceAgentError>;

    /// `buttons` carries at most three options; implementors may reject a
    /// larger slice.
    async fn send_buttons(
        &self,
        to: &str,
        body: &str,
        buttons: &[String],
        org_id: &str,
        deadline: Duration,
    ) -> Result<SendResult, VoiceAgentError>;
}

#[derive(Debug, Clone)]
pub struct CreateJobResult {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageUpdate {
    pub transcription: Option<String>,
    pub extraction: Option<JobExtraction>,
    pub confidence: Option<f32>,
    pub status: Option<String>,
    pub detected_language: Option<String>,
    pub original_content: Option<String>,
    pub translated_content: Option<String>,
}

/// Data-store collaborator (`spec.md` §6.5).
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn create_job(
        &self,
        org_id: &str,
        phone: &str,
        extraction: &JobExtraction,
        source: &str,
        deadline: Duration,
    ) -> Result<CreateJobResult, VoiceAgentError>;

    async fn enqueue_review(
        &self,
        org_id: &str,
        message_id: &str,
        transcription: &str,
        extraction: &JobExtraction,
        confidence: f32,
        phone: &str,
        deadline: Duration,
    ) -> Result<(), VoiceAgentError>;

    async fn update_message(
        &self,
        message_id: &str,
        update: MessageUpdate,
        deadline: Duration,
    ) -> Result<(), VoiceAgentError>;
}

/// Catalog read collaborator (`spec.md` §6.6).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_price_items(
        &self,
        org_id: &str,
        deadline: Duration,
    ) -> Result<Vec<CatalogEntry>, VoiceAgentError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportReport {
    pub report_type: String,
    pub description: String,
    pub context: Value,
}

/// Support-ticket collaborator (`spec.md` §6.7).
#[async_trait]
pub trait SupportTicketing: Send + Sync {
    async fn report(&self, report: SupportReport, deadline: Duration) -> Result<(), VoiceAgentError>;
}
