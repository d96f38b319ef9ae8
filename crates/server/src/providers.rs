//! Generic JSON/HTTP collaborator adapters.
//!
//! The core does not dictate a wire format (`spec.md` §6): it assumes a
//! JSON-shaped interchange. These adapters POST a small JSON envelope to
//! a configured base URL per collaborator and decode a JSON response,
//! the same shape the teacher workspace's `OpenAIBackend`
//! (`crates/llm/src/backend.rs`) uses for its own OpenAI-compatible
//! chat endpoint, generalized here to all seven collaborator contracts
//! instead of only chat completion.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use voice_agent_core::model::{CatalogEntry, JobExtraction};
use voice_agent_core::traits::{
    CatalogSource, ChatCompletion, CompletionOptions, CreateJobResult, DataStore, LanguageDetection, LanguageService,
    MessageUpdate, Messenger, SendResult, SpeechToText, SupportReport, SupportTicketing,
};
use voice_agent_core::VoiceAgentError;

/// One HTTP collaborator endpoint: a base URL plus the label used in
/// error messages and tracing spans.
#[derive(Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    base_url: String,
    name: &'static str,
}

impl HttpEndpoint {
    pub fn new(name: &'static str, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            name,
        }
    }

    async fn post_json<Req: Serialize + Sync, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
        deadline: Duration,
    ) -> Result<Resp, VoiceAgentError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let response = self.client.post(&url).timeout(deadline).json(body).send().await.map_err(|err| {
            if err.is_timeout() {
                VoiceAgentError::DeadlineExceeded {
                    collaborator: self.name,
                    deadline_ms: deadline.as_millis() as u64,
                }
            } else {
                VoiceAgentError::io(self.name, err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(VoiceAgentError::io(
                self.name,
                format!("HTTP {} from {url}", response.status()),
            ));
        }

        response.json::<Resp>().await.map_err(|err| VoiceAgentError::StructuredOutputParse {
            collaborator: self.name,
            message: err.to_string(),
        })
    }
}

pub struct HttpSpeechToText(pub HttpEndpoint);

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    audio_base64: String,
    language_hint: &'a str,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(&self, audio_bytes: &[u8], language_hint: &str, deadline: Duration) -> Result<String, VoiceAgentError> {
        use base64::Engine;
        let request = TranscribeRequest {
            audio_base64: base64::engine::general_purpose::STANDARD.encode(audio_bytes),
            language_hint,
        };
        let response: TranscribeResponse = self.0.post_json("transcribe", &request, deadline).await?;
        Ok(response.text)
    }
}

pub struct HttpChatCompletion(pub HttpEndpoint);

#[derive(Serialize)]
struct CompleteRequest<'a> {
    system_prompt: &'a str,
    user_prompt: &'a str,
    structured_json: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompleteResponse {
    text: String,
}

#[async_trait]
impl ChatCompletion for HttpChatCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
        deadline: Duration,
    ) -> Result<String, VoiceAgentError> {
        let request = CompleteRequest {
            system_prompt,
            user_prompt,
            structured_json: options.response == voice_agent_core::traits::ResponseMode::StructuredJson,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };
        let response: CompleteResponse = self.0.post_json("complete", &request, deadline).await?;
        Ok(response.text)
    }
}

pub struct HttpLanguageService(pub HttpEndpoint);

#[derive(Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct DetectResponse {
    code: String,
    display_name: String,
    confidence: f32,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    text: String,
}

#[async_trait]
impl LanguageService for HttpLanguageService {
    async fn detect(&self, text: &str, deadline: Duration) -> Result<LanguageDetection, VoiceAgentError> {
        let request = DetectRequest { text };
        let response: DetectResponse = self.0.post_json("detect", &request, deadline).await?;
        Ok(LanguageDetection {
            code: response.code,
            display_name: response.display_name,
            confidence: response.confidence,
        })
    }

    async fn translate(&self, text: &str, source: &str, target: &str, deadline: Duration) -> Result<String, VoiceAgentError> {
        let request = TranslateRequest { text, source, target };
        let response: TranslateResponse = self.0.post_json("translate", &request, deadline).await?;
        Ok(response.text)
    }
}

pub struct HttpMessenger(pub HttpEndpoint);

#[derive(Serialize)]
struct SendTextRequest<'a> {
    to: &'a str,
    body: &'a str,
    org_id: &'a str,
}

#[derive(Serialize)]
struct SendButtonsRequest<'a> {
    to: &'a str,
    body: &'a str,
    buttons: &'a [String],
    org_id: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    message_id: String,
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send_text(&self, to: &str, body: &str, org_id: &str, deadline: Duration) -> Result<SendResult, VoiceAgentError> {
        let request = SendTextRequest { to, body, org_id };
        let response: SendResponse = self.0.post_json("send_text", &request, deadline).await?;
        Ok(SendResult { message_id: response.message_id })
    }

    async fn send_buttons(
        &self,
        to: &str,
        body: &str,
        buttons: &[String],
        org_id: &str,
        deadline: Duration,
    ) -> Result<SendResult, VoiceAgentError> {
        let request = SendButtonsRequest { to, body, buttons, org_id };
        let response: SendResponse = self.0.post_json("send_buttons", &request, deadline).await?;
        Ok(SendResult { message_id: response.message_id })
    }
}

pub struct HttpDataStore(pub HttpEndpoint);

#[derive(Serialize)]
struct CreateJobRequest<'a> {
    org_id: &'a str,
    phone: &'a str,
    extraction: &'a JobExtraction,
    source: &'a str,
}

#[derive(Deserialize)]
struct CreateJobResponse {
    id: String,
}

#[derive(Serialize)]
struct EnqueueReviewRequest<'a> {
    org_id: &'a str,
    message_id: &'a str,
    transcription: &'a str,
    extraction: &'a JobExtraction,
    confidence: f32,
    phone: &'a str,
}

#[derive(Serialize)]
struct UpdateMessageRequest<'a> {
    message_id: &'a str,
    #[serde(flatten)]
    update: &'a MessageUpdate,
}

#[async_trait]
impl DataStore for HttpDataStore {
    async fn create_job(
        &self,
        org_id: &str,
        phone: &str,
        extraction: &JobExtraction,
        source: &str,
        deadline: Duration,
    ) -> Result<CreateJobResult, VoiceAgentError> {
        let request = CreateJobRequest { org_id, phone, extraction, source };
        let response: CreateJobResponse = self.0.post_json("jobs", &request, deadline).await?;
        Ok(CreateJobResult { id: response.id })
    }

    async fn enqueue_review(
        &self,
        org_id: &str,
        message_id: &str,
        transcription: &str,
        extraction: &JobExtraction,
        confidence: f32,
        phone: &str,
        deadline: Duration,
    ) -> Result<(), VoiceAgentError> {
        let request = EnqueueReviewRequest {
            org_id,
            message_id,
            transcription,
            extraction,
            confidence,
            phone,
        };
        let _: Value = self.0.post_json("review_queue", &request, deadline).await?;
        Ok(())
    }

    async fn update_message(&self, message_id: &str, update: MessageUpdate, deadline: Duration) -> Result<(), VoiceAgentError> {
        let request = UpdateMessageRequest { message_id, update: &update };
        let _: Value = self.0.post_json("messages/update", &request, deadline).await?;
        Ok(())
    }
}

pub struct HttpCatalogSource(pub HttpEndpoint);

#[derive(Serialize)]
struct ListPriceItemsRequest<'a> {
    org_id: &'a str,
}

#[derive(Deserialize)]
struct ListPriceItemsResponse {
    entries: Vec<CatalogEntry>,
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn list_price_items(&self, org_id: &str, deadline: Duration) -> Result<Vec<CatalogEntry>, VoiceAgentError> {
        let request = ListPriceItemsRequest { org_id };
        let response: ListPriceItemsResponse = self.0.post_json("catalog", &request, deadline).await?;
        Ok(response.entries)
    }
}

pub struct HttpSupportTicketing(pub HttpEndpoint);

#[async_trait]
impl SupportTicketing for HttpSupportTicketing {
    async fn report(&self, report: SupportReport, deadline: Duration) -> Result<(), VoiceAgentError> {
        let _: Value = self.0.post_json("support_tickets", &report, deadline).await?;
        Ok(())
    }
}
