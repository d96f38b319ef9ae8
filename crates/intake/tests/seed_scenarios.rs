//! End-to-end seed scenarios for the Intake Pipeline (`spec.md` §8,
//! scenarios 1-4).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use voice_agent_config::Settings;
use voice_agent_core::error::VoiceAgentError;
use voice_agent_core::model::{IntakeStatus, Permissions, VoiceIntakeState};
use voice_agent_core::traits::{
    ChatCompletion, CompletionOptions, CreateJobResult, DataStore, LanguageDetection, LanguageService,
    MessageUpdate, Messenger, SendResult, SpeechToText,
};
use voice_agent_intake::{build_graph, run_intake, Collaborators};

struct MockStt {
    transcript: &'static str,
    fail: bool,
}

#[async_trait]
impl SpeechToText for MockStt {
    async fn transcribe(&self, _audio: &[u8], _language_hint: &str, _deadline: Duration) -> Result<String, VoiceAgentError> {
        if self.fail {
            Err(VoiceAgentError::io("speech_to_text", "stt unavailable"))
        } else {
            Ok(self.transcript.to_string())
        }
    }
}

struct MockLanguage;

#[async_trait]
impl LanguageService for MockLanguage {
    async fn detect(&self, _text: &str, _deadline: Duration) -> Result<LanguageDetection, VoiceAgentError> {
        Ok(LanguageDetection {
            code: "es".to_string(),
            display_name: "Español".to_string(),
            confidence: 0.99,
        })
    }

    async fn translate(&self, text: &str, _source: &str, _target: &str, _deadline: Duration) -> Result<String, VoiceAgentError> {
        Ok(text.to_string())
    }
}

struct MockChat {
    response: &'static str,
}

#[async_trait]
impl ChatCompletion for MockChat {
    async fn complete(&self, _system: &str, _user: &str, _options: CompletionOptions, _deadline: Duration) -> Result<String, VoiceAgentError> {
        Ok(self.response.to_string())
    }
}

#[derive(Default)]
struct MockMessenger {
    sent_bodies: Mutex<Vec<String>>,
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, _to: &str, body: &str, _org_id: &str, _deadline: Duration) -> Result<SendResult, VoiceAgentError> {
        self.sent_bodies.lock().unwrap().push(body.to_string());
        Ok(SendResult {
            message_id: "outbound-1".to_string(),
        })
    }

    async fn send_buttons(&self, _to: &str, body: &str, _buttons: &[String], _org_id: &str, _deadline: Duration) -> Result<SendResult, VoiceAgentError> {
        self.sent_bodies.lock().unwrap().push(body.to_string());
        Ok(SendResult {
            message_id: "outbound-1".to_string(),
        })
    }
}

#[derive(Default)]
struct MockDataStore {
    create_job_calls: Mutex<u32>,
    enqueue_review_calls: Mutex<u32>,
    update_message_calls: Mutex<u32>,
}

#[async_trait]
impl DataStore for MockDataStore {
    async fn create_job(
        &self,
        _org_id: &str,
        _phone: &str,
        _extraction: &voice_agent_core::model::JobExtraction,
        _source: &str,
        _deadline: Duration,
    ) -> Result<CreateJobResult, VoiceAgentError> {
        *self.create_job_calls.lock().unwrap() += 1;
        Ok(CreateJobResult { id: "job-1".to_string() })
    }

    async fn enqueue_review(
        &self,
        _org_id: &str,
        _message_id: &str,
        _transcription: &str,
        _extraction: &voice_agent_core::model::JobExtraction,
        _confidence: f32,
        _phone: &str,
        _deadline: Duration,
    ) -> Result<(), VoiceAgentError> {
        *self.enqueue_review_calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn update_message(&self, _message_id: &str, _update: MessageUpdate, _deadline: Duration) -> Result<(), VoiceAgentError> {
        *self.update_message_calls.lock().unwrap() += 1;
        Ok(())
    }
}

fn initial_state(audio_ok: bool) -> VoiceIntakeState {
    VoiceIntakeState::new(
        "msg-1",
        if audio_ok { "https://audio/ok.wav" } else { "https://audio/broken.wav" },
        "+5491112345678",
        "org-1",
        vec![],
        vec!["es".to_string()],
        Permissions::default(),
    )
}

const EXTRACTION_HIGH: &str = r#"{"title":"Reparación de heladera Samsung","description":"La heladera Samsung no enfría","service_type":"appliance_repair","address":"Av. Siempreviva 742","city":"Springfield","province":"Buenos Aires","urgency":"normal","appliance_brand":"Samsung","problem_description":"No enfría","overall_confidence":0.92}"#;

const EXTRACTION_MEDIUM: &str = r#"{"title":"Reparación de aire acondicionado","description":"El aire acondicionado no enfría","service_type":"hvac","overall_confidence":0.65}"#;

const EXTRACTION_LOW: &str = r#"{"description":"mensaje poco claro","overall_confidence":0.35}"#;

#[tokio::test]
async fn scenario_1_high_confidence_auto_create() {
    let messenger = Arc::new(MockMessenger::default());
    let data_store = Arc::new(MockDataStore::default());
    let collaborators = Arc::new(Collaborators {
        stt: Arc::new(MockStt { transcript: "El refrigerador Samsung no enfría", fail: false }),
        language: Arc::new(MockLanguage),
        chat: Arc::new(MockChat { response: EXTRACTION_HIGH }),
        messenger: messenger.clone(),
        data_store: data_store.clone(),
    });

    let graph = build_graph(collaborators, Settings::default());
    let result = run_intake(&graph, initial_state(true)).await.unwrap();

    assert_eq!(result.status, IntakeStatus::Completed);
    assert!(result.job_id.is_some());
    assert_eq!(*data_store.create_job_calls.lock().unwrap(), 1);
    let bodies = messenger.sent_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("Trabajo creado"));
}

#[tokio::test]
async fn scenario_2_medium_confidence_confirmation() {
    let messenger = Arc::new(MockMessenger::default());
    let data_store = Arc::new(MockDataStore::default());
    let collaborators = Arc::new(Collaborators {
        stt: Arc::new(MockStt { transcript: "El aire acondicionado no enfría bien", fail: false }),
        language: Arc::new(MockLanguage),
        chat: Arc::new(MockChat { response: EXTRACTION_MEDIUM }),
        messenger: messenger.clone(),
        data_store: data_store.clone(),
    });

    let graph = build_graph(collaborators, Settings::default());
    let result = run_intake(&graph, initial_state(true)).await.unwrap();

    assert_eq!(result.status, IntakeStatus::Confirming);
    assert_eq!(*data_store.create_job_calls.lock().unwrap(), 0);
    let bodies = messenger.sent_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("¿Es correcto?"));
}

#[tokio::test]
async fn scenario_3_low_confidence_human_review() {
    let messenger = Arc::new(MockMessenger::default());
    let data_store = Arc::new(MockDataStore::default());
    let collaborators = Arc::new(Collaborators {
        stt: Arc::new(MockStt { transcript: "mensaje poco claro", fail: false }),
        language: Arc::new(MockLanguage),
        chat: Arc::new(MockChat { response: EXTRACTION_LOW }),
        messenger: messenger.clone(),
        data_store: data_store.clone(),
    });

    let graph = build_graph(collaborators, Settings::default());
    let result = run_intake(&graph, initial_state(true)).await.unwrap();

    assert_eq!(result.status, IntakeStatus::HumanReview);
    assert_eq!(*data_store.enqueue_review_calls.lock().unwrap(), 1);
    assert_eq!(messenger.sent_bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn scenario_4_transcription_failure_triggers_compensation() {
    let messenger = Arc::new(MockMessenger::default());
    let data_store = Arc::new(MockDataStore::default());
    let collaborators = Arc::new(Collaborators {
        stt: Arc::new(MockStt { transcript: "", fail: true }),
        language: Arc::new(MockLanguage),
        chat: Arc::new(MockChat { response: EXTRACTION_HIGH }),
        messenger: messenger.clone(),
        data_store: data_store.clone(),
    });

    let graph = build_graph(collaborators, Settings::default());
    let result = run_intake(&graph, initial_state(false)).await.unwrap();

    assert_eq!(result.status, IntakeStatus::Failed);
    assert_eq!(*data_store.create_job_calls.lock().unwrap(), 0);
    assert_eq!(*data_store.enqueue_review_calls.lock().unwrap(), 1);
    assert_eq!(*data_store.update_message_calls.lock().unwrap(), 1);
    assert_eq!(messenger.sent_bodies.lock().unwrap().len(), 1);
}
