//! Shared application state handed to every axum handler.

use std::sync::Arc;

use voice_agent_config::Settings;
use voice_agent_core::traits::{CatalogSource, ChatCompletion};
use voice_agent_graph::Graph;
use voice_agent_intake::Collaborators as IntakeCollaborators;
use voice_agent_support::{Collaborators as SupportCollaborators, SupportState};

use crate::providers::{
    HttpCatalogSource, HttpChatCompletion, HttpDataStore, HttpEndpoint, HttpLanguageService, HttpMessenger,
    HttpSpeechToText, HttpSupportTicketing,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub intake_graph: Arc<Graph<voice_agent_core::model::VoiceIntakeState>>,
    pub support_graph: Arc<Graph<SupportState>>,
    pub invoice_chat: Arc<dyn ChatCompletion>,
    pub invoice_catalog: Arc<dyn CatalogSource>,
}

/// The base URLs for each collaborator's HTTP backend, read from
/// `VOICE_AGENT_<NAME>_ENDPOINT` environment variables at startup.
pub struct EndpointConfig {
    pub stt: String,
    pub chat: String,
    pub language: String,
    pub messenger: String,
    pub data_store: String,
    pub catalog: String,
    pub support_ticketing: String,
}

impl EndpointConfig {
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
        Self {
            stt: var("VOICE_AGENT_STT_ENDPOINT", "http://localhost:9001"),
            chat: var("VOICE_AGENT_CHAT_ENDPOINT", "http://localhost:9002"),
            language: var("VOICE_AGENT_LANGUAGE_ENDPOINT", "http://localhost:9003"),
            messenger: var("VOICE_AGENT_MESSENGER_ENDPOINT", "http://localhost:9004"),
            data_store: var("VOICE_AGENT_DATA_STORE_ENDPOINT", "http://localhost:9005"),
            catalog: var("VOICE_AGENT_CATALOG_ENDPOINT", "http://localhost:9006"),
            support_ticketing: var("VOICE_AGENT_SUPPORT_TICKETING_ENDPOINT", "http://localhost:9007"),
        }
    }
}

impl AppState {
    pub fn new(settings: Settings, endpoints: EndpointConfig) -> Self {
        let settings = Arc::new(settings);

        let stt: Arc<dyn voice_agent_core::traits::SpeechToText> =
            Arc::new(HttpSpeechToText(HttpEndpoint::new("speech_to_text", endpoints.stt)));
        let chat: Arc<dyn ChatCompletion> = Arc::new(HttpChatCompletion(HttpEndpoint::new("chat_completion", endpoints.chat)));
        let language: Arc<dyn voice_agent_core::traits::LanguageService> =
            Arc::new(HttpLanguageService(HttpEndpoint::new("language_service", endpoints.language)));
        let messenger: Arc<dyn voice_agent_core::traits::Messenger> =
            Arc::new(HttpMessenger(HttpEndpoint::new("messenger", endpoints.messenger)));
        let data_store: Arc<dyn voice_agent_core::traits::DataStore> =
            Arc::new(HttpDataStore(HttpEndpoint::new("data_store", endpoints.data_store)));
        let catalog: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource(HttpEndpoint::new("catalog_source", endpoints.catalog)));
        let support_ticketing: Arc<dyn voice_agent_core::traits::SupportTicketing> = Arc::new(HttpSupportTicketing(
            HttpEndpoint::new("support_ticketing", endpoints.support_ticketing),
        ));

        let intake_collaborators = Arc::new(IntakeCollaborators {
            stt,
            language,
            chat: chat.clone(),
            messenger,
            data_store,
        });
        let intake_graph = Arc::new(voice_agent_intake::build_graph(intake_collaborators, (*settings).clone()));

        let support_collaborators = Arc::new(SupportCollaborators {
            chat: chat.clone(),
            ticketing: support_ticketing,
        });
        let support_graph = Arc::new(voice_agent_support::build_graph(support_collaborators, (*settings).clone()));

        Self {
            settings,
            intake_graph,
            support_graph,
            invoice_chat: chat,
            invoice_catalog: catalog,
        }
    }
}
