//! HTTP endpoints: a thin adapter from JSON requests onto the three
//! workflows. No core logic lives here — every decision is made inside
//! `voice-agent-intake`, `voice-agent-invoice`, or `voice-agent-support`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use voice_agent_core::model::{ConversationMessage, Permissions, VoiceIntakeState};
use voice_agent_graph::GraphRunner;
use voice_agent_support::SupportState;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/voice/process", post(process_voice_message))
        .route("/invoice/draft", post(generate_invoice_draft))
        .route("/support/message", post(handle_support_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "healthy"})))
}

#[derive(Debug, Deserialize)]
struct VoiceProcessRequest {
    message_id: String,
    audio_url: String,
    customer_phone: String,
    organization_id: String,
    #[serde(default)]
    conversation_history: Vec<ConversationMessage>,
    #[serde(default = "default_business_languages")]
    business_languages: Vec<String>,
    #[serde(default)]
    permissions: Permissions,
}

fn default_business_languages() -> Vec<String> {
    vec!["es".to_string()]
}

/// `POST /voice/process`: run one customer voice message through the
/// Intake Pipeline (`spec.md` §4.4).
async fn process_voice_message(
    State(state): State<AppState>,
    Json(request): Json<VoiceProcessRequest>,
) -> impl IntoResponse {
    let initial_state = VoiceIntakeState::new(
        request.message_id,
        request.audio_url,
        request.customer_phone,
        request.organization_id,
        request.conversation_history,
        request.business_languages,
        request.permissions,
    );

    match GraphRunner::run(&state.intake_graph, initial_state).await {
        Ok(final_state) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": final_state.status,
                "job_id": final_state.job_id,
                "overall_confidence": final_state.overall_confidence,
                "confirmation_sent": final_state.confirmation_sent,
                "error": final_state.error,
            })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "intake graph run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": err.to_string()})),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvoiceDraftRequest {
    organization_id: String,
    job_id: String,
    transcription: String,
}

/// `POST /invoice/draft`: generate an invoice draft from a technician's
/// voice memo (`spec.md` §4.5).
async fn generate_invoice_draft(
    State(state): State<AppState>,
    Json(request): Json<InvoiceDraftRequest>,
) -> impl IntoResponse {
    let draft = voice_agent_invoice::generate_draft(
        state.invoice_chat.as_ref(),
        state.invoice_catalog.as_ref(),
        &state.settings,
        &request.organization_id,
        &request.job_id,
        &request.transcription,
    )
    .await;

    (StatusCode::OK, Json(draft))
}

#[derive(Debug, Deserialize)]
struct SupportMessageRequest {
    organization_id: String,
    user_id: String,
    message: String,
    #[serde(default)]
    conversation_history: Vec<ConversationMessage>,
}

/// `POST /support/message`: classify and answer one customer support
/// message (`spec.md` §4.6).
async fn handle_support_message(
    State(state): State<AppState>,
    Json(request): Json<SupportMessageRequest>,
) -> impl IntoResponse {
    let initial_state = SupportState::new(
        request.organization_id,
        request.user_id,
        request.message,
        request.conversation_history,
    );

    let result = voice_agent_support::route_support_message(&state.support_graph, initial_state).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "reply": result.reply,
            "category": result.category,
            "escalated": result.escalated,
            "resolved": result.resolved,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EndpointConfig;

    #[test]
    fn router_builds_with_default_state() {
        let settings = voice_agent_config::Settings::default();
        let state = AppState::new(settings, EndpointConfig::from_env());
        let _ = create_router(state);
    }
}
