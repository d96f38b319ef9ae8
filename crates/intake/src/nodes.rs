//! Node bodies for the Intake Pipeline graph (`spec.md` §4.4).
//!
//! Each function here is the business logic for one graph node; wiring
//! them onto [`voice_agent_graph::Graph`] edges happens in
//! `workflow.rs`, mirroring the separation the teacher workspace draws
//! between a stage's behavior (`crates/agent/src/stage.rs`) and the
//! pipeline that sequences stages.

use std::sync::Arc;

use voice_agent_config::Settings;
use voice_agent_core::model::{IntakeStatus, JobExtraction, VoiceIntakeState};
use voice_agent_core::traits::{
    ChatCompletion, CompletionOptions, DataStore, LanguageService, Messenger, MessageUpdate, ResponseMode,
    SpeechToText,
};

use crate::confirmation;

const EXTRACTION_SYSTEM_PROMPT: &str = "Sos un asistente que extrae datos estructurados de un pedido de servicio técnico a domicilio a partir de la transcripción de un mensaje de voz de un cliente. Respondé únicamente con un objeto JSON que contenga los campos de la solicitud junto con un nivel de confianza por campo y una confianza general.";

/// The collaborators the Intake Pipeline depends on, bundled for
/// convenient injection into the graph's nodes.
pub struct Collaborators {
    pub stt: Arc<dyn SpeechToText>,
    pub language: Arc<dyn LanguageService>,
    pub chat: Arc<dyn ChatCompletion>,
    pub messenger: Arc<dyn Messenger>,
    pub data_store: Arc<dyn DataStore>,
}

/// Normalizes `customer_phone` to `+549<area><local>` before anything
/// else touches it, so every downstream collaborator call (job
/// creation, confirmation send, review enqueue) sees the canonical
/// form (`spec.md` §4.2). Unparseable input is left as-is rather than
/// failing the run — a phone number the normalizer can't make sense of
/// is still the best identifier available for a human reviewer.
pub fn normalize_phone(settings: &Settings, mut state: VoiceIntakeState) -> VoiceIntakeState {
    match voice_agent_phone::normalize(&state.customer_phone, &settings.default_area_code) {
        Some(normalized) => state.customer_phone = normalized,
        None => tracing::warn!(
            message_id = %state.message_id,
            raw_phone = %state.customer_phone,
            "could not normalize customer phone, continuing with raw value"
        ),
    }
    state
}

pub async fn transcribe(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    match collaborators
        .stt
        .transcribe(state.audio_url.as_bytes(), &settings.stt_language_hint, settings.deadlines.stt())
        .await
    {
        Ok(text) => {
            state.transcription = Some(text);
            state.status = IntakeStatus::Translating;
        }
        Err(err) => {
            tracing::warn!(error = %err, message_id = %state.message_id, "transcription failed");
            state.status = IntakeStatus::Failed;
            state.error = Some(err.to_string());
        }
    }
    state
}

pub async fn translate(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    if !state.permissions.translate_messages {
        state.detected_language = Some("es".to_string());
        state.status = IntakeStatus::Extracting;
        return state;
    }

    let text = state.transcription.clone().unwrap_or_default();
    let non_whitespace_len = text.chars().filter(|c| !c.is_whitespace()).count();
    let deadline = settings.deadlines.messaging();

    let detection = collaborators.language.detect(&text, deadline).await;
    let (code, name, confidence) = match &detection {
        Ok(detected) if non_whitespace_len >= 3 => {
            (detected.code.clone(), Some(detected.display_name.clone()), detected.confidence)
        }
        _ => ("es".to_string(), None, 0.5),
    };
    state.detected_language = Some(code.clone());
    state.detected_language_name = name;
    state.language_confidence = Some(confidence);

    if state.business_languages.iter().any(|language| language == &code) {
        state.status = IntakeStatus::Extracting;
        return state;
    }

    match collaborators.language.translate(&text, &code, "es", deadline).await {
        Ok(translated) => {
            state.original_transcription = Some(text);
            state.translated_transcription = Some(translated.clone());
            state.transcription = Some(translated);
        }
        Err(err) => {
            tracing::warn!(error = %err, message_id = %state.message_id, "translation failed, continuing with original transcription");
            state.error = Some(format!("translation warning: {err}"));
        }
    }
    state.status = IntakeStatus::Extracting;
    state
}

pub async fn extract(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    let transcription = state.transcription.clone().unwrap_or_default();
    let user_prompt = format!("Transcripción del cliente:\n{transcription}");
    let options = CompletionOptions {
        response: ResponseMode::StructuredJson,
        ..Default::default()
    };

    match collaborators
        .chat
        .complete(EXTRACTION_SYSTEM_PROMPT, &user_prompt, options, settings.deadlines.extraction())
        .await
    {
        Ok(raw) => {
            let extraction: JobExtraction = serde_json::from_str(&raw)
                .unwrap_or_else(|_| JobExtraction::fallback_from_transcription(&transcription));

            state.overall_confidence = Some(extraction.overall_confidence);
            state.status = IntakeStatus::Routing;

            let update = MessageUpdate {
                transcription: Some(transcription),
                extraction: Some(extraction.clone()),
                confidence: state.overall_confidence,
                status: Some("extracted".to_string()),
                detected_language: state.detected_language.clone(),
                original_content: state.original_transcription.clone(),
                translated_content: state.translated_transcription.clone(),
            };
            state.extraction = Some(extraction);

            if let Err(err) = collaborators
                .data_store
                .update_message(&state.message_id, update, settings.deadlines.messaging())
                .await
            {
                tracing::warn!(error = %err, message_id = %state.message_id, "failed to persist extraction");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, message_id = %state.message_id, "extraction call failed");
            state.status = IntakeStatus::Failed;
            state.error = Some(err.to_string());
        }
    }
    state
}

pub async fn auto_create(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    let extraction = state.extraction.clone().unwrap_or_default();

    match collaborators
        .data_store
        .create_job(&state.organization_id, &state.customer_phone, &extraction, "voice_ai_auto", settings.deadlines.messaging())
        .await
    {
        Ok(result) => {
            state.job_id = Some(result.id);
            let body = confirmation::format_auto_create_message(&extraction);
            match collaborators
                .messenger
                .send_text(&state.customer_phone, &body, &state.organization_id, settings.deadlines.messaging())
                .await
            {
                Ok(_) => state.status = IntakeStatus::Completed,
                Err(err) => {
                    tracing::warn!(error = %err, message_id = %state.message_id, "auto-create confirmation send failed");
                    state.error = Some(err.to_string());
                    state.status = IntakeStatus::HumanReview;
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, message_id = %state.message_id, "auto-create job creation failed");
            state.error = Some(err.to_string());
            state.status = IntakeStatus::HumanReview;
        }
    }
    state
}

pub async fn confirm(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    let extraction = state.extraction.clone().unwrap_or_default();
    let body = confirmation::format_confirmation_message(&extraction);

    match collaborators
        .messenger
        .send_text(&state.customer_phone, &body, &state.organization_id, settings.deadlines.messaging())
        .await
    {
        Ok(result) => {
            state.confirmation_sent = true;
            state.confirmation_message_id = Some(result.message_id);
            state.status = IntakeStatus::Confirming;
        }
        Err(err) => {
            tracing::warn!(error = %err, message_id = %state.message_id, "confirmation send failed");
            state.error = Some(err.to_string());
            state.status = IntakeStatus::HumanReview;
        }
    }
    state
}

const WAITING_MESSAGE: &str =
    "Recibimos tu mensaje y un miembro de nuestro equipo lo va a revisar en breve. Gracias por tu paciencia.";

pub async fn human_review(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    let extraction = state.extraction.clone().unwrap_or_default();
    let confidence = state.overall_confidence.unwrap_or(0.0);
    let transcription = state.transcription.clone().unwrap_or_default();

    if let Err(err) = collaborators
        .data_store
        .enqueue_review(
            &state.organization_id,
            &state.message_id,
            &transcription,
            &extraction,
            confidence,
            &state.customer_phone,
            settings.deadlines.messaging(),
        )
        .await
    {
        tracing::warn!(error = %err, message_id = %state.message_id, "failed to enqueue for review");
    }

    if let Err(err) = collaborators
        .messenger
        .send_text(&state.customer_phone, WAITING_MESSAGE, &state.organization_id, settings.deadlines.messaging())
        .await
    {
        tracing::warn!(error = %err, message_id = %state.message_id, "failed to send waiting message");
    }

    state.status = IntakeStatus::HumanReview;
    state
}

const PROBLEM_NOTICE: &str =
    "Hubo un problema al procesar tu mensaje de voz. Nuestro equipo fue notificado y te va a contactar a la brevedad.";

/// Compensating sink reached only via the `failed` branch. Every
/// action here is best-effort: a failure in one does not prevent the
/// others from being attempted.
pub async fn handle_failure(
    collaborators: &Collaborators,
    settings: &Settings,
    mut state: VoiceIntakeState,
) -> VoiceIntakeState {
    let update = MessageUpdate {
        status: Some("processing_failed".to_string()),
        ..Default::default()
    };
    if let Err(err) = collaborators
        .data_store
        .update_message(&state.message_id, update, settings.deadlines.messaging())
        .await
    {
        tracing::warn!(error = %err, message_id = %state.message_id, "handle_failure: could not mark message as processing-failed");
    }

    if let Err(err) = collaborators
        .data_store
        .enqueue_review(
            &state.organization_id,
            &state.message_id,
            &state.transcription.clone().unwrap_or_default(),
            &JobExtraction::default(),
            0.0,
            &state.customer_phone,
            settings.deadlines.messaging(),
        )
        .await
    {
        tracing::warn!(error = %err, message_id = %state.message_id, "handle_failure: could not enqueue for review");
    }

    if let Err(err) = collaborators
        .messenger
        .send_text(&state.customer_phone, PROBLEM_NOTICE, &state.organization_id, settings.deadlines.messaging())
        .await
    {
        tracing::warn!(error = %err, message_id = %state.message_id, "handle_failure: could not send problem notice");
    }

    state.status = IntakeStatus::Failed;
    state
}

/// Pure routing decision after `extract` (`spec.md` §4.4, route). Also
/// consulted after every node that can set `status = Failed`.
pub fn route_by_confidence(confidence: f32, high: f32, medium: f32) -> &'static str {
    if confidence >= high {
        "auto_create"
    } else if confidence >= medium {
        "confirm"
    } else {
        "human_review"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_is_deterministic_and_inclusive_toward_higher_branch() {
        assert_eq!(route_by_confidence(0.85, 0.85, 0.50), "auto_create");
        assert_eq!(route_by_confidence(0.849, 0.85, 0.50), "confirm");
        assert_eq!(route_by_confidence(0.50, 0.85, 0.50), "confirm");
        assert_eq!(route_by_confidence(0.49, 0.85, 0.50), "human_review");
    }

    fn state_with_phone(raw: &str) -> VoiceIntakeState {
        VoiceIntakeState::new("msg-1", "https://example.org/a.wav", raw, "org-1", vec![], vec!["es".to_string()], Default::default())
    }

    #[test]
    fn normalize_phone_rewrites_customer_phone_to_canonical_form() {
        let settings = Settings::default();
        let state = state_with_phone("0343-4890284");
        let state = normalize_phone(&settings, state);
        assert_eq!(state.customer_phone, "+5493434890284");
    }

    #[test]
    fn normalize_phone_leaves_unparseable_input_untouched() {
        let settings = Settings::default();
        let state = state_with_phone("abc");
        let state = normalize_phone(&settings, state);
        assert_eq!(state.customer_phone, "abc");
    }
}
