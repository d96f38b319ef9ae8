//! Support Router: classify a customer message, answer it from the
//! FAQ knowledge base, escalate to a human when warranted
//! (`spec.md` §4.6).

pub mod faq;

use std::sync::Arc;

use voice_agent_config::Settings;
use voice_agent_core::model::ConversationMessage;
use voice_agent_core::traits::{ChatCompletion, CompletionOptions, ResponseMode, SupportReport, SupportTicketing};
use voice_agent_graph::{Edge, FnNode, Graph, GraphRunner, Node};

/// The closed category set the classifier must coerce into
/// (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportCategory {
    Sales,
    Features,
    Billing,
    Payments,
    Messaging,
    Account,
    MobileApp,
    Other,
}

impl SupportCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SupportCategory::Sales => "sales",
            SupportCategory::Features => "features",
            SupportCategory::Billing => "billing",
            SupportCategory::Payments => "payments",
            SupportCategory::Messaging => "messaging",
            SupportCategory::Account => "account",
            SupportCategory::MobileApp => "mobile-app",
            SupportCategory::Other => "other",
        }
    }

    /// Coerces an arbitrary classifier token into the closed set; an
    /// unrecognized token becomes `other`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "sales" => SupportCategory::Sales,
            "features" => SupportCategory::Features,
            "billing" => SupportCategory::Billing,
            "payments" => SupportCategory::Payments,
            "messaging" => SupportCategory::Messaging,
            "account" => SupportCategory::Account,
            "mobile-app" | "mobile_app" | "mobileapp" => SupportCategory::MobileApp,
            _ => SupportCategory::Other,
        }
    }

    /// Sales and features are never escalated, regardless of what the
    /// generated reply says (`spec.md` §4.6, §8 closure property).
    fn escalation_exempt(self) -> bool {
        matches!(self, SupportCategory::Sales | SupportCategory::Features)
    }

    fn gets_business_document(self) -> bool {
        self.escalation_exempt()
    }
}

/// State threaded through the two-node Support Router graph.
#[derive(Debug, Clone)]
pub struct SupportState {
    pub organization_id: String,
    pub user_id: String,
    pub conversation_history: Vec<ConversationMessage>,
    pub message: String,
    pub category: Option<String>,
    pub reply: Option<String>,
    pub escalated: bool,
}

impl SupportState {
    pub fn new(organization_id: impl Into<String>, user_id: impl Into<String>, message: impl Into<String>, conversation_history: Vec<ConversationMessage>) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            conversation_history,
            message: message.into(),
            category: None,
            reply: None,
            escalated: false,
        }
    }
}

/// The router's public result (`spec.md` §4.6): the last assistant
/// message, the chosen category, and whether this needs a human.
#[derive(Debug, Clone)]
pub struct SupportResult {
    pub reply: String,
    pub category: String,
    pub escalated: bool,
    pub resolved: bool,
}

impl From<SupportState> for SupportResult {
    fn from(state: SupportState) -> Self {
        Self {
            reply: state.reply.unwrap_or_default(),
            category: state.category.unwrap_or_else(|| SupportCategory::Other.as_str().to_string()),
            escalated: state.escalated,
            resolved: !state.escalated,
        }
    }
}

pub struct Collaborators {
    pub chat: Arc<dyn ChatCompletion>,
    pub ticketing: Arc<dyn SupportTicketing>,
}

const CLASSIFY_SYSTEM_PROMPT: &str = "Clasificá el mensaje del cliente en exactamente una de estas categorías: sales, features, billing, payments, messaging, account, mobile-app, other. Respondé únicamente con la categoría.";

const REFUSAL_MESSAGE: &str = "Disculpá, no tengo información sobre eso. Te voy a derivar con una persona de nuestro equipo de soporte.";

const ESCALATION_REASSURANCE: &str = "\n\nYa avisamos a nuestro equipo de soporte; te van a contactar a la brevedad para resolverlo.";

async fn classify(chat: &dyn ChatCompletion, settings: &Settings, mut state: SupportState) -> SupportState {
    let options = CompletionOptions {
        response: ResponseMode::FreeText,
        temperature: 0.0,
        ..Default::default()
    };
    let category = match chat
        .complete(CLASSIFY_SYSTEM_PROMPT, &state.message, options, settings.deadlines.extraction())
        .await
    {
        Ok(token) => SupportCategory::from_token(&token),
        Err(err) => {
            tracing::warn!(error = %err, "classification call failed, defaulting to other");
            SupportCategory::Other
        }
    };
    state.category = Some(category.as_str().to_string());
    state
}

async fn answer(chat: &dyn ChatCompletion, settings: &Settings, mut state: SupportState) -> SupportState {
    let category = state
        .category
        .as_deref()
        .map(SupportCategory::from_token)
        .unwrap_or(SupportCategory::Other);

    let faqs = faq::faqs_for(category);
    let mut prompt = String::new();
    if category.gets_business_document() {
        prompt.push_str(faq::BUSINESS_KNOWLEDGE_DOCUMENT);
        prompt.push_str("\n\n");
    }
    if faqs.is_empty() {
        prompt.push_str("No hay preguntas frecuentes registradas para esta categoría.\n\n");
    } else {
        for entry in faqs {
            prompt.push_str(&format!("P: {}\nR: {}\n\n", entry.question, entry.answer));
        }
    }
    for turn in &state.conversation_history {
        prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    prompt.push_str(&format!("cliente: {}\n", state.message));

    let system_prompt = "Respondé en español rioplatense, con un tono cercano y profesional. Usá únicamente los hechos de las preguntas frecuentes y el documento provisto; si el tema no está cubierto, no inventes información y decí que vas a derivar el caso a una persona del equipo de soporte.";

    let options = CompletionOptions {
        response: ResponseMode::FreeText,
        ..Default::default()
    };

    let reply = match chat.complete(system_prompt, &prompt, options, settings.deadlines.extraction()).await {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => REFUSAL_MESSAGE.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "answer generation call failed, using refusal message");
            REFUSAL_MESSAGE.to_string()
        }
    };

    state.escalated = !category.escalation_exempt() && faq::contains_escalation_phrase(&reply);
    state.reply = Some(reply);
    state
}

async fn escalate(ticketing: &dyn SupportTicketing, settings: &Settings, mut state: SupportState) -> SupportState {
    let report = SupportReport {
        report_type: state.category.clone().unwrap_or_else(|| SupportCategory::Other.as_str().to_string()),
        description: state.message.clone(),
        context: serde_json::json!({
            "organization_id": state.organization_id,
            "user_id": state.user_id,
            "reply": state.reply,
        }),
    };
    if let Err(err) = ticketing.report(report, settings.deadlines.messaging()).await {
        tracing::warn!(error = %err, "support ticket creation failed, continuing best-effort");
    }
    state.reply = Some(format!("{}{}", state.reply.unwrap_or_default(), ESCALATION_REASSURANCE));
    state
}

/// Builds the Support Router graph for one set of collaborators.
pub fn build_graph(collaborators: Arc<Collaborators>, settings: Settings) -> Graph<SupportState> {
    let c = collaborators.clone();
    let s = settings.clone();
    let classify_node: Arc<dyn Node<SupportState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(classify(c.chat.as_ref(), &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let answer_node: Arc<dyn Node<SupportState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(answer(c.chat.as_ref(), &s, state).await) }
    }));

    let c = collaborators;
    let s = settings;
    let escalate_node: Arc<dyn Node<SupportState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(escalate(c.ticketing.as_ref(), &s, state).await) }
    }));

    Graph::new("classify")
        .node("classify", classify_node)
        .node("answer", answer_node)
        .node("escalate", escalate_node)
        .edge("classify", Edge::Static("answer".to_string()))
        .edge(
            "answer",
            Edge::conditional(
                |state: &SupportState| if state.escalated { "escalate".to_string() } else { "end".to_string() },
                [("escalate", "escalate"), ("end", "end")],
            ),
        )
        .edge("escalate", Edge::Static("end".to_string()))
        .terminal("end")
        .build()
}

pub async fn route_support_message(graph: &Graph<SupportState>, state: SupportState) -> SupportResult {
    match GraphRunner::run(graph, state).await {
        Ok(final_state) => final_state.into(),
        Err(err) => {
            tracing::error!(error = %err, "support router graph run failed");
            SupportResult {
                reply: REFUSAL_MESSAGE.to_string(),
                category: SupportCategory::Other.as_str().to_string(),
                escalated: false,
                resolved: false,
            }
        }
    }
}
