//! Wires the Intake Pipeline nodes onto a [`voice_agent_graph::Graph`]
//! (`spec.md` §4.4).

use std::sync::Arc;

use voice_agent_config::Settings;
use voice_agent_core::model::{IntakeStatus, VoiceIntakeState};
use voice_agent_graph::{Edge, FnNode, Graph, GraphRunner, Node};

use crate::nodes::{self, Collaborators};

/// Builds the Intake Pipeline graph for one set of collaborators and
/// settings. The graph is immutable once built and may be shared
/// across concurrent runs: each run threads its own
/// [`VoiceIntakeState`] through it.
pub fn build_graph(collaborators: Arc<Collaborators>, settings: Settings) -> Graph<VoiceIntakeState> {
    let high = settings.thresholds.intake_high;
    let medium = settings.thresholds.intake_medium;

    let s = settings.clone();
    let normalize_phone_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let s = s.clone();
        async move { Ok(nodes::normalize_phone(&s, state)) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let transcribe_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::transcribe(&c, &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let translate_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::translate(&c, &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let extract_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::extract(&c, &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let auto_create_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::auto_create(&c, &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let confirm_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::confirm(&c, &s, state).await) }
    }));

    let c = collaborators.clone();
    let s = settings.clone();
    let human_review_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::human_review(&c, &s, state).await) }
    }));

    let c = collaborators;
    let s = settings;
    let handle_failure_node: Arc<dyn Node<VoiceIntakeState>> = Arc::new(FnNode(move |state| {
        let c = c.clone();
        let s = s.clone();
        async move { Ok(nodes::handle_failure(&c, &s, state).await) }
    }));

    Graph::new("normalize_phone")
        .node("normalize_phone", normalize_phone_node)
        .node("transcribe", transcribe_node)
        .node("translate", translate_node)
        .node("extract", extract_node)
        .node("auto_create", auto_create_node)
        .node("confirm", confirm_node)
        .node("human_review", human_review_node)
        .node("handle_failure", handle_failure_node)
        .edge("normalize_phone", Edge::Static("transcribe".to_string()))
        .edge(
            "transcribe",
            Edge::conditional(
                |state: &VoiceIntakeState| failed_branch(state),
                [("failed", "handle_failure"), ("ok", "translate")],
            ),
        )
        .edge("translate", Edge::Static("extract".to_string()))
        .edge(
            "extract",
            Edge::conditional(
                move |state: &VoiceIntakeState| {
                    if state.status == IntakeStatus::Failed {
                        return "failed".to_string();
                    }
                    let confidence = state.overall_confidence.unwrap_or(0.0);
                    nodes::route_by_confidence(confidence, high, medium).to_string()
                },
                [
                    ("failed", "handle_failure"),
                    ("auto_create", "auto_create"),
                    ("confirm", "confirm"),
                    ("human_review", "human_review"),
                ],
            ),
        )
        .edge(
            "auto_create",
            Edge::conditional(
                |state: &VoiceIntakeState| completed_branch(state),
                [("completed", "end"), ("human_review", "human_review")],
            ),
        )
        .edge(
            "confirm",
            Edge::conditional(
                |state: &VoiceIntakeState| confirming_branch(state),
                [("confirming", "end"), ("human_review", "human_review")],
            ),
        )
        .edge("human_review", Edge::Static("end".to_string()))
        .edge("handle_failure", Edge::Static("end".to_string()))
        .terminal("end")
        .build()
}

fn failed_branch(state: &VoiceIntakeState) -> String {
    if state.status == IntakeStatus::Failed {
        "failed".to_string()
    } else {
        "ok".to_string()
    }
}

fn completed_branch(state: &VoiceIntakeState) -> String {
    if state.status == IntakeStatus::Completed {
        "completed".to_string()
    } else {
        "human_review".to_string()
    }
}

fn confirming_branch(state: &VoiceIntakeState) -> String {
    if state.status == IntakeStatus::Confirming {
        "confirming".to_string()
    } else {
        "human_review".to_string()
    }
}

/// Runs the Intake Pipeline to completion for one voice message.
pub async fn run_intake(
    graph: &Graph<VoiceIntakeState>,
    initial_state: VoiceIntakeState,
) -> Result<VoiceIntakeState, voice_agent_graph::GraphError> {
    GraphRunner::run(graph, initial_state).await
}
