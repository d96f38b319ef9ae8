//! Minimal state-graph executor.
//!
//! A [`Graph`] is an immutable value: a fixed set of named nodes, a
//! distinguished entry node, a set of terminal sinks, and the edges
//! (static or conditional) connecting them. This is a narrower,
//! data-oriented sibling of the teacher workspace's
//! `ConversationFSM` trait (`crates/core/src/traits/fsm.rs`), which
//! models a conversation as a mutable trait object owning its own
//! transition logic. Here the graph itself carries no state — each
//! [`GraphRunner::run`] call thread a fresh state value through it —
//! which keeps the intake, invoice, and support workflows built on
//! top of this crate trivially testable in isolation from any running
//! conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// One node in the graph: an asynchronous function from state to
/// state. A node must not leak errors for conditions it is expected
/// to handle itself (`spec.md` §4.1) — a node's own I/O failures
/// should be translated into a returned state carrying a failure
/// marker, not an `Err`. An `Err` returned here is treated as a
/// defect and aborts the whole run.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    async fn run(&self, state: S) -> Result<S, NodeError>;
}

/// A node built from a plain async closure, for nodes with no
/// internal state of their own.
pub struct FnNode<F>(pub F);

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: Send + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<S, NodeError>> + Send,
{
    async fn run(&self, state: S) -> Result<S, NodeError> {
        (self.0)(state).await
    }
}

/// An unexpected failure escaping a node. Distinct from a node's own
/// business-level failure, which is represented in the state it
/// returns rather than here.
#[derive(Debug, Error)]
#[error("node {node} failed: {message}")]
pub struct NodeError {
    pub node: String,
    pub message: String,
}

impl NodeError {
    pub fn new(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            message: message.into(),
        }
    }
}

/// The edge leaving a node: either an unconditional hop to the next
/// node, or a predicate dispatch to one of several successors.
pub enum Edge<S> {
    Static(String),
    Conditional {
        predicate: Arc<dyn Fn(&S) -> String + Send + Sync>,
        branches: HashMap<String, String>,
    },
}

impl<S> Edge<S> {
    pub fn conditional<F>(predicate: F, branches: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        Edge::Conditional {
            predicate: Arc::new(predicate),
            branches: branches.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }
}

/// Failures in the shape of the graph itself, or in its execution.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} is not registered")]
    UnknownNode(String),
    #[error("node {0} has no outgoing edge and is not a terminal sink")]
    NoOutgoingEdge(String),
    #[error("conditional edge from {node} produced unmapped branch {branch}")]
    UnknownBranch { node: String, branch: String },
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// A finite, immutable graph over state type `S` (`spec.md` §4.1).
/// Construct once at startup and share across runs via [`GraphRunner`].
pub struct Graph<S> {
    entry: String,
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    terminals: std::collections::HashSet<String>,
}

impl<S> Graph<S>
where
    S: Send + 'static,
{
    pub fn new(entry: impl Into<String>) -> GraphBuilder<S> {
        GraphBuilder {
            entry: entry.into(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            terminals: std::collections::HashSet::new(),
        }
    }
}

/// Builds a [`Graph`] up front; the resulting graph is never mutated
/// again.
pub struct GraphBuilder<S> {
    entry: String,
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    terminals: std::collections::HashSet<String>,
}

impl<S> GraphBuilder<S>
where
    S: Send + 'static,
{
    pub fn node(mut self, label: impl Into<String>, node: Arc<dyn Node<S>>) -> Self {
        self.nodes.insert(label.into(), node);
        self
    }

    pub fn edge(mut self, from: impl Into<String>, edge: Edge<S>) -> Self {
        self.edges.insert(from.into(), edge);
        self
    }

    pub fn terminal(mut self, label: impl Into<String>) -> Self {
        self.terminals.insert(label.into());
        self
    }

    pub fn build(self) -> Graph<S> {
        Graph {
            entry: self.entry,
            nodes: self.nodes,
            edges: self.edges,
            terminals: self.terminals,
        }
    }
}

/// Executes a [`Graph`] for a single pipeline instance: single
/// node at a time, no parallel branches, no re-entry within a run
/// (`spec.md` §4.1).
pub struct GraphRunner;

impl GraphRunner {
    pub async fn run<S>(graph: &Graph<S>, initial_state: S) -> Result<S, GraphError>
    where
        S: Send + 'static,
    {
        let mut label = graph.entry.clone();
        let mut state = initial_state;

        loop {
            if graph.terminals.contains(&label) {
                return Ok(state);
            }

            let node = graph
                .nodes
                .get(&label)
                .ok_or_else(|| GraphError::UnknownNode(label.clone()))?;

            tracing::debug!(node = %label, "entering graph node");
            state = node.run(state).await?;

            label = match graph.edges.get(&label) {
                Some(Edge::Static(next)) => next.clone(),
                Some(Edge::Conditional { predicate, branches }) => {
                    let branch = predicate(&state);
                    branches
                        .get(&branch)
                        .cloned()
                        .ok_or_else(|| GraphError::UnknownBranch {
                            node: label.clone(),
                            branch,
                        })?
                }
                None => return Err(GraphError::NoOutgoingEdge(label.clone())),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Counter(i32);

    #[tokio::test]
    async fn runs_static_chain_to_terminal() {
        let graph: Graph<Counter> = Graph::new("increment")
            .node(
                "increment",
                Arc::new(FnNode(|s: Counter| async move { Ok(Counter(s.0 + 1)) })),
            )
            .edge("increment", Edge::Static("done".to_string()))
            .terminal("done")
            .build();

        let result = GraphRunner::run(&graph, Counter(0)).await.unwrap();
        assert_eq!(result, Counter(1));
    }

    #[tokio::test]
    async fn conditional_edge_dispatches_by_predicate() {
        let graph: Graph<Counter> = Graph::new("classify")
            .node(
                "classify",
                Arc::new(FnNode(|s: Counter| async move { Ok(s) })),
            )
            .edge(
                "classify",
                Edge::conditional(
                    |s: &Counter| if s.0 >= 0 { "positive".to_string() } else { "negative".to_string() },
                    [("positive", "done_positive"), ("negative", "done_negative")],
                ),
            )
            .terminal("done_positive")
            .terminal("done_negative")
            .build();

        let result = GraphRunner::run(&graph, Counter(5)).await.unwrap();
        assert_eq!(result, Counter(5));
    }

    #[tokio::test]
    async fn node_error_aborts_the_run() {
        let graph: Graph<Counter> = Graph::new("boom")
            .node(
                "boom",
                Arc::new(FnNode(|_s: Counter| async move {
                    Err(NodeError::new("boom", "simulated defect"))
                })),
            )
            .edge("boom", Edge::Static("done".to_string()))
            .terminal("done")
            .build();

        let result = GraphRunner::run(&graph, Counter(0)).await;
        assert!(matches!(result, Err(GraphError::Node(_))));
    }

    #[tokio::test]
    async fn missing_edge_from_non_terminal_node_is_an_error() {
        let graph: Graph<Counter> = Graph::new("lonely")
            .node("lonely", Arc::new(FnNode(|s: Counter| async move { Ok(s) })))
            .build();

        let result = GraphRunner::run(&graph, Counter(0)).await;
        assert!(matches!(result, Err(GraphError::NoOutgoingEdge(_))));
    }
}
