//! Error taxonomy shared across the workflow crates (`spec.md` §7).
//!
//! The taxonomy distinguishes the cases `spec.md` names so call sites can
//! match on behavior (retry-worthy vs. degrade-to-default vs. swallow)
//! instead of string-sniffing a single catch-all error. The `Display`
//! message keeps the prefix convention the spec calls "suggestive, not
//! normative."

use thiserror::Error;

/// A collaborator call failed (timeout, 5xx, connection error). Nodes that
/// surface this take the `failed` edge to `handle_failure`
/// (`spec.md` §4.4, §7).
#[derive(Debug, Error)]
pub enum VoiceAgentError {
    #[error("transient collaborator failure calling {collaborator}: {message}")]
    CollaboratorIo {
        collaborator: &'static str,
        message: String,
    },

    #[error("collaborator {collaborator} returned malformed structured output: {message}")]
    StructuredOutputParse {
        collaborator: &'static str,
        message: String,
    },

    #[error("deadline of {deadline_ms}ms exceeded calling {collaborator}")]
    DeadlineExceeded {
        collaborator: &'static str,
        deadline_ms: u64,
    },
}

impl VoiceAgentError {
    pub fn io(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::CollaboratorIo {
            collaborator,
            message: message.into(),
        }
    }
}
