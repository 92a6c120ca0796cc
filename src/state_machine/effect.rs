//! Effects produced by state transitions

use crate::llm::LlmRequest;
use crate::transcript::Speaker;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendTurn { speaker: Speaker, text: String },

    /// Call the answering service
    RequestReply {
        exchange_id: String,
        request: LlmRequest,
    },

    /// Push the new snapshot to observers
    NotifyObservers,
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn append_bot(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}
