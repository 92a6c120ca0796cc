//! Events that can occur during an exchange

use crate::llm::ServiceErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted text; the id names the exchange it would start
    UserMessage { text: String, exchange_id: String },

    /// The answering service replied
    ReplyReceived { exchange_id: String, text: String },

    /// The answering service failed
    ReplyFailed {
        exchange_id: String,
        error_kind: ServiceErrorKind,
        message: String,
    },
}

impl Event {
    pub fn exchange_id(&self) -> &str {
        match self {
            Event::UserMessage { exchange_id, .. }
            | Event::ReplyReceived { exchange_id, .. }
            | Event::ReplyFailed { exchange_id, .. } => exchange_id,
        }
    }
}
