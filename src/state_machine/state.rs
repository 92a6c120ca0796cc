//! Exchange state types

use crate::persona::FALLBACK_REPLY;
use serde::Serialize;

/// Whether an exchange is in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeState {
    /// Ready for user input
    #[default]
    Idle,

    /// One request to the answering service is outstanding
    Awaiting { exchange_id: String },
}

impl ExchangeState {
    /// The pending flag observers see
    pub fn is_pending(&self) -> bool {
        matches!(self, ExchangeState::Awaiting { .. })
    }
}

/// Immutable configuration of a controller
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    pub greeting: String,
    /// Bot turn appended for every failed exchange
    pub fallback_reply: String,
}

impl ExchangeContext {
    pub fn new(greeting: impl Into<String>, fallback_reply: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            fallback_reply: fallback_reply.into(),
        }
    }
}

impl Default for ExchangeContext {
    fn default() -> Self {
        Self::new(crate::persona::GREETING, FALLBACK_REPLY)
    }
}
