//! Pure state transition function
//!
//! Given the same inputs it always produces the same outputs, with no I/O.

use super::{Effect, Event, ExchangeContext, ExchangeState};
use crate::llm::LlmRequest;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. The state is left untouched in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("An exchange is already in flight")]
    Busy,
    #[error("No exchange in flight")]
    NoExchangeInFlight,
    #[error("Reply for exchange {got} does not match in-flight exchange {expected}")]
    StaleReply { expected: String, got: String },
}

pub fn transition(
    state: &ExchangeState,
    context: &ExchangeContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Submissions while awaiting are dropped, never queued
        (ExchangeState::Awaiting { .. }, Event::UserMessage { .. }) => Err(TransitionError::Busy),

        (ExchangeState::Idle, Event::UserMessage { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + UserMessage -> Awaiting
        (ExchangeState::Idle, Event::UserMessage { text, exchange_id }) => {
            let request = LlmRequest::from_user_text(&text);
            Ok(TransitionResult::new(ExchangeState::Awaiting {
                exchange_id: exchange_id.clone(),
            })
            .with_effect(Effect::append_user(text))
            .with_effect(Effect::NotifyObservers)
            .with_effect(Effect::RequestReply {
                exchange_id,
                request,
            }))
        }

        (ExchangeState::Idle, Event::ReplyReceived { .. } | Event::ReplyFailed { .. }) => {
            Err(TransitionError::NoExchangeInFlight)
        }

        (ExchangeState::Awaiting { exchange_id }, event) if exchange_id != event.exchange_id() => {
            Err(TransitionError::StaleReply {
                expected: exchange_id.clone(),
                got: event.exchange_id().to_string(),
            })
        }

        // Awaiting + ReplyReceived -> Idle
        (ExchangeState::Awaiting { .. }, Event::ReplyReceived { text, .. }) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::append_bot(text))
                .with_effect(Effect::NotifyObservers))
        }

        // Awaiting + ReplyFailed -> Idle, every failure kind gets the same turn
        (ExchangeState::Awaiting { .. }, Event::ReplyFailed { .. }) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::append_bot(context.fallback_reply.clone()))
                .with_effect(Effect::NotifyObservers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ServiceErrorKind;
    use crate::transcript::Speaker;

    fn test_context() -> ExchangeContext {
        ExchangeContext::new("greeting", "fallback")
    }

    fn awaiting(id: &str) -> ExchangeState {
        ExchangeState::Awaiting {
            exchange_id: id.to_string(),
        }
    }

    fn user_message(text: &str, id: &str) -> Event {
        Event::UserMessage {
            text: text.to_string(),
            exchange_id: id.to_string(),
        }
    }

    #[test]
    fn test_idle_to_awaiting() {
        let result =
            transition(&ExchangeState::Idle, &test_context(), user_message("hello", "x1")).unwrap();

        assert_eq!(result.new_state, awaiting("x1"));
        assert_eq!(
            result.effects,
            vec![
                Effect::append_user("hello"),
                Effect::NotifyObservers,
                Effect::RequestReply {
                    exchange_id: "x1".to_string(),
                    request: LlmRequest::from_user_text("hello"),
                },
            ]
        );
    }

    #[test]
    fn test_user_text_is_kept_verbatim() {
        let result =
            transition(&ExchangeState::Idle, &test_context(), user_message("  hi  ", "x1")).unwrap();
        assert_eq!(result.effects[0], Effect::append_user("  hi  "));
    }

    #[test]
    fn test_reject_empty_message() {
        for text in ["", " ", "\n\t  "] {
            let result = transition(&ExchangeState::Idle, &test_context(), user_message(text, "x1"));
            assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
        }
    }

    #[test]
    fn test_reject_message_while_awaiting() {
        let result = transition(&awaiting("x1"), &test_context(), user_message("b", "x2"));
        assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn test_reply_returns_to_idle() {
        let result = transition(
            &awaiting("x1"),
            &test_context(),
            Event::ReplyReceived {
                exchange_id: "x1".to_string(),
                text: "hi!".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, ExchangeState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::append_bot("hi!"), Effect::NotifyObservers]
        );
    }

    #[test]
    fn test_failure_appends_fallback() {
        let result = transition(
            &awaiting("x1"),
            &test_context(),
            Event::ReplyFailed {
                exchange_id: "x1".to_string(),
                error_kind: ServiceErrorKind::Auth,
                message: "API key not valid".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, ExchangeState::Idle);
        assert_eq!(
            result.effects[0],
            Effect::AppendTurn {
                speaker: Speaker::Bot,
                text: "fallback".to_string(),
            }
        );
    }

    #[test]
    fn test_reply_while_idle_is_rejected() {
        let result = transition(
            &ExchangeState::Idle,
            &test_context(),
            Event::ReplyReceived {
                exchange_id: "x1".to_string(),
                text: "late".to_string(),
            },
        );
        assert_eq!(result.unwrap_err(), TransitionError::NoExchangeInFlight);
    }

    #[test]
    fn test_stale_reply_is_rejected() {
        let result = transition(
            &awaiting("x2"),
            &test_context(),
            Event::ReplyReceived {
                exchange_id: "x1".to_string(),
                text: "late".to_string(),
            },
        );
        assert!(matches!(result, Err(TransitionError::StaleReply { .. })));
    }
}
