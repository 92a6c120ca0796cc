//! Property-based tests for the state machine
//!
//! Events are replayed against a minimal transcript model to check the
//! invariants that hold for every sequence of inputs.

use super::transition::*;
use super::*;
use crate::llm::ServiceErrorKind;
use crate::transcript::Speaker;
use proptest::prelude::*;

fn test_context() -> ExchangeContext {
    ExchangeContext::new("greeting", "fallback")
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t\n]{1,5}",
        "[a-zA-Z0-9 ?!]{1,30}",
    ]
}

fn arb_error_kind() -> impl Strategy<Value = ServiceErrorKind> {
    prop_oneof![
        Just(ServiceErrorKind::Network),
        Just(ServiceErrorKind::RateLimit),
        Just(ServiceErrorKind::ServerError),
        Just(ServiceErrorKind::Auth),
        Just(ServiceErrorKind::InvalidRequest),
        Just(ServiceErrorKind::MalformedResponse),
        Just(ServiceErrorKind::Unknown),
    ]
}

/// Steps reference exchange ids by index so replies can target the
/// in-flight exchange or an unrelated one.
#[derive(Debug, Clone)]
enum Step {
    Submit(String),
    Reply { current: bool, text: String },
    Fail { current: bool, kind: ServiceErrorKind },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_text().prop_map(Step::Submit),
        (any::<bool>(), "[a-z ]{0,20}").prop_map(|(current, text)| Step::Reply { current, text }),
        (any::<bool>(), arb_error_kind()).prop_map(|(current, kind)| Step::Fail { current, kind }),
    ]
}

/// Turns appended by the effects of one transition
fn appended(effects: &[Effect]) -> Vec<(Speaker, String)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendTurn { speaker, text } => Some((*speaker, text.clone())),
            _ => None,
        })
        .collect()
}

fn current_id(state: &ExchangeState) -> Option<String> {
    match state {
        ExchangeState::Awaiting { exchange_id } => Some(exchange_id.clone()),
        ExchangeState::Idle => None,
    }
}

proptest! {
    #[test]
    fn blank_submissions_never_change_state(text in "[ \t\n]{0,8}") {
        let result = transition(&ExchangeState::Idle, &test_context(), Event::UserMessage {
            text,
            exchange_id: "x".to_string(),
        });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
    }

    #[test]
    fn submissions_while_awaiting_are_refused(text in arb_text()) {
        let state = ExchangeState::Awaiting { exchange_id: "x1".to_string() };
        let result = transition(&state, &test_context(), Event::UserMessage {
            text,
            exchange_id: "x2".to_string(),
        });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn every_failure_kind_appends_the_same_fallback(kind in arb_error_kind(), message in ".{0,40}") {
        let state = ExchangeState::Awaiting { exchange_id: "x1".to_string() };
        let result = transition(&state, &test_context(), Event::ReplyFailed {
            exchange_id: "x1".to_string(),
            error_kind: kind,
            message,
        }).unwrap();
        prop_assert_eq!(result.new_state, ExchangeState::Idle);
        prop_assert_eq!(appended(&result.effects), vec![(Speaker::Bot, "fallback".to_string())]);
    }

    #[test]
    fn replay_keeps_transcript_consistent(steps in proptest::collection::vec(arb_step(), 0..40)) {
        let context = test_context();
        let mut state = ExchangeState::Idle;
        let mut turns: Vec<(Speaker, String)> = vec![(Speaker::Bot, "greeting".to_string())];
        let mut next_id = 0u32;

        for step in steps {
            let before_len = turns.len();
            let before_state = state.clone();
            let event = match step {
                Step::Submit(text) => {
                    next_id += 1;
                    Event::UserMessage { text, exchange_id: format!("x{next_id}") }
                }
                Step::Reply { current, text } => Event::ReplyReceived {
                    exchange_id: current_id(&state).filter(|_| current).unwrap_or_else(|| "other".to_string()),
                    text,
                },
                Step::Fail { current, kind } => Event::ReplyFailed {
                    exchange_id: current_id(&state).filter(|_| current).unwrap_or_else(|| "other".to_string()),
                    error_kind: kind,
                    message: "boom".to_string(),
                },
            };
            let submitted = match &event {
                Event::UserMessage { text, .. } => Some(text.clone()),
                _ => None,
            };

            match transition(&state, &context, event) {
                Ok(result) => {
                    let new_turns = appended(&result.effects);
                    // Exactly one turn per accepted event
                    prop_assert_eq!(new_turns.len(), 1);
                    if let Some(text) = submitted {
                        prop_assert!(!before_state.is_pending());
                        prop_assert!(result.new_state.is_pending());
                        prop_assert_eq!(&new_turns[0], &(Speaker::User, text));
                        let requests = result.effects.iter()
                            .filter(|e| matches!(e, Effect::RequestReply { .. }))
                            .count();
                        prop_assert_eq!(requests, 1);
                    } else {
                        prop_assert!(before_state.is_pending());
                        prop_assert!(!result.new_state.is_pending());
                        prop_assert_eq!(new_turns[0].0, Speaker::Bot);
                    }
                    prop_assert!(result.effects.contains(&Effect::NotifyObservers));
                    turns.extend(new_turns);
                    state = result.new_state;
                }
                Err(_) => {
                    prop_assert_eq!(turns.len(), before_len);
                }
            }

            // User and bot turns alternate after the greeting
            for (i, (speaker, _)) in turns.iter().enumerate() {
                let expected = if i % 2 == 1 { Speaker::User } else { Speaker::Bot };
                prop_assert_eq!(*speaker, expected);
            }
            // Odd length exactly when idle
            prop_assert_eq!(turns.len() % 2 == 0, state.is_pending());
        }
    }
}
