//! Exchange controller
//!
//! Owns the transcript, the pending flag and the draft, runs the pure
//! transition function and executes its effects. The answering call is the
//! only suspension point and the state lock is never held across it.

#[cfg(test)]
pub mod testing;

use crate::llm::{LlmRequest, LlmService};
use crate::state_machine::{transition, Effect, Event, ExchangeContext, ExchangeState};
use crate::transcript::{Transcript, Turn};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

const BROADCAST_CAPACITY: usize = 64;

/// Controller type used by the server
pub type SharedController = Arc<ExchangeController<Arc<dyn LlmService>>>;

/// Read-only copy of the observable state
#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    /// Incremented on every change to the transcript or pending flag
    pub version: u64,
    pub transcript: Transcript,
    pub pending: bool,
}

/// An accepted exchange whose reply has not been requested yet.
///
/// Must be handed to [`ExchangeController::settle`]; dropping it leaves the
/// controller awaiting forever.
#[must_use = "an accepted exchange must be settled"]
#[derive(Debug)]
pub struct PendingExchange {
    exchange_id: String,
    request: LlmRequest,
}

impl PendingExchange {
    pub fn exchange_id(&self) -> &str {
        &self.exchange_id
    }
}

struct Inner {
    state: ExchangeState,
    transcript: Transcript,
    draft: String,
    version: u64,
}

impl Inner {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            version: self.version,
            transcript: self.transcript.clone(),
            pending: self.state.is_pending(),
        }
    }
}

pub struct ExchangeController<L: LlmService> {
    context: ExchangeContext,
    llm: L,
    inner: Mutex<Inner>,
    broadcast_tx: broadcast::Sender<ChatSnapshot>,
}

impl<L: LlmService> ExchangeController<L> {
    pub fn new(context: ExchangeContext, llm: L) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let inner = Inner {
            state: ExchangeState::Idle,
            transcript: Transcript::with_greeting(context.greeting.clone()),
            draft: String::new(),
            version: 0,
        };
        Self {
            context,
            llm,
            inner: Mutex::new(inner),
            broadcast_tx,
        }
    }

    /// Submit user text and wait until the exchange settles.
    ///
    /// Blank text and submissions while an exchange is in flight are ignored.
    /// Service failures end up in the transcript as the fallback turn and are
    /// never returned.
    ///
    /// The server runs the same two steps through [`spawn_submit`](Self::spawn_submit)
    /// so the exchange survives a dropped request; this form is for in-process callers.
    #[allow(dead_code)]
    pub async fn submit(&self, text: &str) {
        if let Some(exchange) = self.try_begin(text).await {
            self.settle(exchange).await;
        }
    }

    /// Admission half of [`submit`](Self::submit).
    ///
    /// Appends the user turn and enters the awaiting state, or returns `None`
    /// when the submission is ignored. The draft is cleared either way.
    pub async fn try_begin(&self, text: &str) -> Option<PendingExchange> {
        let mut inner = self.inner.lock().await;
        inner.draft.clear();

        let exchange_id = uuid::Uuid::new_v4().to_string();
        let event = Event::UserMessage {
            text: text.to_string(),
            exchange_id: exchange_id.clone(),
        };

        match self.apply(&mut inner, event) {
            Ok(exchange) => {
                tracing::info!(exchange_id = %exchange_id, "Exchange started");
                exchange
            }
            Err(e) => {
                tracing::debug!(reason = %e, "Submission ignored");
                None
            }
        }
    }

    /// Settlement half of [`submit`](Self::submit): call the answering
    /// service and append its reply, or the fallback on failure.
    pub async fn settle(&self, exchange: PendingExchange) {
        let PendingExchange {
            exchange_id,
            request,
        } = exchange;

        let event = match self.llm.complete(&request).await {
            Ok(response) => Event::ReplyReceived {
                exchange_id,
                text: response.text,
            },
            Err(e) => Event::ReplyFailed {
                exchange_id,
                error_kind: e.kind,
                message: e.message,
            },
        };

        if let Event::ReplyFailed {
            exchange_id,
            error_kind,
            message,
        } = &event
        {
            tracing::warn!(
                exchange_id = %exchange_id,
                kind = error_kind.as_str(),
                error = %message,
                "Answering service failed, appending fallback"
            );
        }

        let mut inner = self.inner.lock().await;
        inner.draft.clear();
        let exchange_id = event.exchange_id().to_string();
        match self.apply(&mut inner, event) {
            Ok(_) => tracing::info!(exchange_id = %exchange_id, "Exchange settled"),
            Err(e) => tracing::error!(exchange_id = %exchange_id, error = %e, "Reply dropped"),
        }
    }

    /// Submit on a detached task so the exchange outlives the caller.
    ///
    /// Returns whether the submission was accepted.
    pub async fn spawn_submit(self: &Arc<Self>, text: &str) -> bool
    where
        L: 'static,
    {
        match self.try_begin(text).await {
            Some(exchange) => {
                tracing::debug!(exchange_id = exchange.exchange_id(), "Settling on background task");
                let controller = Arc::clone(self);
                tokio::spawn(async move { controller.settle(exchange).await });
                true
            }
            None => false,
        }
    }

    /// Current transcript and pending flag
    pub async fn observe_state(&self) -> ChatSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> broadcast::Receiver<ChatSnapshot> {
        self.broadcast_tx.subscribe()
    }

    /// Current snapshot plus a receiver for every change after it
    pub async fn observe_and_subscribe(&self) -> (ChatSnapshot, broadcast::Receiver<ChatSnapshot>) {
        let inner = self.inner.lock().await;
        (inner.snapshot(), self.broadcast_tx.subscribe())
    }

    /// Replace the not-yet-submitted text
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.inner.lock().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.inner.lock().await.draft.clone()
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Run one transition and execute its effects under the caller's lock
    fn apply(
        &self,
        inner: &mut Inner,
        event: Event,
    ) -> Result<Option<PendingExchange>, crate::state_machine::TransitionError> {
        let result = transition(&inner.state, &self.context, event)?;
        inner.state = result.new_state;

        let mut pending = None;
        for effect in result.effects {
            match effect {
                Effect::AppendTurn { speaker, text } => {
                    inner.transcript.push(Turn::new(speaker, text));
                    inner.version += 1;
                }
                Effect::NotifyObservers => {
                    // No receivers is fine
                    let _ = self.broadcast_tx.send(inner.snapshot());
                }
                Effect::RequestReply {
                    exchange_id,
                    request,
                } => {
                    pending = Some(PendingExchange {
                        exchange_id,
                        request,
                    });
                }
            }
        }
        Ok(pending)
    }
}
