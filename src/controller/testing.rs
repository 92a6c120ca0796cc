//! Mock answering services for testing
//!
//! These mocks enable controller and router tests without network I/O.

use crate::llm::{LlmRequest, LlmResponse, LlmService, ServiceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock service that returns queued replies
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, ServiceError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    pub fn queue_error(&self, error: ServiceError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Gated LLM Service (for in-flight testing)
// ============================================================================

/// Mock service that holds each request until the test releases it
pub struct GatedLlmService {
    model_id: String,
    gate: Mutex<Option<oneshot::Receiver<Result<String, ServiceError>>>>,
    release_tx: Mutex<Option<oneshot::Sender<Result<String, ServiceError>>>>,
    requests: Mutex<Vec<LlmRequest>>,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Notify,
}

impl GatedLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            model_id: model_id.into(),
            gate: Mutex::new(Some(rx)),
            release_tx: Mutex::new(Some(tx)),
            requests: Mutex::new(Vec::new()),
            request_started: Notify::new(),
        }
    }

    /// Let the held request finish with the given outcome
    pub fn release(&self, outcome: Result<String, ServiceError>) {
        if let Some(tx) = self.release_tx.lock().unwrap().take() {
            let _ = tx.send(outcome);
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmService for GatedLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        let gate = self.gate.lock().unwrap().take();
        self.request_started.notify_one();

        let Some(gate) = gate else {
            return Err(ServiceError::unknown("Gated mock accepts a single request"));
        };
        match gate.await {
            Ok(outcome) => outcome.map(LlmResponse::text),
            Err(_) => Err(ServiceError::network("Gate dropped")),
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
