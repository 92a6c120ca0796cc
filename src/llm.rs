//! Answering-service abstraction
//!
//! The exchange controller only knows the `LlmService` trait. Gemini is the
//! production implementation.

mod error;
mod gemini;
mod models;
mod registry;
mod types;

pub use error::{ServiceError, ServiceErrorKind};
pub use registry::{LlmConfig, ModelRegistry, RegistryService};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for answering services
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Generate a reply for the request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError>;

    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for answering services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Answering request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Answering request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
