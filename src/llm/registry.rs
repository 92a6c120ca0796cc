//! Model registry and answering-service configuration

use super::models::{all_models, ModelDef, DEFAULT_MODEL_ID};
use super::{LlmRequest, LlmResponse, LlmService, LoggingService, ServiceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to each answering call when `CHAT_LLM_TIMEOUT_SECS` is unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the answering service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Gateway base URL; when set the key is not sent
    pub gateway: Option<String>,
    pub default_model: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gateway: None,
            default_model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            default_model: std::env::var("CHAT_MODEL").ok(),
            timeout: std::env::var("CHAT_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        }
    }
}

/// Registry of available models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Self {
            services,
            default_model,
        }
    }

    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode the gateway handles authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            config.gemini_api_key.clone()?
        };

        match (model_def.factory)(&api_key, config.gateway.as_deref(), config.timeout) {
            Ok(service) => {
                tracing::debug!(model = model_def.id, description = model_def.description, "Model available");
                Some(Arc::new(LoggingService::new(service)))
            }
            Err(e) => {
                tracing::debug!(model = model_def.id, error = %e, "Model unavailable");
                None
            }
        }
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}

/// Answering service backed by the registry's default model.
///
/// Without a configured model every call fails, so exchanges still settle
/// with the fallback turn.
pub struct RegistryService {
    registry: Arc<ModelRegistry>,
}

impl RegistryService {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl LlmService for RegistryService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        let llm = self.registry.default().ok_or_else(|| {
            ServiceError::auth(format!(
                "Model {} is not configured (set GEMINI_API_KEY or LLM_GATEWAY)",
                self.registry.default_model_id()
            ))
        })?;
        llm.complete(request).await
    }

    fn model_id(&self) -> &str {
        self.registry.default_model_id()
    }
}
