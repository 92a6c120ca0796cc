//! Built-in model definitions
//!
//! Every model the widget can answer with is listed here; the registry
//! builds services from this table.

use super::gemini::{GeminiModel, GeminiService};
use super::LlmService;
use std::sync::Arc;
use std::time::Duration;

/// Factory building a service from an API key, optional gateway and timeout
pub type ModelFactory = fn(&str, Option<&str>, Duration) -> Result<Arc<dyn LlmService>, String>;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gemini-1.5-flash")
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    pub factory: ModelFactory,
}

/// Model used when `CHAT_MODEL` is not set
pub const DEFAULT_MODEL_ID: &str = "gemini-1.5-flash";

fn gemini_factory(
    model: GeminiModel,
    api_key: &str,
    gateway: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!("{} requires GEMINI_API_KEY or gateway", model.api_name()));
    }
    let service = GeminiService::new(api_key.to_string(), model, gateway, timeout)
        .map_err(|e| e.to_string())?;
    Ok(Arc::new(service))
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-1.5-flash",
            description: "Gemini 1.5 Flash (fast, default)",
            factory: |api_key, gateway, timeout| {
                gemini_factory(GeminiModel::Gemini15Flash, api_key, gateway, timeout)
            },
        },
        ModelDef {
            id: "gemini-1.5-pro",
            description: "Gemini 1.5 Pro (more capable, slower)",
            factory: |api_key, gateway, timeout| {
                gemini_factory(GeminiModel::Gemini15Pro, api_key, gateway, timeout)
            },
        },
        ModelDef {
            id: "gemini-2.0-flash",
            description: "Gemini 2.0 Flash",
            factory: |api_key, gateway, timeout| {
                gemini_factory(GeminiModel::Gemini20Flash, api_key, gateway, timeout)
            },
        },
    ]
}
