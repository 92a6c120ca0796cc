//! Common types for answering-service interactions

/// Request to the answering service
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    /// Build the request for a raw user message.
    ///
    /// Only the message itself is sent, quoted and prefixed with a space.
    /// Earlier turns are never included.
    pub fn from_user_text(text: &str) -> Self {
        Self::new(format!(" \"{text}\""))
    }
}

/// Response from the answering service
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some("STOP".to_string()),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
