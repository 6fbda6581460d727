use async_trait::async_trait;

use crate::errors::ProviderError;

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.12;

/// One explanation request to a chat-completions endpoint. The defaults
/// favor short deterministic output over creative prose.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A chat-completions backend. Implementations return the assistant text
/// with surrounding whitespace trimmed, or a classified [`ProviderError`].
#[async_trait]
pub trait ChatProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}
