pub mod chat;
pub mod errors;
pub mod groq;
mod http;
pub mod openai;
pub mod prelude;

pub use chat::{ChatProvider, ChatRequest};
pub use errors::ProviderError;
pub use groq::{GroqClient, GroqConfig};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Resolves a configured provider name to a client. Names are matched
/// case-insensitively; "chatgpt" is accepted as a legacy alias for OpenAI.
pub fn provider_for(
    name: &str,
    api_key: &str,
) -> Result<Box<dyn ChatProvider>, ProviderError> {
    match name.to_lowercase().as_str() {
        "groq" => Ok(Box::new(GroqClient::new(GroqConfig::new(api_key)?)?)),
        "openai" | "chatgpt" => Ok(Box::new(OpenAiClient::new(OpenAiConfig::new(api_key)?)?)),
        other => Err(ProviderError::unsupported(other)),
    }
}
