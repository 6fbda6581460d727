pub use crate::chat::{ChatProvider, ChatRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use crate::errors::ProviderError;
pub use crate::groq::{GroqClient, GroqConfig};
pub use crate::openai::{OpenAiClient, OpenAiConfig};
pub use crate::provider_for;
