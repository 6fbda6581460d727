use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub const DEFAULT_PROVIDER: &str = "Groq";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_CACHE_SECONDS: u64 = 1800;

/// Runtime configuration for the explainer. Loaded once at startup; the
/// API key is optional so a half-configured deployment degrades to clear
/// user-facing messages instead of failing to boot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplainerSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_cache_seconds")]
    pub cache_seconds: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_cache_seconds() -> u64 {
    DEFAULT_CACHE_SECONDS
}

impl Default for ExplainerSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: default_model(),
            cache_seconds: default_cache_seconds(),
            api_key: None,
        }
    }
}

impl ExplainerSettings {
    /// Reads `ERRLENS_*` variables, falling back to defaults for anything
    /// unset. Only a malformed value is an error.
    pub fn from_env() -> Result<Self, ServiceError> {
        let mut settings = Self::default();

        if let Ok(raw) = std::env::var("ERRLENS_ENABLED") {
            settings.enabled = parse_bool(&raw)
                .ok_or_else(|| ServiceError::config(&format!("ERRLENS_ENABLED: {raw}")))?;
        }
        if let Ok(provider) = std::env::var("ERRLENS_PROVIDER") {
            if !provider.trim().is_empty() {
                settings.provider = provider.trim().to_string();
            }
        }
        if let Ok(model) = std::env::var("ERRLENS_MODEL") {
            if !model.trim().is_empty() {
                settings.model = model.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("ERRLENS_CACHE_SECONDS") {
            settings.cache_seconds = raw
                .trim()
                .parse()
                .map_err(|_| ServiceError::config(&format!("ERRLENS_CACHE_SECONDS: {raw}")))?;
        }
        if let Ok(key) = std::env::var("ERRLENS_API_KEY") {
            if !key.trim().is_empty() {
                settings.api_key = Some(key.trim().to_string());
            }
        }

        Ok(settings)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_seconds)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_cache_seconds(mut self, cache_seconds: u64) -> Self {
        self.cache_seconds = cache_seconds;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
