use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use errlens_cache::{CacheKey, ExplanationCache};
use errlens_core::{build_prompt, fingerprint, normalize, redact, ErrorReport, SYSTEM_PROMPT};
use errlens_provider::{provider_for, ChatProvider, ChatRequest, ProviderError};

use crate::settings::ExplainerSettings;

const LOG_SNIPPET_CHARS: usize = 200;

/// Result of one explanation request. `cached` tells the client whether the
/// text came straight from the cache.
#[derive(Clone, Debug, Serialize)]
pub struct ExplainOutcome {
    pub explanation: String,
    pub cached: bool,
}

impl ExplainOutcome {
    fn fresh(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            cached: false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Drives the whole pipeline: redact, cache lookup, prompt, provider call,
/// normalize, cache store. Never returns an error; every failure becomes a
/// readable explanation string.
pub struct Explainer {
    settings: ExplainerSettings,
    cache: Arc<dyn ExplanationCache>,
    provider_override: Option<Arc<dyn ChatProvider>>,
}

impl Explainer {
    pub fn new(settings: ExplainerSettings, cache: Arc<dyn ExplanationCache>) -> Self {
        Self {
            settings,
            cache,
            provider_override: None,
        }
    }

    /// Replaces provider resolution with a fixed client. Used by tests and
    /// by deployments that point at a compatible self-hosted endpoint.
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider_override = Some(provider);
        self
    }

    pub fn settings(&self) -> &ExplainerSettings {
        &self.settings
    }

    pub async fn explain(
        &self,
        report: &ErrorReport,
        session_user: Option<&str>,
        user_roles: &[String],
    ) -> ExplainOutcome {
        let snippet: String = report.raw_message.chars().take(LOG_SNIPPET_CHARS).collect();
        info!(target: "errlens::explain", snippet = %snippet, "explain requested");

        match session_user {
            Some(user) if user != "Guest" => {}
            _ => {
                return ExplainOutcome::fresh("❌ You must be logged in to use ErrLens.");
            }
        }

        if !self.settings.enabled {
            return ExplainOutcome::fresh(
                "❌ ErrLens is currently disabled. Enable it in ErrLens Settings.",
            );
        }

        let Some(api_key) = self.settings.api_key() else {
            return ExplainOutcome::fresh(
                "❌ No API key found. Add an API key in ErrLens Settings.",
            );
        };

        let redacted = redact(&report.raw_message);
        let key = CacheKey(fingerprint(
            &redacted,
            report.doctype.as_deref(),
            report.docname.as_deref(),
            &self.settings.provider,
            &self.settings.model,
        ));

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                return ExplainOutcome {
                    explanation: cached,
                    cached: true,
                }
            }
            Ok(None) => {}
            Err(err) => {
                debug!(target: "errlens::explain", error = %err, "cache lookup failed, treating as miss");
            }
        }

        let prompt = build_prompt(
            &redacted,
            report.doctype.as_deref(),
            report.docname.as_deref(),
            report.route.as_deref(),
            user_roles,
        );
        let request = ChatRequest::new(self.settings.model.as_str(), SYSTEM_PROMPT, prompt);

        let completion = match self.resolve_provider(api_key) {
            Ok(provider) => provider.complete(&request).await,
            Err(ProviderError::Unsupported(name)) => {
                // Configuration denial: stays flat like the checks above.
                return ExplainOutcome::fresh(format!("❌ Unsupported provider: {name}"));
            }
            Err(err) => Err(err),
        };

        let (raw_text, provider_ok) = match completion {
            Ok(text) => (text, true),
            Err(err) => {
                warn!(target: "errlens::explain", error = %err, provider = %self.settings.provider, "provider call failed");
                let template = self.describe_provider_failure(&err);
                // Feed the template through the normalizer as the cause
                // section so the output keeps the two-section shape.
                (
                    format!("What Went Wrong:\n{template}\n\nHow to Fix It:\n"),
                    false,
                )
            }
        };

        let explanation = normalize(&raw_text, &redacted, report.doctype.as_deref()).render();

        if provider_ok {
            if let Err(err) = self
                .cache
                .set(&key, &explanation, self.settings.cache_ttl())
                .await
            {
                debug!(target: "errlens::explain", error = %err, "cache store failed, continuing");
            }
        }

        ExplainOutcome::fresh(explanation)
    }

    pub fn health(&self) -> HealthReport {
        if !self.settings.enabled {
            return HealthReport {
                status: "disabled",
                message: Some("ErrLens is disabled".to_string()),
                enabled: None,
                provider: None,
                model: None,
            };
        }
        if self.settings.api_key().is_none() {
            return HealthReport {
                status: "error",
                message: Some("API key not set".to_string()),
                enabled: None,
                provider: None,
                model: None,
            };
        }
        HealthReport {
            status: "healthy",
            message: None,
            enabled: Some(true),
            provider: Some(self.settings.provider.trim().to_lowercase()),
            model: Some(self.settings.model.clone()),
        }
    }

    fn resolve_provider(&self, api_key: &str) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        if let Some(provider) = self.provider_override.as_ref() {
            return Ok(provider.clone());
        }
        provider_for(&self.settings.provider, api_key).map(Arc::from)
    }

    fn describe_provider_failure(&self, err: &ProviderError) -> String {
        let provider = &self.settings.provider;
        match err {
            ProviderError::AuthFailure(_) => {
                format!("❌ Invalid {provider} API key. Check ErrLens Settings.")
            }
            ProviderError::RateLimited(_) => {
                format!("❌ {provider} API limit reached. Try again later or check your account quota.")
            }
            ProviderError::Timeout(_) => {
                format!("❌ {provider} service timeout. Please retry.")
            }
            ProviderError::ModelUnavailable(_) => {
                format!("❌ {provider} model '{}' is unavailable.", self.settings.model)
            }
            ProviderError::Unsupported(name) => {
                format!("❌ Unsupported provider: {name}")
            }
            ProviderError::Unclassified(detail) => {
                format!("❌ {provider} API error: {detail}")
            }
        }
    }
}

/// Canned error messages for exercising the pipeline end to end without a
/// real failure. Unknown kinds fall back to the validation message.
pub fn test_error_message(kind: &str) -> &'static str {
    match kind {
        "attribute" => "AttributeError: 'Sales Order' object has no attribute 'test_field'",
        "permission" => "PermissionError: You don't have permission to access this document",
        "syntax" => "SyntaxError: invalid syntax in test_script.py line 10",
        "database" => "ProgrammingError: column 'test_column' does not exist",
        "nameerror" => "NameError: name 'frape' is not defined",
        _ => "ValidationError: Test validation error for ErrLens testing",
    }
}
