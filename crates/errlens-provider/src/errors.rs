use thiserror::Error;

const DETAIL_TAIL_CHARS: usize = 150;

/// Classified failure from a provider call. The caller turns each variant
/// into a user-facing message, so the detail strings stay short and never
/// carry whole response bodies.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    AuthFailure(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("unsupported provider: {0}")]
    Unsupported(String),
    #[error("provider call failed: {0}")]
    Unclassified(String),
}

impl ProviderError {
    pub fn auth_failure(provider: &str, detail: &str) -> Self {
        Self::AuthFailure(format!("{provider}: {}", detail_tail(detail)))
    }

    pub fn rate_limited(provider: &str, detail: &str) -> Self {
        Self::RateLimited(format!("{provider}: {}", detail_tail(detail)))
    }

    pub fn timeout(provider: &str, detail: &str) -> Self {
        Self::Timeout(format!("{provider}: {}", detail_tail(detail)))
    }

    pub fn model_unavailable(provider: &str, detail: &str) -> Self {
        Self::ModelUnavailable(format!("{provider}: {}", detail_tail(detail)))
    }

    pub fn unsupported(provider: &str) -> Self {
        Self::Unsupported(provider.to_string())
    }

    pub fn unclassified(provider: &str, detail: &str) -> Self {
        Self::Unclassified(format!("{provider}: {}", detail_tail(detail)))
    }
}

fn detail_tail(detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.chars().count() <= DETAIL_TAIL_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().take(DETAIL_TAIL_CHARS).collect()
    }
}
