use thiserror::Error;

/// Cache faults. Callers treat these as soft failures: a broken cache must
/// never take down an explanation request.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failed: {0}")]
    Backend(String),
}

impl CacheError {
    pub fn backend(detail: &str) -> Self {
        Self::Backend(detail.to_string())
    }
}
