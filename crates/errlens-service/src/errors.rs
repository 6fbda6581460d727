use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn config(detail: &str) -> Self {
        Self::Config(detail.to_string())
    }
}
