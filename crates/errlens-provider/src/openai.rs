use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Url,
};

use crate::chat::{ChatProvider, ChatRequest};
use crate::errors::ProviderError;
use crate::http::post_chat;

const PROVIDER_NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Configuration options for the OpenAI provider.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: Url,
    pub organization: Option<String>,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|err| {
            ProviderError::unclassified(PROVIDER_NAME, &format!("base url parse failed: {err}"))
        })?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            organization: None,
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, ProviderError> {
        self.base_url = Url::parse(base_url.as_ref()).map_err(|err| {
            ProviderError::unclassified(PROVIDER_NAME, &format!("base url parse failed: {err}"))
        })?;
        if !self.base_url.path().ends_with('/') {
            self.base_url
                .set_path(&format!("{}/", self.base_url.path().trim_end_matches('/')));
        }
        Ok(self)
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    chat_url: Url,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = format!("Bearer {}", config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|err| {
                ProviderError::auth_failure(PROVIDER_NAME, &format!("invalid api key: {err}"))
            })?,
        );
        if let Some(org) = config.organization.as_ref() {
            headers.insert(
                reqwest::header::HeaderName::from_static("openai-organization"),
                HeaderValue::from_str(org).map_err(|err| {
                    ProviderError::unclassified(
                        PROVIDER_NAME,
                        &format!("invalid organization header: {err}"),
                    )
                })?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                ProviderError::unclassified(PROVIDER_NAME, &format!("client build failed: {err}"))
            })?;

        let chat_url = config.base_url.join(CHAT_COMPLETIONS_PATH).map_err(|err| {
            ProviderError::unclassified(PROVIDER_NAME, &format!("chat url join failed: {err}"))
        })?;

        Ok(Self { client, chat_url })
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        post_chat(&self.client, &self.chat_url, PROVIDER_NAME, request).await
    }
}
