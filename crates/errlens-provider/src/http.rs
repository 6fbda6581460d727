use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::chat::ChatRequest;
use crate::errors::ProviderError;

#[derive(Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: InboundMessage,
}

#[derive(Deserialize)]
struct InboundMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one chat-completions request and returns the trimmed assistant
/// text. Both supported providers speak the same wire dialect, so the
/// request body and response decoding live here once.
pub(crate) async fn post_chat(
    client: &Client,
    chat_url: &Url,
    provider: &str,
    request: &ChatRequest,
) -> Result<String, ProviderError> {
    let payload = CompletionPayload {
        model: &request.model,
        messages: vec![
            WireMessage {
                role: "system",
                content: &request.system_prompt,
            },
            WireMessage {
                role: "user",
                content: &request.user_prompt,
            },
        ],
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    };

    let response = client
        .post(chat_url.clone())
        .json(&payload)
        .send()
        .await
        .map_err(|err| from_transport(provider, err))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_http_error(provider, status, &body));
    }

    let decoded: CompletionResponse = response
        .json()
        .await
        .map_err(|err| ProviderError::unclassified(provider, &format!("response decode: {err}")))?;

    decoded
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ProviderError::unclassified(provider, "response carried no choices"))
}

fn from_transport(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, "no response within the request timeout")
    } else {
        ProviderError::unclassified(provider, &format!("request error: {err}"))
    }
}

pub(crate) fn map_http_error(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::auth_failure(provider, body)
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(provider, body),
        StatusCode::NOT_FOUND => ProviderError::model_unavailable(provider, body),
        _ if mentions_model_issue(body) => ProviderError::model_unavailable(provider, body),
        _ => ProviderError::unclassified(
            provider,
            &format!("status {}: {body}", status.as_u16()),
        ),
    }
}

fn mentions_model_issue(body: &str) -> bool {
    let lowered = body.to_lowercase();
    lowered.contains("model_not_found")
        || lowered.contains("model_decommissioned")
        || lowered.contains("does not exist or you do not have access")
}
