use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use errlens_cache::MemoryCache;
use errlens_provider::{GroqClient, GroqConfig};
use errlens_service::{build_router, AppState, Explainer, ExplainerSettings};

const BODY_LIMIT: usize = 1_048_576;

fn app_against(server: &MockServer) -> axum::Router {
    let config = GroqConfig::new("test-key")
        .unwrap()
        .with_base_url(server.uri())
        .unwrap();
    let provider = GroqClient::new(config).unwrap();
    let settings = ExplainerSettings::default().with_api_key("test-key");
    let explainer = Explainer::new(settings, Arc::new(MemoryCache::new()))
        .with_provider(Arc::new(provider));
    build_router(AppState {
        explainer: Arc::new(explainer),
    })
}

fn explain_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/explain")
        .header(CONTENT_TYPE, "application/json")
        .header("x-session-user", "alice")
        .header("x-user-roles", "System Manager")
        .body(Body::from(
            json!({
                "message": "AttributeError: 'Sales Order' object has no attribute 'customer_tier' at /home/frappe/apps/custom/hooks.py",
                "doctype": "Sales Order",
                "docname": "SO-0042"
            })
            .to_string(),
        ))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn full_pipeline_normalizes_and_caches() {
    let server = MockServer::start().await;

    let model_output = concat!(
        "**What Went Wrong:**\n",
        "The Sales Order DocType references the attribute `customer_tier`, which does not exist on the document.\n\n",
        "How to Fix It:\n",
        "1. Open Customize Form for Sales Order.\n",
        "2. Add the customer_tier field or correct the attribute name.\n",
        "3. Save and reload.\n\n",
        "💡 Tips: always check fieldnames before deploying"
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": model_output}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server);

    let first = app.clone().oneshot(explain_request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = json_body(first).await;
    let explanation = first_body["explanation"].as_str().unwrap();

    assert!(explanation.contains("What Went Wrong:"));
    assert!(explanation.contains("How to Fix It:"));
    assert!(explanation.contains("Sales Order"));
    assert!(!explanation.contains("Tips"));
    assert!(!explanation.contains('💡'));
    assert!(!explanation.contains("**"));
    assert!(explanation.contains("1. Open Customize Form for Sales Order."));
    assert_eq!(first_body["cached"], false);

    // Second identical request must come from the cache; the mock's
    // expect(1) verifies the provider saw exactly one call.
    let second = app.oneshot(explain_request()).await.unwrap();
    let second_body = json_body(second).await;
    assert_eq!(second_body["cached"], true);
    assert_eq!(second_body["explanation"], first_body["explanation"]);
}

#[tokio::test]
async fn rate_limited_provider_yields_retry_message_and_skips_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .expect(2)
        .mount(&server)
        .await;

    let app = app_against(&server);

    let first = app.clone().oneshot(explain_request()).await.unwrap();
    let first_body = json_body(first).await;
    let explanation = first_body["explanation"].as_str().unwrap();
    assert!(explanation.contains("Groq API limit reached"));
    assert!(explanation.contains("What Went Wrong:"));
    assert!(explanation.contains("How to Fix It:"));
    assert_eq!(first_body["cached"], false);

    // Failures are never cached, so the provider is called again.
    let second = app.oneshot(explain_request()).await.unwrap();
    let second_body = json_body(second).await;
    assert_eq!(second_body["cached"], false);
}

#[tokio::test]
async fn provider_timeout_yields_retry_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "late"}}]
                }))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = GroqConfig::new("test-key")
        .unwrap()
        .with_base_url(server.uri())
        .unwrap()
        .with_timeout(std::time::Duration::from_millis(50));
    let provider = GroqClient::new(config).unwrap();
    let settings = ExplainerSettings::default().with_api_key("test-key");
    let explainer = Explainer::new(settings, Arc::new(MemoryCache::new()))
        .with_provider(Arc::new(provider));
    let app = build_router(AppState {
        explainer: Arc::new(explainer),
    });

    let response = app.oneshot(explain_request()).await.unwrap();
    let body = json_body(response).await;
    let explanation = body["explanation"].as_str().unwrap();
    assert!(explanation.contains("Groq service timeout"));
    assert_eq!(body["cached"], false);
}
