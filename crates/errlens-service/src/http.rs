use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use errlens_cache::MemoryCache;
use errlens_core::ErrorReport;

use crate::orchestrator::{test_error_message, ExplainOutcome, Explainer, HealthReport};
use crate::settings::ExplainerSettings;

const SESSION_USER_HEADER: &str = "x-session-user";
const USER_ROLES_HEADER: &str = "x-user-roles";

#[derive(Clone)]
pub struct AppState {
    pub explainer: Arc<Explainer>,
}

#[derive(Deserialize)]
struct ExplainPayload {
    message: String,
    #[serde(default)]
    doctype: Option<String>,
    #[serde(default)]
    docname: Option<String>,
    #[serde(default)]
    route: Option<String>,
}

impl ExplainPayload {
    fn into_report(self) -> ErrorReport {
        let mut report = ErrorReport::new(self.message);
        report.doctype = self.doctype;
        report.docname = self.docname;
        report.route = self.route;
        report
    }
}

#[derive(Deserialize)]
struct TestPayload {
    #[serde(default = "default_error_type")]
    error_type: String,
}

fn default_error_type() -> String {
    "validation".to_string()
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = ExplainerSettings::from_env()?;
    let explainer = Arc::new(Explainer::new(settings, Arc::new(MemoryCache::new())));
    let app = build_router(AppState { explainer });

    let listen = std::env::var("ERRLENS_LISTEN").unwrap_or_else(|_| "127.0.0.1:9000".into());
    let addr: SocketAddr = listen.parse()?;
    info!("listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/explain", post(explain_handler))
        .route("/v1/explain/test", post(test_handler))
        .route("/v1/health", get(health_handler))
        .with_state(state)
}

fn session_user(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|user| !user.is_empty())
}

fn user_roles(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(USER_ROLES_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn explain_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ExplainPayload>,
) -> Json<ExplainOutcome> {
    let roles = user_roles(&headers);
    let report = payload.into_report();
    let outcome = state
        .explainer
        .explain(&report, session_user(&headers), &roles)
        .await;
    Json(outcome)
}

async fn test_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TestPayload>,
) -> Json<Value> {
    let message = test_error_message(&payload.error_type);
    let report = ErrorReport::new(message)
        .with_doctype("Test DocType")
        .with_docname("TEST-001");
    let roles = user_roles(&headers);
    let outcome = state
        .explainer
        .explain(&report, session_user(&headers), &roles)
        .await;
    Json(json!({
        "status": "success",
        "error_message": message,
        "explanation": outcome.explanation,
        "cached": outcome.cached,
    }))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.explainer.health())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use tower::ServiceExt;

    use async_trait::async_trait;
    use errlens_provider::{ChatProvider, ChatRequest, ProviderError};

    const BODY_LIMIT: usize = 1_048_576;

    #[derive(Debug)]
    struct FixedProvider {
        text: &'static str,
    }

    #[async_trait]
    impl ChatProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<String, ProviderError> {
            Ok(self.text.to_string())
        }
    }

    fn router_with(settings: ExplainerSettings, provider_text: &'static str) -> Router {
        let explainer = Explainer::new(settings, Arc::new(MemoryCache::new()))
            .with_provider(Arc::new(FixedProvider {
                text: provider_text,
            }));
        build_router(AppState {
            explainer: Arc::new(explainer),
        })
    }

    fn configured() -> ExplainerSettings {
        ExplainerSettings::default().with_api_key("test-key")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse json")
    }

    const MODEL_TEXT: &str = "What Went Wrong:\nThe Sales Order DocType rejected a missing mandatory field during save.\n\nHow to Fix It:\n1. Open the document.\n2. Fill the field.\n3. Save again.";

    fn explain_request(with_user: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/explain")
            .header(CONTENT_TYPE, "application/json");
        if with_user {
            builder = builder
                .header(SESSION_USER_HEADER, "alice")
                .header(USER_ROLES_HEADER, "System Manager, Sales User");
        }
        builder
            .body(Body::from(
                json!({
                    "message": "ValidationError in DocType 'Sales Order': missing customer",
                    "doctype": "Sales Order"
                })
                .to_string(),
            ))
            .expect("build request")
    }

    #[tokio::test]
    async fn explain_without_session_user_is_denied() {
        let app = router_with(configured(), MODEL_TEXT);
        let response = app.oneshot(explain_request(false)).await.expect("call");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["explanation"],
            "❌ You must be logged in to use ErrLens."
        );
        assert_eq!(body["cached"], false);
    }

    #[tokio::test]
    async fn explain_returns_two_sections_then_serves_from_cache() {
        let app = router_with(configured(), MODEL_TEXT);

        let first = app
            .clone()
            .oneshot(explain_request(true))
            .await
            .expect("call");
        assert_eq!(first.status(), StatusCode::OK);
        let first_body = json_body(first).await;
        let explanation = first_body["explanation"].as_str().unwrap();
        assert!(explanation.contains("What Went Wrong:"));
        assert!(explanation.contains("How to Fix It:"));
        assert_eq!(first_body["cached"], false);

        let second = app.oneshot(explain_request(true)).await.expect("call");
        let second_body = json_body(second).await;
        assert_eq!(second_body["cached"], true);
        assert_eq!(second_body["explanation"], first_body["explanation"]);
    }

    #[tokio::test]
    async fn test_endpoint_synthesizes_nameerror_explanation() {
        // An empty completion forces the rule-based fallback path.
        let app = router_with(configured(), "");

        let request = Request::builder()
            .method("POST")
            .uri("/v1/explain/test")
            .header(CONTENT_TYPE, "application/json")
            .header(SESSION_USER_HEADER, "alice")
            .body(Body::from(json!({"error_type": "nameerror"}).to_string()))
            .expect("build request");

        let response = app.oneshot(request).await.expect("call");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        assert!(body["error_message"].as_str().unwrap().contains("frape"));
        let explanation = body["explanation"].as_str().unwrap();
        assert!(explanation.contains("NameError"));
        assert!(explanation.contains("likely typo for 'frappe'"));
        assert!(explanation.contains("How to Fix It:"));
    }

    #[tokio::test]
    async fn health_reports_each_configuration_state() {
        let healthy = router_with(configured(), MODEL_TEXT);
        let response = healthy
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("call");
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["provider"], "groq");

        let disabled = router_with(configured().with_enabled(false), MODEL_TEXT);
        let response = disabled
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("call");
        assert_eq!(json_body(response).await["status"], "disabled");

        let keyless = router_with(ExplainerSettings::default(), MODEL_TEXT);
        let response = keyless
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("call");
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "API key not set");
    }
}
