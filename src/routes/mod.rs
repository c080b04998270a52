//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers), tighten for production
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route(
            "/api/v1/paths",
            get(http::http_list_paths).post(http::http_create_path),
        )
        .route(
            "/api/v1/paths/:id",
            get(http::http_get_path)
                .patch(http::http_update_path)
                .delete(http::http_delete_path),
        )
        .route("/api/v1/paths/:id/solve", post(http::http_solve))
        .route("/api/v1/paths/:id/skip/:position", post(http::http_skip))
        .route("/api/v1/paths/:id/attempt", post(http::http_attempt))
        .route("/api/v1/paths/:id/hint", get(http::http_hint))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::{AppConfig, GenerationConfig};
    use crate::seeds::seed_problems;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let cfg = AppConfig {
            generation: GenerationConfig { seed: Some(5), ..GenerationConfig::default() },
            ..AppConfig::default()
        };
        let state = AppState::with_parts(Arc::new(InMemoryCatalog::new(seed_problems())), cfg, None);
        build_router(Arc::new(state))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    fn dp_request(forced: bool) -> Value {
        json!({
            "topics": ["dp"],
            "minRating": 1100,
            "maxRating": 1500,
            "mode": "learning",
            "problemCount": 4,
            "forcedMode": forced
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn create_then_progress_over_http() {
        let app = app();
        let (status, created) = call(&app, Method::POST, "/api/v1/paths", Some(dp_request(true))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["totalProblems"], 4);
        assert_eq!(created["problems"][0]["status"], "unlocked");
        assert_eq!(created["problems"][1]["status"], "locked");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = call(&app, Method::POST, &format!("/api/v1/paths/{id}/skip/3"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let first = created["problems"][0]["problem"]["id"].clone();
        let (status, out) = call(
            &app,
            Method::POST,
            &format!("/api/v1/paths/{id}/solve"),
            Some(json!({ "problemId": first })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["changed"], true);
        assert_eq!(out["path"]["currentPosition"], 1);
        assert_eq!(out["path"]["currentProblem"], 2);

        let (status, hint) = call(&app, Method::GET, &format!("/api/v1/paths/{id}/hint?position=2&level=2"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hint["source"], "local");

        let (_, list) = call(&app, Method::GET, "/api/v1/paths?status=active", None).await;
        assert_eq!(list["total"], 1);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let app = app();
        let mut bad = dp_request(false);
        bad["minRating"] = json!(2500);
        let (status, body) = call(&app, Method::POST, "/api/v1/paths", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let mut none = dp_request(false);
        none["topics"] = json!(["no-such-topic"]);
        let (status, body) = call(&app, Method::POST, "/api/v1/paths", Some(none)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "insufficient_candidates");

        let missing = uuid::Uuid::new_v4();
        let (status, body) = call(&app, Method::GET, &format!("/api/v1/paths/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn malformed_input_is_an_invalid_request() {
        let app = app();
        let mut negative = dp_request(false);
        negative["problemCount"] = json!(-3);
        let (status, body) = call(&app, Method::POST, "/api/v1/paths", Some(negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("problemCount"));

        let (status, body) = call(&app, Method::GET, "/api/v1/paths/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, body) = call(&app, Method::GET, "/api/v1/paths?status=finished", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let mut wide = dp_request(false);
        wide["minRating"] = json!(-1_000_000_000);
        let (status, body) = call(&app, Method::POST, "/api/v1/paths", Some(wide)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let app = app();
        let (_, created) = call(&app, Method::POST, "/api/v1/paths", Some(dp_request(false))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::DELETE, &format!("/api/v1/paths/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/paths/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
