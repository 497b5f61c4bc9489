use crate::agent::ResearchAgent;
use crate::models::{ErrorBody, ResearchRequest, ResearchResponse};
use crate::normalize::{self, NormalizeError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn ResearchAgent>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Query is required")]
    MissingQuery,
    #[error("An internal error occurred: {0}")]
    Agent(anyhow::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, output) = match &self {
            ApiError::MissingQuery => (StatusCode::BAD_REQUEST, "BadRequest".to_string(), None),
            ApiError::Agent(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AgentError".to_string(),
                None,
            ),
            ApiError::Normalize(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.kind().to_string(),
                Some(e.output().to_string()),
            ),
        };
        let body = ErrorBody {
            error: self.to_string(),
            kind: Some(kind),
            output,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(home))
        .route("/api/research", post(research))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "Research Assistant API is running!" }))
}

#[instrument(skip(state, req), fields(request_id = %Uuid::new_v4()))]
async fn research(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let start_time = std::time::Instant::now();
    let query = req.query().ok_or(ApiError::MissingQuery)?;
    info!("Starting research for query: {}", query);

    let raw_output = state
        .agent
        .invoke(query, &req.chat_history)
        .await
        .map_err(|e| {
            error!("Error during agent execution: {:#}", e);
            ApiError::Agent(e)
        })?;

    let response = normalize::normalize(&raw_output).map_err(|e| {
        warn!(kind = %e.kind(), "Agent output rejected: {}", e);
        ApiError::from(e)
    })?;

    info!("Research completed in {:?}", start_time.elapsed());
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatTurn;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replays a canned reply and remembers what it was asked.
    struct FakeAgent {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl FakeAgent {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ResearchAgent for FakeAgent {
        async fn invoke(&self, query: &str, chat_history: &[ChatTurn]) -> anyhow::Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), chat_history.len()));
            self.reply.clone().map_err(anyhow::Error::msg)
        }
    }

    async fn post_research(agent: Arc<FakeAgent>, body: Value) -> (StatusCode, Value) {
        let app = router(AppState { agent });
        let req = Request::builder()
            .method("POST")
            .uri("/api/research")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn fenced_agent_reply_becomes_structured_response() {
        let agent = FakeAgent::replying(
            "```json\n{\"topic\":\"AI\",\"summary\":\"s\",\"sources\":[\"a\",\"b\"],\"tools_used\":[\"search\"]}\n```",
        );
        let (status, body) = post_research(
            agent.clone(),
            json!({
                "query": "  what is AI?  ",
                "chat_history": [{"role": "user", "content": "hi"}],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "topic": "AI",
                "summary": "s",
                "sources": ["a", "b"],
                "tools_used": ["search"],
            })
        );
        assert_eq!(
            *agent.seen.lock().unwrap(),
            vec![("what is AI?".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn absent_optional_fields_serialize_as_null() {
        let agent = FakeAgent::replying(r#"{"topic":"AI","tools_used":[]}"#);
        let (status, body) = post_research(agent, json!({ "query": "AI" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], Value::Null);
        assert_eq!(body["sources"], Value::Null);
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_calling_agent() {
        let agent = FakeAgent::replying("{}");
        for request in [json!({}), json!({ "query": "   " })] {
            let (status, body) = post_research(agent.clone(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Query is required", "kind": "BadRequest" }));
        }
        assert!(agent.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prose_reply_is_reported_as_malformed() {
        let agent = FakeAgent::replying("I could not find anything.");
        let (status, body) = post_research(agent, json!({ "query": "AI" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "MalformedOutput");
        assert_eq!(body["output"], "I could not find anything.");
        assert_eq!(
            body["error"],
            "Failed to extract JSON from agent output: I could not find anything."
        );
    }

    #[tokio::test]
    async fn incomplete_reply_is_reported_as_validation_error() {
        let agent = FakeAgent::replying(r#"{"topic":"AI"}"#);
        let (status, body) = post_research(agent, json!({ "query": "AI" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "ValidationError");
        assert_eq!(body["output"], r#"{"topic":"AI"}"#);
    }

    #[tokio::test]
    async fn agent_failure_is_internal_error() {
        let agent = FakeAgent::failing("quota exceeded");
        let (status, body) = post_research(agent, json!({ "query": "AI" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "An internal error occurred: quota exceeded", "kind": "AgentError" })
        );
    }

    #[tokio::test]
    async fn banner_route_reports_running() {
        let app = router(AppState {
            agent: FakeAgent::replying("{}"),
        });
        let req = Request::builder().uri("/api").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": "Research Assistant API is running!" }));
    }
}
