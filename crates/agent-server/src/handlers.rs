//! HTTP Handlers

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

/// Reply used when the model returns no text
pub const EMPTY_REPLY: &str = "Agent processing complete";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
    pub mock_market_data: bool,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub response: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn bad_request(error: &str) -> Response {
        let body = Self {
            error: error.into(),
            message: None,
            details: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.advisor.agent().provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.info().name,
        provider_connected,
        mock_market_data: state.mock_market_data,
    })
}

/// `POST /api/agent`
///
/// The body is parsed by hand so that a missing or non-string `message`
/// maps to the 400 payload instead of an extractor rejection.
pub async fn agent_message(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let Some(message) = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    else {
        return ErrorResponse::bad_request("Message is required");
    };

    let request_id = uuid::Uuid::new_v4();
    info!(%request_id, chars = message.len(), "Agent request");

    match state.advisor.handle(message).await {
        Ok(text) => {
            let response = if text.trim().is_empty() {
                EMPTY_REPLY.to_string()
            } else {
                text
            };
            Json(AgentResponse {
                response,
                timestamp: now(),
            })
            .into_response()
        }
        Err(e) if e.is_inference_failure() => {
            error!(%request_id, error = %e, "Model inference failed");
            Json(AgentResponse {
                response: format!(
                    "I apologize, but I encountered an error while processing your request: {e}. Please try again."
                ),
                timestamp: now(),
            })
            .into_response()
        }
        Err(e) => {
            error!(%request_id, error = %e, "Agent request failed");
            let body = ErrorResponse {
                error: "Failed to process request".into(),
                message: Some(e.user_message()),
                details: state.debug.then(|| format!("{e:?}")),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// `GET /api/agent`: static capability descriptor
pub async fn agent_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "YieldForge Agent API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST": "/api/agent - Send message to agent",
        },
        "agent": {
            "name": "YieldForge",
            "description": "Autonomous DeFi Yield Optimizer",
            "features": [
                "Yield pool scanning",
                "Risk profile analysis",
                "Harvest simulation",
                "Frax Finance integration",
                "Fraxtal testnet ready",
            ],
            "tools": state.advisor.registry().names(),
        },
    }))
}
