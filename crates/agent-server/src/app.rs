//! Router assembly

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{agent_info, agent_message, health_check};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/agent", get(agent_info).post(agent_message))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use agent_core::provider::{Completion, GenerationOptions, ProviderInfo};
    use agent_core::{Agent, AgentError, LlmProvider, Message, Role};
    use yield_advisor::{MarketGateway, NetworkConfig, YieldAdvisor};

    use crate::handlers::EMPTY_REPLY;

    enum Reply {
        Text(&'static str),
        Fail(fn() -> AgentError),
    }

    /// Canned model; counts tool messages it receives
    struct CannedProvider {
        reply: Reply,
        tool_messages: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "Canned".into(),
                default_model: "test".into(),
                authenticated: true,
            }
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> agent_core::Result<Completion> {
            let tools = messages.iter().filter(|m| m.role == Role::Tool).count();
            self.tool_messages.fetch_add(tools, Ordering::SeqCst);
            match &self.reply {
                Reply::Text(text) => Ok(Completion {
                    content: (*text).to_string(),
                    model: options.model.clone(),
                    usage: None,
                    finish_reason: None,
                }),
                Reply::Fail(make) => Err(make()),
            }
        }
    }

    fn app_with(reply: Reply, debug: bool) -> (Router, Arc<CannedProvider>) {
        let provider = Arc::new(CannedProvider {
            reply,
            tool_messages: AtomicUsize::new(0),
        });
        let gateway = Arc::new(MarketGateway::mock(NetworkConfig::default()));
        let advisor = YieldAdvisor::new(Agent::with_defaults(provider.clone()), gateway);
        let state = AppState {
            advisor: Arc::new(advisor),
            debug,
            mock_market_data: true,
        };
        (router(state), provider)
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plain_message_makes_no_gateway_call() {
        let (app, provider) = app_with(Reply::Text("Hello! Ask me about DeFi yields."), false);

        let res = app.oneshot(post(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = json_body(res).await;
        assert_eq!(json["response"], "Hello! Ask me about DeFi yields.");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(provider.tool_messages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_message_is_400() {
        for body in [r"{}", r#"{"message": 42}"#, r#"{"message": ""}"#, "not json"] {
            let (app, _) = app_with(Reply::Text("unused"), false);
            let res = app.oneshot(post(body)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
            let json = json_body(res).await;
            assert_eq!(json, serde_json::json!({ "error": "Message is required" }));
        }
    }

    #[tokio::test]
    async fn test_keywords_attach_data() {
        let (app, provider) = app_with(Reply::Text("Here are the pools."), false);
        let res = app
            .oneshot(post(r#"{"message":"show me frax yield"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(provider.tool_messages.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_reply_placeholder() {
        let (app, _) = app_with(Reply::Text("   "), false);
        let res = app.oneshot(post(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(json_body(res).await["response"], EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_inference_failure_is_apologetic_200() {
        let (app, _) = app_with(
            Reply::Fail(|| AgentError::ProviderUnavailable("HTTP 503".into())),
            false,
        );
        let res = app.oneshot(post(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let text = json_body(res).await["response"].as_str().unwrap().to_string();
        assert!(text.starts_with("I apologize"));
        assert!(text.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_pre_inference_failure_is_500() {
        let (app, _) = app_with(Reply::Fail(|| AgentError::Config("no model configured".into())), true);
        let res = app.oneshot(post(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(res).await;
        assert_eq!(json["error"], "Failed to process request");
        assert!(json["message"].is_string());
        assert!(json["details"].as_str().unwrap().contains("Config"));
    }

    #[tokio::test]
    async fn test_descriptor_and_health() {
        let (app, _) = app_with(Reply::Text("unused"), false);
        let req = Request::builder().uri("/api/agent").body(Body::empty()).unwrap();
        let json = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["agent"]["name"], "YieldForge");
        assert_eq!(json["endpoints"]["POST"], "/api/agent - Send message to agent");
        assert_eq!(json["agent"]["tools"].as_array().unwrap().len(), 7);

        let (app, _) = app_with(Reply::Text("unused"), false);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let json = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["provider_connected"], true);
        assert_eq!(json["mock_market_data"], true);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_500() {
        let provider = Arc::new(agent_runtime::GeminiProvider::from_config(
            agent_runtime::GeminiConfig::default(),
        ));
        let gateway = Arc::new(MarketGateway::mock(NetworkConfig::default()));
        let state = AppState {
            advisor: Arc::new(YieldAdvisor::new(Agent::with_defaults(provider), gateway)),
            debug: false,
            mock_market_data: true,
        };

        let res = router(state).oneshot(post(r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(res).await;
        assert_eq!(json["error"], "Failed to process request");
        assert!(json.get("details").is_none());
    }
}
