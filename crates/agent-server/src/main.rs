//! yieldforge HTTP Server
//!
//! Axum server exposing the yield advisor agent.
//!
//! Everything shared between requests (model client, market gateway, tool
//! registry) is constructed here exactly once and handed to the handlers
//! through `AppState`.

mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agent_core::{AgentBuilder, LlmProvider};
use agent_runtime::GeminiProvider;
use yield_advisor::{MarketGateway, YieldAdvisor, YIELD_ADVISOR_PROMPT};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    if config.strict {
        tracing::info!("Strict environment validation enabled");
    }

    // Model provider
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_config(config.gemini.clone()));
    match provider.health_check().await {
        Ok(true) => tracing::info!(model = %config.gemini.default_model, "✓ Connected to Gemini"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - chat replies will carry the provider error");
            tracing::warn!("  Check GOOGLE_API_KEY and GEMINI_BASE_URL");
        }
    }

    // Market data
    let gateway = if config.mock_market_data {
        tracing::warn!("⚠ Using static mock market data");
        MarketGateway::mock(config.gateway.network.clone())
    } else {
        MarketGateway::live(config.gateway.clone())?
    };
    let network = gateway.network();
    tracing::info!(
        network = %network.network_name,
        chain_id = network.chain_id,
        rpc = %network.rpc_url,
        wallet = network.wallet_configured(),
        "Market gateway ready"
    );

    let agent = AgentBuilder::new()
        .provider(provider)
        .system_prompt(YIELD_ADVISOR_PROMPT)
        .model(config.gemini.default_model.clone())
        .build()?;

    let state = AppState {
        advisor: Arc::new(YieldAdvisor::new(agent, Arc::new(gateway))),
        debug: config.debug,
        mock_market_data: config.mock_market_data,
    };

    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 yieldforge server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /api/agent  - Agent capabilities");
    tracing::info!("  POST /api/agent  - Send message");

    axum::serve(listener, app).await?;

    Ok(())
}
