//! Yield Advisor Pipeline
//!
//! One request: route the message, run each fired tool in rule order, then
//! ask the model once with the results attached.

use std::sync::Arc;

use tracing::{debug, info, warn};

use agent_core::{Agent, Result as CoreResult, ToolCall, ToolRegistry, ToolResult};

use crate::gateway::MarketGateway;
use crate::router::{route, Intent};
use crate::svckit;

/// Built once at start-up and shared by every request
pub struct YieldAdvisor {
    agent: Agent,
    registry: ToolRegistry,
    gateway: Arc<MarketGateway>,
}

impl YieldAdvisor {
    pub fn new(agent: Agent, gateway: Arc<MarketGateway>) -> Self {
        let registry = svckit::registry(&gateway);
        info!(tools = ?registry.names(), "Yield advisor ready");
        Self {
            agent,
            registry,
            gateway,
        }
    }

    /// Answer one chat message
    pub async fn handle(&self, message: &str) -> CoreResult<String> {
        let context = self.gather(&route(message)).await;
        self.agent.respond(message, &context).await
    }

    /// Run the tools behind `intents`, sequentially.
    ///
    /// A tool that errors is recorded as a failed result so the model can
    /// still mention it.
    pub async fn gather(&self, intents: &[Intent]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(intents.len());

        for intent in intents {
            let call = intent.tool_call();
            debug!(tool = %call.name, "Running tool");

            let result = match self.registry.execute(&call).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool failed");
                    ToolResult::failure(call.name.clone(), e.to_string())
                }
            };
            results.push(result);
        }

        results
    }

    /// Run one tool directly, bypassing the router
    pub async fn run_tool(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        self.registry.execute(call).await
    }

    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gateway(&self) -> &Arc<MarketGateway> {
        &self.gateway
    }
}
