//! Harvest Simulator Tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use agent_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::names;
use crate::error::AdvisorError;
use crate::gateway::MarketGateway;
use crate::model::{PoolFilter, PoolRecord, QuoteSource, SimulationInput, SimulationResult};
use crate::projection::{simulate, simulate_at_fallback_apy, FALLBACK_APY, REBALANCE_INTERVAL_DAYS};
use crate::router::DEFAULT_SIMULATION_DAYS;

/// Pools blended when the caller names none
const DEFAULT_SELECTION: usize = 3;

const DEFAULT_SELECTION_LABEL: &str = "top pools";

/// Project returns, gas and ROI for a yield position
pub struct HarvestSimulatorTool {
    gateway: Arc<MarketGateway>,
}

impl HarvestSimulatorTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }

    fn rejected(err: &AdvisorError) -> ToolResult {
        ToolResult::failure(names::SIMULATE_HARVEST, err.to_string())
            .with_data(json!({ "success": false, "error": err.to_string() }))
    }

    /// Caller's pools, or the top pools of a default scan
    async fn select_pools(&self, requested: Option<&[String]>) -> Result<Vec<PoolRecord>, AdvisorError> {
        if let Some(ids) = requested {
            return self.gateway.resolve_pools(ids).await;
        }

        let filter = PoolFilter {
            limit: DEFAULT_SELECTION,
            ..PoolFilter::default()
        };
        let pools = self.gateway.fetch_pools(&filter).await?;
        debug!(count = pools.len(), "Simulating default pool selection");
        Ok(pools)
    }

    async fn run(&self, call: &ToolCall) -> Result<SimulationResult, AdvisorError> {
        let principal = call.f64_arg("investmentAmount").unwrap_or(f64::NAN);
        let days = call
            .u64_arg("durationDays")
            .map_or(Ok(DEFAULT_SIMULATION_DAYS), u32::try_from)
            .map_err(|_| AdvisorError::Validation("durationDays out of range".into()))?;
        let auto_compound = call.bool_arg("autoCompound").unwrap_or(true);

        let requested = call.list_arg("poolIds").filter(|ids| !ids.is_empty());
        let selections = requested
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_SELECTION_LABEL.into()]);
        let input = SimulationInput::new(principal, days, selections, auto_compound)?;

        let pools = match self.select_pools(requested.as_deref()).await {
            Ok(pools) => pools,
            Err(e @ AdvisorError::UpstreamUnavailable { .. }) => {
                warn!(error = %e, apy = FALLBACK_APY, "Pool data unavailable, simulating at fallback APY");
                let gas = self.gateway.gas_quote().await;
                return Ok(simulate_at_fallback_apy(&input, gas));
            }
            Err(e) => return Err(e),
        };
        let gas = self.gateway.gas_quote().await;

        simulate(&input, &pools, gas)
    }
}

fn render(result: &SimulationResult) -> String {
    let mut output = format!(
        "Harvest simulation: ${:.2} over {} days ({})\n",
        result.principal_usd,
        result.duration_days,
        if result.auto_compound { "auto-compound" } else { "simple interest" },
    );

    if result.apy_source == QuoteSource::Fallback {
        output.push_str(&format!("  Pools:        unavailable, assuming {:.2}% APY\n", result.avg_apy));
    } else {
        let pools: Vec<&str> = result.pools.iter().map(|p| p.pool_symbol.as_str()).collect();
        output.push_str(&format!("  Pools:        {} (avg APY {:.2}%)\n", pools.join(", "), result.avg_apy));
    }
    output.push_str(&format!("  Final amount: ${:.2}\n", result.final_amount_usd));
    output.push_str(&format!("  Gross profit: ${:.2}\n", result.gross_profit_usd));
    output.push_str(&format!(
        "  Gas:          ${:.2} ({} rebalances every {} days at ${:.2}, {:?})\n",
        result.gas_cost_usd,
        result.rebalance_count,
        REBALANCE_INTERVAL_DAYS,
        result.gas_per_rebalance_usd,
        result.gas_source,
    ));
    output.push_str(&format!("  Net profit:   ${:.2}\n", result.net_profit_usd));
    output.push_str(&format!("  ROI:          {:.2}%\n", result.roi_percent));

    output.push_str("  Projections (daily compounding):");
    for checkpoint in &result.checkpoints {
        output.push_str(&format!(" day {} ${:.2};", checkpoint.day, checkpoint.amount_usd));
    }
    output.trim_end_matches(';').to_string()
}

#[async_trait]
impl Tool for HarvestSimulatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::SIMULATE_HARVEST.into(),
            description: "Simulate a yield harvesting strategy over time: projected returns, gas costs and ROI.".into(),
            parameters: vec![
                ParameterSchema::required("investmentAmount", "number", "Investment amount in USD"),
                ParameterSchema::optional("poolIds", "array", "Pool ids or name fragments (at most 5); top pools if omitted", None),
                ParameterSchema::optional("durationDays", "number", "Simulation duration in days (1-365)", Some(json!(DEFAULT_SIMULATION_DAYS))),
                ParameterSchema::optional("autoCompound", "boolean", "Compound daily", Some(json!(true))),
            ],
            category: Some("analysis".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        match self.run(call).await {
            Ok(result) => {
                let data = serde_json::to_value(&result)?;
                Ok(ToolResult::success(names::SIMULATE_HARVEST, render(&result)).with_data(data))
            }
            Err(e) => Ok(Self::rejected(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockChainRpc, MockPriceSource, MockYieldSource, NetworkConfig};

    fn tool(yields: MockYieldSource, chain: MockChainRpc) -> HarvestSimulatorTool {
        HarvestSimulatorTool::new(Arc::new(MarketGateway::new(
            Arc::new(yields),
            Arc::new(MockPriceSource::new()),
            Arc::new(chain),
            NetworkConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_simulates_named_pools() {
        let tool = tool(MockYieldSource::new(), MockChainRpc::default());
        let call = ToolCall::new(names::SIMULATE_HARVEST)
            .arg("investmentAmount", 1000.0)
            .arg("poolIds", json!(["aave-usdc-eth", "compound-usdt"]))
            .arg("durationDays", 365)
            .arg("autoCompound", false);

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success, "{}", result.output);

        let data = result.data.unwrap();
        assert_eq!(data["pools"].as_array().unwrap().len(), 2);
        assert_eq!(data["rebalanceCount"], 52);
        assert_eq!(data["gasSource"], "live");
        // (4.8 + 6.1) / 2 = 5.45% simple interest
        assert!((data["finalAmountUsd"].as_f64().unwrap() - 1054.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_default_selection_and_gas_fallback() {
        let tool = tool(MockYieldSource::new(), MockChainRpc::failing());
        let call = ToolCall::new(names::SIMULATE_HARVEST).arg("investmentAmount", 5000.0);

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success, "{}", result.output);
        let data = result.data.unwrap();
        assert_eq!(data["gasSource"], "fallback");
        assert_eq!(data["durationDays"], 30);
        assert!(!data["pools"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_pools_report_empty_selection() {
        let tool = tool(MockYieldSource::new(), MockChainRpc::default());
        let call = ToolCall::new(names::SIMULATE_HARVEST)
            .arg("investmentAmount", 1000.0)
            .arg("poolIds", "no-such-pool");

        let result = tool.execute(&call).await.unwrap();
        assert!(!result.success);
        let data = result.data.unwrap();
        assert_eq!(data["success"], false);
        assert_eq!(data["error"], "No matching pools found for simulation");
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let tool = tool(MockYieldSource::new(), MockChainRpc::default());
        let zero_days = ToolCall::new(names::SIMULATE_HARVEST)
            .arg("investmentAmount", 1000.0)
            .arg("poolIds", "aave")
            .arg("durationDays", 0);
        let result = tool.execute(&zero_days).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("duration"));

        let negative = ToolCall::new(names::SIMULATE_HARVEST)
            .arg("investmentAmount", -1.0)
            .arg("poolIds", "aave");
        assert!(!tool.execute(&negative).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_yield_source_down_uses_fallback_apy() {
        let tool = tool(MockYieldSource::failing(), MockChainRpc::default());

        for call in [
            ToolCall::new(names::SIMULATE_HARVEST).arg("investmentAmount", 1000.0),
            ToolCall::new(names::SIMULATE_HARVEST)
                .arg("investmentAmount", 1000.0)
                .arg("poolIds", "aave"),
        ] {
            let result = tool.execute(&call).await.unwrap();
            assert!(result.success, "{}", result.output);
            assert!(result.output.contains("assuming 12.00% APY"));

            let data = result.data.unwrap();
            assert_eq!(data["apySource"], "fallback");
            assert_eq!(data["avgApy"], FALLBACK_APY);
            assert!(data["pools"].as_array().unwrap().is_empty());
        }
    }
}
