//! Market Data Tools
//!
//! `GET_CURRENT_ETH_PRICE` and `GET_MARKET_CONDITIONS`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::names;
use crate::gateway::MarketGateway;
use crate::model::format_tvl;

/// Current ETH spot price; degrades to a fixed quote
pub struct EthPriceTool {
    gateway: Arc<MarketGateway>,
}

impl EthPriceTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for EthPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::GET_CURRENT_ETH_PRICE.into(),
            description: "Get the current Ethereum (ETH) price in USD.".into(),
            parameters: Vec::new(),
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let price = self.gateway.fetch_spot_price_usd("ETH").await;

        Ok(ToolResult::success(names::GET_CURRENT_ETH_PRICE, format!("ETH: ${price:.2} USD"))
            .with_data(json!({
                "price": price,
                "currency": "USD",
                "timestamp": Utc::now().to_rfc3339(),
            })))
    }
}

/// Aggregate DeFi market overview
pub struct MarketConditionsTool {
    gateway: Arc<MarketGateway>,
}

impl MarketConditionsTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for MarketConditionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::GET_MARKET_CONDITIONS.into(),
            description: "Get current DeFi market conditions: total TVL, average APY and top protocols.".into(),
            parameters: Vec::new(),
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let summary = match self.gateway.market_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                return Ok(ToolResult::failure(names::GET_MARKET_CONDITIONS, format!("Failed to fetch market data: {e}"))
                    .with_data(json!({ "error": "Failed to fetch market data", "message": e.to_string() })));
            }
        };

        let mut output = format!(
            "Market overview: total TVL {}, average APY {:.2}%, {} pools across {} chains\nTop protocols by TVL:\n",
            format_tvl(summary.total_tvl_usd),
            summary.avg_apy,
            summary.total_pools,
            summary.active_chains,
        );
        for (rank, protocol) in summary.top_protocols.iter().enumerate() {
            output.push_str(&format!("  {}. {} {}\n", rank + 1, protocol.protocol, format_tvl(protocol.tvl_usd)));
        }

        let data = serde_json::to_value(&summary)?;
        Ok(ToolResult::success(names::GET_MARKET_CONDITIONS, output.trim_end()).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockChainRpc, MockPriceSource, MockYieldSource, NetworkConfig};

    fn gateway(yields: MockYieldSource, prices: MockPriceSource) -> Arc<MarketGateway> {
        Arc::new(MarketGateway::new(
            Arc::new(yields),
            Arc::new(prices),
            Arc::new(MockChainRpc::default()),
            NetworkConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_eth_price_never_fails() {
        let live = EthPriceTool::new(gateway(MockYieldSource::new(), MockPriceSource::new()));
        let result = live.execute(&ToolCall::new(names::GET_CURRENT_ETH_PRICE)).await.unwrap();
        assert_eq!(result.output, "ETH: $3200.00 USD");

        let down = EthPriceTool::new(gateway(MockYieldSource::new(), MockPriceSource::failing()));
        let result = down.execute(&ToolCall::new(names::GET_CURRENT_ETH_PRICE)).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "ETH: $2500.00 USD");
    }

    #[tokio::test]
    async fn test_market_conditions() {
        let tool = MarketConditionsTool::new(gateway(MockYieldSource::new(), MockPriceSource::new()));
        let result = tool.execute(&ToolCall::new(names::GET_MARKET_CONDITIONS)).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("1. frax-ether"));
        assert_eq!(result.data.unwrap()["totalPools"], 9);

        let down = MarketConditionsTool::new(gateway(MockYieldSource::failing(), MockPriceSource::new()));
        let result = down.execute(&ToolCall::new(names::GET_MARKET_CONDITIONS)).await.unwrap();
        assert!(!result.success);
    }
}
