//! Fraxtal Status Tool
//!
//! Live chain state. Failures are reported with troubleshooting hints, never
//! with made-up values.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::names;
use crate::gateway::MarketGateway;
use crate::model::NetworkStatus;

pub struct FraxtalStatusTool {
    gateway: Arc<MarketGateway>,
}

impl FraxtalStatusTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }
}

fn render(status: &NetworkStatus) -> String {
    let mut output = format!(
        "Connected to {} (chain id {}{})\n  Block: {}\n  Gas price: {} wei\n",
        status.network_name,
        status.chain_id,
        if status.chain_matches() {
            String::new()
        } else {
            format!(", expected {}", status.expected_chain_id)
        },
        status.block_number,
        status.gas_price_wei,
    );

    match (status.wallet_configured(), status.wallet_balance()) {
        (true, Some(balance)) => output.push_str(&format!("  Wallet: {balance}\n")),
        (true, None) => output.push_str("  Wallet: configured, balance unavailable\n"),
        (false, _) => output.push_str(
            "  Wallet: not configured. Set WALLET_PRIVATE_KEY for on-chain features.\n",
        ),
    }

    output.push_str(&format!(
        "  RPC: {}\n  Explorer: {}\n  Faucet: {}",
        status.rpc_url, status.explorer_url, status.faucet_url
    ));
    output
}

#[async_trait]
impl Tool for FraxtalStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::CHECK_FRAXTAL_STATUS.into(),
            description: "Check Fraxtal testnet connection, block height, gas price and wallet status.".into(),
            parameters: Vec::new(),
            category: Some("network".into()),
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        match self.gateway.network_status().await {
            Ok(status) => {
                let data = serde_json::to_value(&status)?;
                Ok(ToolResult::success(names::CHECK_FRAXTAL_STATUS, render(&status)).with_data(data))
            }
            Err(e) => {
                let network = self.gateway.network();
                Ok(ToolResult::failure(
                    names::CHECK_FRAXTAL_STATUS,
                    format!("Failed to connect to {}: {e}", network.network_name),
                )
                .with_data(json!({
                    "error": format!("Failed to connect to {}", network.network_name),
                    "message": e.to_string(),
                    "troubleshooting": [
                        "Check your internet connection",
                        format!("Verify the RPC URL is reachable: {}", network.rpc_url),
                        "Try the alternative RPC: https://fraxtal-testnet-rpc.publicnode.com",
                    ],
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockChainRpc, MockPriceSource, MockYieldSource, NetworkConfig};

    fn tool(chain: MockChainRpc) -> FraxtalStatusTool {
        FraxtalStatusTool::new(Arc::new(MarketGateway::new(
            Arc::new(MockYieldSource::new()),
            Arc::new(MockPriceSource::new()),
            Arc::new(chain),
            NetworkConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_connected() {
        let result = tool(MockChainRpc::default())
            .execute(&ToolCall::new(names::CHECK_FRAXTAL_STATUS))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("chain id 2523)"));
        assert!(result.output.contains("not configured"));
        assert_eq!(result.data.unwrap()["blockNumber"], 1_234_567);
    }

    #[tokio::test]
    async fn test_failure_carries_troubleshooting() {
        let result = tool(MockChainRpc::failing())
            .execute(&ToolCall::new(names::CHECK_FRAXTAL_STATUS))
            .await
            .unwrap();
        assert!(!result.success);
        let data = result.data.unwrap();
        assert_eq!(data["troubleshooting"].as_array().unwrap().len(), 3);
        assert!(data.get("blockNumber").is_none());
    }
}
