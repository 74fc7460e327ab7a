//! Pool Scanner Tools
//!
//! `SCAN_YIELD_POOLS` and `GET_FRAX_POOLS`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::names;
use crate::gateway::MarketGateway;
use crate::model::{format_tvl, PoolFilter, PoolRecord, RiskBucket, DEFAULT_POOL_LIMIT};
use crate::risk::score_risk;

/// Default number of Frax pools listed
pub const DEFAULT_FRAX_LIMIT: usize = 10;

fn pool_line(pool: &PoolRecord) -> String {
    let risk = score_risk(pool);
    format!(
        "  {} {} on {}: {:.2}% APY, TVL {}, risk {}/10 ({})",
        pool.protocol,
        pool.pool_symbol,
        pool.chain,
        pool.apy,
        format_tvl(pool.tvl_usd),
        risk.score,
        risk.bucket,
    )
}

fn limit_arg(call: &ToolCall, default: usize) -> usize {
    call.u64_arg("limit")
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Scan the aggregator for yield opportunities
pub struct ScanPoolsTool {
    gateway: Arc<MarketGateway>,
}

impl ScanPoolsTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }

    fn filter_from(call: &ToolCall) -> PoolFilter {
        let defaults = PoolFilter::default();
        PoolFilter {
            min_apy: call
                .f64_arg("minApy")
                .filter(|v| v.is_finite())
                .unwrap_or(defaults.min_apy),
            max_risk: call
                .str_arg("maxRisk")
                .and_then(RiskBucket::parse)
                .unwrap_or(defaults.max_risk),
            chain: call.str_arg("chain").map(str::to_owned),
            protocols: call.list_arg("protocols").filter(|p| !p.is_empty()),
            limit: limit_arg(call, DEFAULT_POOL_LIMIT),
        }
    }
}

#[async_trait]
impl Tool for ScanPoolsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::SCAN_YIELD_POOLS.into(),
            description: "Scan DeFi protocols for yield opportunities. Returns pool APY, TVL and risk score.".into(),
            parameters: vec![
                ParameterSchema::optional("minApy", "number", "Minimum APY threshold (%)", Some(json!(5.0))),
                ParameterSchema::optional("maxRisk", "string", "Maximum risk level: low, medium or high", Some(json!("medium"))),
                ParameterSchema::optional("chain", "string", "Only pools on this chain", None),
                ParameterSchema::optional("protocols", "array", "Protocol name fragments (e.g., ['aave', 'curve'])", None),
                ParameterSchema::optional("limit", "number", "Maximum pools returned", Some(json!(DEFAULT_POOL_LIMIT))),
            ],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let filter = Self::filter_from(call);

        let scan = match self.gateway.scan_pools(&filter).await {
            Ok(scan) => scan,
            Err(e) => {
                return Ok(ToolResult::failure(names::SCAN_YIELD_POOLS, format!("Failed to fetch yield pools: {e}"))
                    .with_data(json!({ "error": "Failed to fetch yield pools", "message": e.to_string() })));
            }
        };

        let mut output = format!(
            "Scanned {} pools, {} match (min APY {:.1}%, max risk {}):\n",
            scan.total_scanned,
            scan.pools.len(),
            filter.min_apy,
            filter.max_risk,
        );
        for pool in &scan.pools {
            output.push_str(&pool_line(pool));
            output.push('\n');
        }

        let pools: Vec<_> = scan
            .pools
            .iter()
            .map(|p| json!({ "pool": p, "riskScore": score_risk(p).score }))
            .collect();

        Ok(ToolResult::success(names::SCAN_YIELD_POOLS, output.trim_end()).with_data(json!({
            "totalPoolsScanned": scan.total_scanned,
            "filteredPools": pools,
            "filters": filter,
        })))
    }
}

/// Frax-related pools and total Frax TVL
pub struct FraxPoolsTool {
    gateway: Arc<MarketGateway>,
}

impl FraxPoolsTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for FraxPoolsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::GET_FRAX_POOLS.into(),
            description: "Get yield opportunities from Frax Finance pools, highest APY first.".into(),
            parameters: vec![ParameterSchema::optional(
                "limit",
                "number",
                "Maximum pools returned",
                Some(json!(DEFAULT_FRAX_LIMIT)),
            )],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let limit = limit_arg(call, DEFAULT_FRAX_LIMIT);

        let frax = match self.gateway.frax_pools(limit).await {
            Ok(frax) => frax,
            Err(e) => {
                return Ok(ToolResult::failure(names::GET_FRAX_POOLS, format!("Failed to fetch Frax pools: {e}"))
                    .with_data(json!({ "error": "Failed to fetch Frax pools", "message": e.to_string() })));
            }
        };

        let mut output = format!(
            "Frax pools (total Frax TVL {}):\n",
            format_tvl(frax.total_frax_tvl_usd)
        );
        for pool in &frax.pools {
            output.push_str(&pool_line(pool));
            output.push('\n');
        }

        let data = serde_json::to_value(&frax)?;
        Ok(ToolResult::success(names::GET_FRAX_POOLS, output.trim_end()).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockChainRpc, MockPriceSource, MockYieldSource, NetworkConfig};

    fn gateway(yields: MockYieldSource) -> Arc<MarketGateway> {
        Arc::new(MarketGateway::new(
            Arc::new(yields),
            Arc::new(MockPriceSource::new()),
            Arc::new(MockChainRpc::default()),
            NetworkConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_scan_with_arguments() {
        let tool = ScanPoolsTool::new(gateway(MockYieldSource::new()));
        let call = ToolCall::new(names::SCAN_YIELD_POOLS)
            .arg("minApy", 0.0)
            .arg("maxRisk", "high")
            .arg("protocols", "aave,compound");

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["totalPoolsScanned"], 9);
        assert_eq!(data["filteredPools"].as_array().unwrap().len(), 2);
        assert!(result.output.contains("compound-v3"));
    }

    #[tokio::test]
    async fn test_scan_failure_is_reported() {
        let tool = ScanPoolsTool::new(gateway(MockYieldSource::failing()));
        let result = tool.execute(&ToolCall::new(names::SCAN_YIELD_POOLS)).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.data.unwrap()["error"], "Failed to fetch yield pools");
    }

    #[tokio::test]
    async fn test_frax_pools() {
        let tool = FraxPoolsTool::new(gateway(MockYieldSource::new()));
        let result = tool
            .execute(&ToolCall::new(names::GET_FRAX_POOLS).arg("limit", 1))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["pools"].as_array().unwrap().len(), 1);
        assert!(result.output.contains("$454.50M"));
    }
}
