//! Risk Profile Tool
//!
//! Maps a tolerance level to its tier rules, recommends pools that satisfy
//! them and projects simple-interest earnings at the target APY.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    tool::ParameterSchema, AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use super::names;
use crate::gateway::MarketGateway;
use crate::model::{format_tvl, PoolFilter, RiskBucket};
use crate::projection::projected_returns;
use crate::risk::{recommend_pools, RiskTolerance};

pub struct RiskProfileTool {
    gateway: Arc<MarketGateway>,
}

impl RiskProfileTool {
    pub const fn new(gateway: Arc<MarketGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for RiskProfileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::ANALYZE_RISK_PROFILE.into(),
            description: "Analyze a risk tolerance and recommend matching pools with expected returns.".into(),
            parameters: vec![
                ParameterSchema::required("riskTolerance", "string", "conservative, moderate or aggressive"),
                ParameterSchema::required("investmentAmount", "number", "Investment amount in USD"),
                ParameterSchema::optional("targetApy", "number", "Target APY goal (%)", None),
                ParameterSchema::optional("preferStablecoins", "boolean", "Only stablecoin pools", Some(json!(false))),
            ],
            category: Some("analysis".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let tolerance = call
            .str_arg("riskTolerance")
            .and_then(RiskTolerance::parse)
            .ok_or_else(|| {
                AgentError::ToolValidation("riskTolerance must be conservative, moderate or aggressive".into())
            })?;
        let amount = call
            .f64_arg("investmentAmount")
            .filter(|a| a.is_finite() && *a >= 0.0)
            .ok_or_else(|| AgentError::ToolValidation("investmentAmount must be a non-negative number".into()))?;
        let target_apy = call.f64_arg("targetApy").filter(|t| t.is_finite());
        let prefer_stablecoins = call.bool_arg("preferStablecoins").unwrap_or(false);

        let rule = tolerance.rule();
        let every_pool = PoolFilter {
            min_apy: 0.0,
            max_risk: RiskBucket::High,
            limit: usize::MAX,
            ..PoolFilter::default()
        };
        let pools = match self.gateway.fetch_pools(&every_pool).await {
            Ok(pools) => pools,
            Err(e) => {
                return Ok(ToolResult::failure(names::ANALYZE_RISK_PROFILE, format!("Failed to fetch pools: {e}"))
                    .with_data(json!({ "error": "Failed to fetch pools", "message": e.to_string() })));
            }
        };

        let recommendations = recommend_pools(&pools, tolerance, target_apy, prefer_stablecoins);
        let returns_apy = target_apy
            .or_else(|| recommendations.first().map(|r| r.pool.apy))
            .unwrap_or(0.0);
        let returns = projected_returns(amount, returns_apy);

        let mut output = format!(
            "Risk profile: {} (score {}/10). {}\n  Max APY {:.0}%, min TVL {}, stablecoins only: {}\n",
            tolerance.as_str(),
            tolerance.profile_score(),
            tolerance.description(),
            rule.max_apy,
            format_tvl(rule.min_tvl_usd),
            rule.stablecoin_only || prefer_stablecoins,
        );
        if recommendations.is_empty() {
            output.push_str("  No pools currently match this profile.\n");
        }
        for rec in &recommendations {
            output.push_str(&format!(
                "  {} {} on {}: {:.2}% APY, TVL {}. {}\n",
                rec.pool.protocol,
                rec.pool.pool_symbol,
                rec.pool.chain,
                rec.pool.apy,
                format_tvl(rec.pool.tvl_usd),
                rec.note,
            ));
        }
        output.push_str(&format!(
            "  Projected on ${amount:.2} at {returns_apy:.2}%: ${:.2}/day, ${:.2}/month, ${:.2}/year",
            returns.daily, returns.monthly, returns.yearly
        ));

        Ok(ToolResult::success(names::ANALYZE_RISK_PROFILE, output).with_data(json!({
            "riskProfile": {
                "level": tolerance,
                "score": tolerance.profile_score(),
                "description": tolerance.description(),
                "rule": rule,
            },
            "recommendedProtocols": tolerance.recommended_protocols(),
            "recommendations": recommendations,
            "projectedReturns": returns,
        })))
    }
}
