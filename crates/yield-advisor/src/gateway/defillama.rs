//! DeFiLlama yields client (`GET /pools`)

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::YieldSource;
use crate::error::{AdvisorError, Result};
use crate::model::{IlRisk, PoolRecord};

const SOURCE: &str = "defillama";

/// Envelope of `GET /pools`
#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Vec<RawPool>,
}

/// Pool as sent upstream; any field may be missing or null
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    pool: Option<String>,
    project: Option<String>,
    symbol: Option<String>,
    chain: Option<String>,
    apy: Option<f64>,
    tvl_usd: Option<f64>,
    stablecoin: Option<bool>,
    il_risk: Option<String>,
}

impl From<RawPool> for PoolRecord {
    fn from(raw: RawPool) -> Self {
        Self {
            pool_id: raw.pool.unwrap_or_default(),
            protocol: raw.project.unwrap_or_else(|| "Unknown".into()),
            pool_symbol: raw.symbol.unwrap_or_default(),
            chain: raw.chain.unwrap_or_default(),
            apy: raw.apy.filter(|v| v.is_finite()).unwrap_or(0.0),
            tvl_usd: raw.tvl_usd.filter(|v| v.is_finite()).unwrap_or(0.0),
            is_stablecoin: raw.stablecoin.unwrap_or(false),
            il_risk: IlRisk::parse(raw.il_risk.as_deref()),
        }
    }
}

pub struct DefiLlamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl DefiLlamaClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl YieldSource for DefiLlamaClient {
    async fn pools(&self) -> Result<Vec<PoolRecord>> {
        let url = format!("{}/pools", self.base_url);
        debug!(%url, "Fetching yield pools");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdvisorError::upstream(SOURCE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::upstream(SOURCE, format!("HTTP {status}")));
        }

        let body: PoolsResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::upstream(SOURCE, e.to_string()))?;

        debug!(count = body.data.len(), "Yield pools received");
        Ok(body.data.into_iter().map(PoolRecord::from).collect())
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_sparse_pools() {
        let body = r#"{"status":"success","data":[
            {"pool":"abc","project":"aave-v3","symbol":"USDC","chain":"Ethereum",
             "apy":4.2,"tvlUsd":150000000,"stablecoin":true,"ilRisk":"no"},
            {"pool":"def","project":"pepe-swap","symbol":"PEPE-WETH","apy":null}
        ]}"#;

        let parsed: PoolsResponse = serde_json::from_str(body).unwrap();
        let pools: Vec<PoolRecord> = parsed.data.into_iter().map(PoolRecord::from).collect();

        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].protocol, "aave-v3");
        assert_eq!(pools[0].il_risk, IlRisk::None);
        assert!(pools[0].is_stablecoin);
        assert!(pools[1].apy == 0.0);
        assert!(pools[1].tvl_usd == 0.0);
        assert_eq!(pools[1].il_risk, IlRisk::Unknown);
        assert_eq!(pools[1].chain, "");
    }

    #[test]
    fn test_missing_data_is_empty() {
        let parsed: PoolsResponse = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert!(parsed.data.is_empty());
    }
}
