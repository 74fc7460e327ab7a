//! CoinGecko spot-price client (`GET /simple/price`)

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::PriceSource;
use crate::error::{AdvisorError, Result};

const SOURCE: &str = "coingecko";

/// `{"ethereum": {"usd": 2500.12}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// Map a ticker to a CoinGecko coin id
fn coin_id(symbol: &str) -> String {
    match symbol.trim().to_ascii_uppercase().as_str() {
        "ETH" | "WETH" => "ethereum".into(),
        "BTC" | "WBTC" => "bitcoin".into(),
        "FRAX" => "frax".into(),
        "FXS" => "frax-share".into(),
        "USDC" => "usd-coin".into(),
        _ => symbol.trim().to_ascii_lowercase(),
    }
}

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_price_usd(&self, symbol: &str) -> Result<f64> {
        let id = coin_id(symbol);
        let url = format!("{}/simple/price", self.base_url);
        debug!(%url, %id, "Fetching spot price");

        let response = self
            .client
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| AdvisorError::upstream(SOURCE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::upstream(SOURCE, format!("HTTP {status}")));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::upstream(SOURCE, e.to_string()))?;

        body.get(&id)
            .and_then(|prices| prices.get("usd"))
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| AdvisorError::upstream(SOURCE, format!("no USD price for {id}")))
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
