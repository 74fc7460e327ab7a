//! Market Gateway
//!
//! One facade over the three sources. Price and gas lookups degrade to
//! fixed fallbacks; chain-state lookups fail instead.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{wallet_address_from_key, ChainRpc, CoinGeckoClient, DefiLlamaClient, EvmRpcClient, PriceSource, YieldSource};
use super::{MockChainRpc, MockPriceSource, MockYieldSource};
use crate::error::{AdvisorError, Result};
use crate::model::{
    FraxPools, MarketSummary, NetworkStatus, PoolFilter, PoolRecord, ProtocolTvl, WalletStatus,
    MIN_TVL_USD,
};
use crate::projection::{wei_to_ether, GasQuote};
use crate::risk::score_risk;

/// ETH price used when the price API is unreachable
pub const FALLBACK_ETH_PRICE_USD: f64 = 2500.0;

const TOP_PROTOCOLS: usize = 10;

/// Chain the gateway reports on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub network_name: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub faucet_url: String,
    pub native_symbol: String,
    /// Address derived from the configured private key; the key itself is not kept
    pub wallet_address: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_name: "Fraxtal Testnet".into(),
            rpc_url: "https://rpc.testnet.frax.com".into(),
            chain_id: 2523,
            explorer_url: "https://holesky.fraxscan.com".into(),
            faucet_url: "https://faucet.fraxtal.io".into(),
            native_symbol: "FRAX".into(),
            wallet_address: None,
        }
    }
}

impl NetworkConfig {
    /// Enable wallet features for the account behind `private_key`
    pub fn with_wallet_key(mut self, private_key: &str) -> Result<Self> {
        self.wallet_address = Some(wallet_address_from_key(private_key)?);
        Ok(self)
    }

    pub const fn wallet_configured(&self) -> bool {
        self.wallet_address.is_some()
    }
}

/// Endpoints for the live sources
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub defillama_base_url: String,
    pub coingecko_base_url: String,
    pub network: NetworkConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            defillama_base_url: "https://yields.llama.fi".into(),
            coingecko_base_url: "https://api.coingecko.com/api/v3".into(),
            network: NetworkConfig::default(),
        }
    }
}

/// Filtered pools plus how many the aggregator listed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolScan {
    pub total_scanned: usize,
    pub pools: Vec<PoolRecord>,
}

pub struct MarketGateway {
    yields: Arc<dyn YieldSource>,
    prices: Arc<dyn PriceSource>,
    chain: Arc<dyn ChainRpc>,
    network: NetworkConfig,
}

impl MarketGateway {
    pub fn new(
        yields: Arc<dyn YieldSource>,
        prices: Arc<dyn PriceSource>,
        chain: Arc<dyn ChainRpc>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            yields,
            prices,
            chain,
            network,
        }
    }

    /// Gateway over the public APIs, sharing one HTTP client
    pub fn live(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("yieldforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::new(
            Arc::new(DefiLlamaClient::new(client.clone(), config.defillama_base_url)),
            Arc::new(CoinGeckoClient::new(client.clone(), config.coingecko_base_url)),
            Arc::new(EvmRpcClient::new(client, &config.network.rpc_url)?),
            config.network,
        ))
    }

    /// Gateway over the static sources
    pub fn mock(network: NetworkConfig) -> Self {
        let chain = MockChainRpc::new(network.chain_id);
        Self::new(
            Arc::new(MockYieldSource::new()),
            Arc::new(MockPriceSource::new()),
            Arc::new(chain),
            network,
        )
    }

    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Scan the aggregator and apply `filter`
    pub async fn scan_pools(&self, filter: &PoolFilter) -> Result<PoolScan> {
        let all = self.yields.pools().await?;
        let total_scanned = all.len();
        let pools = filter_pools(all, filter);
        debug!(source = self.yields.name(), total_scanned, kept = pools.len(), "Pool scan complete");
        Ok(PoolScan {
            total_scanned,
            pools,
        })
    }

    pub async fn fetch_pools(&self, filter: &PoolFilter) -> Result<Vec<PoolRecord>> {
        Ok(self.scan_pools(filter).await?.pools)
    }

    /// Spot price in USD. Never fails: falls back to a fixed quote.
    pub async fn fetch_spot_price_usd(&self, symbol: &str) -> f64 {
        match self.prices.spot_price_usd(symbol).await {
            Ok(price) => price,
            Err(e) => {
                let fallback = fallback_price(symbol);
                warn!(source = self.prices.name(), %symbol, error = %e, fallback, "Using fallback spot price");
                fallback
            }
        }
    }

    pub async fn fetch_gas_price_wei(&self) -> Result<u128> {
        self.chain.gas_price_wei().await.map_err(network_unavailable)
    }

    pub async fn fetch_block_number(&self) -> Result<u64> {
        self.chain.block_number().await.map_err(network_unavailable)
    }

    pub async fn fetch_chain_id(&self) -> Result<u64> {
        self.chain.chain_id().await.map_err(network_unavailable)
    }

    /// Gas cost per rebalance, live if the node answers
    pub async fn gas_quote(&self) -> GasQuote {
        match self.fetch_gas_price_wei().await {
            Ok(wei) => {
                let eth_price = self.fetch_spot_price_usd("ETH").await;
                GasQuote::live(wei, eth_price)
            }
            Err(e) => {
                warn!(error = %e, "Using fallback gas cost");
                GasQuote::fallback()
            }
        }
    }

    /// Fresh chain state. Any RPC failure fails the whole status.
    pub async fn network_status(&self) -> Result<NetworkStatus> {
        let chain_id = self.fetch_chain_id().await?;
        let block_number = self.fetch_block_number().await?;
        let gas_price_wei = self.fetch_gas_price_wei().await?;
        let wallet = self.wallet_status().await;

        Ok(NetworkStatus {
            network_name: self.network.network_name.clone(),
            chain_id,
            expected_chain_id: self.network.chain_id,
            block_number,
            gas_price_wei: gas_price_wei.to_string(),
            wallet,
            rpc_url: self.network.rpc_url.clone(),
            explorer_url: self.network.explorer_url.clone(),
            faucet_url: self.network.faucet_url.clone(),
            fetched_at: Utc::now(),
        })
    }

    async fn wallet_status(&self) -> WalletStatus {
        let Some(address) = self.network.wallet_address.clone() else {
            return WalletStatus {
                configured: false,
                address: None,
                balance: None,
            };
        };

        let balance = match self.chain.balance_wei(&address).await {
            Ok(wei) => wei_to_ether(wei).map(|eth| format!("{eth} {}", self.network.native_symbol)),
            Err(e) => {
                warn!(%address, error = %e, "Wallet balance unavailable");
                None
            }
        };

        WalletStatus {
            configured: true,
            address: Some(address),
            balance,
        }
    }

    /// Aggregate figures over every listed pool
    pub async fn market_summary(&self) -> Result<MarketSummary> {
        let pools = self.yields.pools().await?;
        Ok(summarize(&pools))
    }

    /// Pools whose protocol or symbol mentions Frax
    pub async fn frax_pools(&self, limit: usize) -> Result<FraxPools> {
        let mut pools: Vec<PoolRecord> = self
            .yields
            .pools()
            .await?
            .into_iter()
            .filter(is_frax_pool)
            .collect();

        let total_frax_tvl_usd = pools.iter().map(|p| p.tvl_usd).sum();
        pools.sort_by(|a, b| b.apy.total_cmp(&a.apy));
        pools.truncate(limit);

        Ok(FraxPools {
            pools,
            total_frax_tvl_usd,
        })
    }

    /// Resolve selections by exact id, then by symbol/protocol fragment.
    ///
    /// Unmatched selections are dropped; an empty result is not an error here.
    pub async fn resolve_pools(&self, selections: &[String]) -> Result<Vec<PoolRecord>> {
        let pools = self.yields.pools().await?;
        Ok(resolve_selections(&pools, selections))
    }
}

fn network_unavailable(err: AdvisorError) -> AdvisorError {
    match err {
        AdvisorError::NetworkUnavailable(_) => err,
        other => AdvisorError::NetworkUnavailable(other.to_string()),
    }
}

fn fallback_price(symbol: &str) -> f64 {
    match symbol.trim().to_ascii_uppercase().as_str() {
        "ETH" | "WETH" => FALLBACK_ETH_PRICE_USD,
        "FRAX" | "USDC" | "USDT" | "DAI" => 1.0,
        _ => 0.0,
    }
}

fn is_frax_pool(pool: &PoolRecord) -> bool {
    pool.protocol.to_lowercase().contains("frax") || pool.pool_symbol.to_lowercase().contains("frax")
}

/// APY floor, dust floor, risk ceiling, chain, protocol; then sort and cap
pub(crate) fn filter_pools(pools: Vec<PoolRecord>, filter: &PoolFilter) -> Vec<PoolRecord> {
    let ceiling = filter.max_risk.score_ceiling();
    let chain = filter.chain.as_deref().map(str::to_lowercase);
    let protocols: Vec<String> = filter
        .protocols
        .iter()
        .flatten()
        .map(|p| p.to_lowercase())
        .collect();

    let mut kept: Vec<PoolRecord> = pools
        .into_iter()
        .filter(|p| p.apy >= filter.min_apy)
        .filter(|p| p.tvl_usd > MIN_TVL_USD)
        .filter(|p| score_risk(p).score <= ceiling)
        .filter(|p| chain.as_ref().is_none_or(|c| p.chain.to_lowercase() == *c))
        .filter(|p| {
            protocols.is_empty() || {
                let name = p.protocol.to_lowercase();
                protocols.iter().any(|wanted| name.contains(wanted.as_str()))
            }
        })
        .collect();

    kept.sort_by(|a, b| b.apy.total_cmp(&a.apy));
    kept.truncate(filter.limit);
    kept
}

pub(crate) fn summarize(pools: &[PoolRecord]) -> MarketSummary {
    let total_tvl_usd = pools.iter().map(|p| p.tvl_usd).sum();

    #[allow(clippy::cast_precision_loss)]
    let avg_apy = if pools.is_empty() {
        0.0
    } else {
        pools.iter().map(|p| p.apy).sum::<f64>() / pools.len() as f64
    };

    let active_chains = pools
        .iter()
        .map(|p| p.chain.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut by_protocol: HashMap<&str, f64> = HashMap::new();
    for pool in pools {
        *by_protocol.entry(pool.protocol.as_str()).or_default() += pool.tvl_usd;
    }

    let mut top_protocols: Vec<ProtocolTvl> = by_protocol
        .into_iter()
        .map(|(protocol, tvl_usd)| ProtocolTvl {
            protocol: protocol.to_string(),
            tvl_usd,
        })
        .collect();
    top_protocols.sort_by(|a, b| {
        b.tvl_usd
            .total_cmp(&a.tvl_usd)
            .then_with(|| a.protocol.cmp(&b.protocol))
    });
    top_protocols.truncate(TOP_PROTOCOLS);

    MarketSummary {
        total_tvl_usd,
        avg_apy,
        total_pools: pools.len(),
        active_chains,
        top_protocols,
    }
}

pub(crate) fn resolve_selections(pools: &[PoolRecord], selections: &[String]) -> Vec<PoolRecord> {
    selections
        .iter()
        .filter_map(|selection| {
            let wanted = selection.trim();
            if wanted.is_empty() {
                return None;
            }
            let needle = wanted.to_lowercase();
            pools
                .iter()
                .find(|p| p.pool_id == wanted)
                .or_else(|| {
                    pools.iter().find(|p| {
                        p.pool_symbol.to_lowercase().contains(&needle)
                            || p.protocol.to_lowercase().contains(&needle)
                    })
                })
                .cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::mock::sample_pools;
    use super::*;
    use crate::model::{QuoteSource, RiskBucket};

    fn gateway(chain: MockChainRpc, prices: MockPriceSource, network: NetworkConfig) -> MarketGateway {
        MarketGateway::new(
            Arc::new(MockYieldSource::new()),
            Arc::new(prices),
            Arc::new(chain),
            network,
        )
    }

    fn open_filter(min_apy: f64) -> PoolFilter {
        PoolFilter {
            min_apy,
            max_risk: RiskBucket::High,
            ..PoolFilter::default()
        }
    }

    #[test]
    fn test_filter_drops_dust_and_sorts() {
        let pools = filter_pools(sample_pools(), &open_filter(0.0));
        assert!(pools.iter().all(|p| p.tvl_usd > MIN_TVL_USD));
        assert!(pools.windows(2).all(|w| w[0].apy >= w[1].apy));
        assert!(!pools.iter().any(|p| p.pool_id == "dust-pool"));
    }

    #[test]
    fn test_apy_floor_commutes() {
        let wide: Vec<PoolRecord> = filter_pools(sample_pools(), &open_filter(0.0))
            .into_iter()
            .filter(|p| p.apy >= 5.0)
            .collect();
        assert_eq!(wide, filter_pools(sample_pools(), &open_filter(5.0)));
    }

    #[test]
    fn test_risk_chain_and_protocol_filters() {
        let low = PoolFilter {
            min_apy: 0.0,
            max_risk: RiskBucket::Low,
            ..PoolFilter::default()
        };
        assert!(filter_pools(sample_pools(), &low)
            .iter()
            .all(|p| score_risk(p).score <= 3));

        let by_chain = PoolFilter {
            chain: Some("arbitrum".into()),
            ..open_filter(0.0)
        };
        let pools = filter_pools(sample_pools(), &by_chain);
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].chain, "Arbitrum");

        let by_protocol = PoolFilter {
            protocols: Some(vec!["AAVE".into(), "Compound".into()]),
            ..open_filter(0.0)
        };
        let pools = filter_pools(sample_pools(), &by_protocol);
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].protocol, "compound-v3");

        let capped = PoolFilter {
            limit: 2,
            ..open_filter(0.0)
        };
        assert_eq!(filter_pools(sample_pools(), &capped).len(), 2);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample_pools());
        assert_eq!(summary.total_pools, 9);
        assert_eq!(summary.active_chains, 4);
        assert_eq!(summary.top_protocols[0].protocol, "frax-ether");
        assert!(summary.avg_apy > 0.0);

        let empty = summarize(&[]);
        assert!(empty.avg_apy == 0.0);
        assert!(empty.top_protocols.is_empty());
    }

    #[test]
    fn test_resolve_selections() {
        let pools = sample_pools();
        let picked = resolve_selections(
            &pools,
            &["curve-frax-usdc".into(), "AAVE".into(), "missing".into(), "aave".into()],
        );
        let ids: Vec<_> = picked.iter().map(|p| p.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["curve-frax-usdc", "aave-usdc-eth", "aave-usdc-eth"]);
    }

    #[tokio::test]
    async fn test_frax_pools() {
        let gw = MarketGateway::mock(NetworkConfig::default());
        let frax = gw.frax_pools(2).await.unwrap();
        assert_eq!(frax.pools.len(), 2);
        assert_eq!(frax.pools[0].pool_id, "fraxlend-fxs");
        assert!((frax.total_frax_tvl_usd - 454_500_000.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_price_falls_back() {
        let gw = gateway(MockChainRpc::default(), MockPriceSource::failing(), NetworkConfig::default());
        assert!((gw.fetch_spot_price_usd("ETH").await - FALLBACK_ETH_PRICE_USD).abs() < f64::EPSILON);

        let live = gateway(MockChainRpc::default(), MockPriceSource::new(), NetworkConfig::default());
        assert!((live.fetch_spot_price_usd("eth").await - 3200.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_gas_quote_live_and_fallback() {
        let live = gateway(MockChainRpc::default(), MockPriceSource::new(), NetworkConfig::default());
        let quote = live.gas_quote().await;
        assert_eq!(quote.source, QuoteSource::Live);
        // 1 gwei * 150k gas * $3200
        assert!((quote.per_rebalance_usd - 0.48).abs() < 1e-9);

        let down = gateway(MockChainRpc::failing(), MockPriceSource::new(), NetworkConfig::default());
        assert_eq!(down.gas_quote().await, GasQuote::fallback());
    }

    #[tokio::test]
    async fn test_network_status_fails_hard() {
        let gw = gateway(MockChainRpc::failing(), MockPriceSource::new(), NetworkConfig::default());
        assert!(matches!(
            gw.network_status().await,
            Err(AdvisorError::NetworkUnavailable(_))
        ));
        assert!(gw.fetch_block_number().await.is_err());
    }

    #[tokio::test]
    async fn test_network_status_with_wallet() {
        let network = NetworkConfig::default()
            .with_wallet_key("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .unwrap();
        let gw = gateway(MockChainRpc::default(), MockPriceSource::new(), network);
        let status = gw.network_status().await.unwrap();

        assert!(status.chain_matches());
        assert!(status.wallet_configured());
        assert!(status
            .wallet
            .address
            .as_deref()
            .unwrap()
            .eq_ignore_ascii_case("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert_eq!(status.wallet_balance(), Some("1.5 FRAX"));
        assert_eq!(status.gas_price_wei, "1000000000");
        assert_eq!(status.block_number, 1_234_567);
    }

    #[tokio::test]
    async fn test_network_status_without_wallet() {
        let gw = gateway(MockChainRpc::new(252), MockPriceSource::new(), NetworkConfig::default());
        let status = gw.network_status().await.unwrap();
        assert!(!status.chain_matches());
        assert!(!status.wallet_configured());
        assert!(status.wallet_balance().is_none());
    }

    #[test]
    fn test_bad_wallet_key_leaves_wallet_unconfigured() {
        assert!(NetworkConfig::default().with_wallet_key("not-a-key").is_err());
        assert!(!NetworkConfig::default().wallet_configured());
    }
}
