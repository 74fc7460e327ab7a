//! Market-Data Gateway
//!
//! Abstractions over the three outbound data sources: the yield-pool
//! aggregator, the spot-price API and the EVM JSON-RPC node. Every call
//! re-fetches; nothing is cached between requests.

mod coingecko;
mod defillama;
mod market;
mod mock;
mod rpc;

pub use coingecko::CoinGeckoClient;
pub use defillama::DefiLlamaClient;
pub use market::{GatewayConfig, MarketGateway, NetworkConfig, PoolScan, FALLBACK_ETH_PRICE_USD};
pub use mock::{MockChainRpc, MockPriceSource, MockYieldSource};
pub use rpc::{wallet_address_from_key, EvmRpcClient};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::PoolRecord;

/// Yield-pool aggregator (Strategy pattern)
#[async_trait]
pub trait YieldSource: Send + Sync {
    /// Every pool the aggregator lists, normalized
    async fn pools(&self) -> Result<Vec<PoolRecord>>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Spot-price API
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// USD price for a ticker symbol such as "ETH"
    async fn spot_price_usd(&self, symbol: &str) -> Result<f64>;

    fn name(&self) -> &str;
}

/// Read-only EVM JSON-RPC calls
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn gas_price_wei(&self) -> Result<u128>;

    async fn block_number(&self) -> Result<u64>;

    async fn chain_id(&self) -> Result<u64>;

    /// Native balance of `address` at the latest block
    async fn balance_wei(&self, address: &str) -> Result<u128>;
}
