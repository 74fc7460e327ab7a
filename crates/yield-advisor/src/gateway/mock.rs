//! Static Market Sources
//!
//! For tests and offline demos. Prices and pools are fixed snapshots; each
//! source can be switched to fail so degraded paths can be exercised.

use async_trait::async_trait;

use super::{ChainRpc, PriceSource, YieldSource};
use crate::error::{AdvisorError, Result};
use crate::model::{IlRisk, PoolRecord};

fn pool(
    pool_id: &str,
    protocol: &str,
    symbol: &str,
    chain: &str,
    apy: f64,
    tvl_usd: f64,
    il_risk: IlRisk,
) -> PoolRecord {
    PoolRecord {
        pool_id: pool_id.into(),
        protocol: protocol.into(),
        pool_symbol: symbol.into(),
        chain: chain.into(),
        apy,
        tvl_usd,
        is_stablecoin: symbol
            .split('-')
            .all(|token| token.contains("USD") || token == "FRAX"),
        il_risk,
    }
}

/// Snapshot of a handful of representative pools
pub fn sample_pools() -> Vec<PoolRecord> {
    vec![
        pool("aave-usdc-eth", "aave-v3", "USDC", "Ethereum", 4.8, 320_000_000.0, IlRisk::None),
        pool("compound-usdt", "compound-v3", "USDT", "Ethereum", 6.1, 95_000_000.0, IlRisk::None),
        pool("frax-sfrax", "frax-ether", "SFRXETH", "Ethereum", 7.4, 410_000_000.0, IlRisk::None),
        pool("curve-frax-usdc", "curve-dex", "FRAX-USDC", "Ethereum", 9.2, 38_000_000.0, IlRisk::None),
        pool("fraxlend-fxs", "fraxlend", "FXS", "Fraxtal", 14.5, 6_500_000.0, IlRisk::None),
        pool("uni-weth-usdc", "uniswap-v3", "WETH-USDC", "Arbitrum", 22.3, 48_000_000.0, IlRisk::High),
        pool("aero-weth-aero", "aerodrome-v2", "WETH-AERO", "Base", 38.0, 7_200_000.0, IlRisk::High),
        pool("sushi-pepe-weth", "sushiswap", "PEPE-WETH", "Ethereum", 85.0, 450_000.0, IlRisk::High),
        pool("dust-pool", "tiny-swap", "ABC-XYZ", "Base", 140.0, 20_000.0, IlRisk::High),
    ]
}

/// Yield source backed by a fixed pool list
pub struct MockYieldSource {
    pools: Vec<PoolRecord>,
    fail: bool,
}

impl Default for MockYieldSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockYieldSource {
    pub fn new() -> Self {
        Self::with_pools(sample_pools())
    }

    pub fn with_pools(pools: Vec<PoolRecord>) -> Self {
        Self { pools, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            pools: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl YieldSource for MockYieldSource {
    async fn pools(&self) -> Result<Vec<PoolRecord>> {
        if self.fail {
            return Err(AdvisorError::upstream("mock", "yield source offline"));
        }
        Ok(self.pools.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Price source with static quotes
pub struct MockPriceSource {
    fail: bool,
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceSource {
    pub const fn new() -> Self {
        Self { fail: false }
    }

    pub const fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn spot_price_usd(&self, symbol: &str) -> Result<f64> {
        if self.fail {
            return Err(AdvisorError::upstream("mock", "price source offline"));
        }
        match symbol.trim().to_ascii_uppercase().as_str() {
            "ETH" | "WETH" => Ok(3200.0),
            "BTC" | "WBTC" => Ok(97_500.0),
            "FRAX" | "USDC" | "USDT" => Ok(1.0),
            "FXS" => Ok(2.9),
            other => Err(AdvisorError::upstream("mock", format!("no price for {other}"))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Chain node with a fixed head
pub struct MockChainRpc {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price_wei: u128,
    pub balance_wei: u128,
    fail: bool,
}

impl Default for MockChainRpc {
    fn default() -> Self {
        Self::new(2523)
    }
}

impl MockChainRpc {
    pub const fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            block_number: 1_234_567,
            gas_price_wei: 1_000_000_000,
            balance_wei: 1_500_000_000_000_000_000,
            fail: false,
        }
    }

    pub const fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(AdvisorError::NetworkUnavailable("mock node offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn gas_price_wei(&self) -> Result<u128> {
        self.check()?;
        Ok(self.gas_price_wei)
    }

    async fn block_number(&self) -> Result<u64> {
        self.check()?;
        Ok(self.block_number)
    }

    async fn chain_id(&self) -> Result<u64> {
        self.check()?;
        Ok(self.chain_id)
    }

    async fn balance_wei(&self, _address: &str) -> Result<u128> {
        self.check()?;
        Ok(self.balance_wei)
    }
}
