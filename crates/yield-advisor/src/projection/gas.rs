//! Gas Cost Estimation
//!
//! Wei amounts go through `rust_decimal` so the conversion to ether is exact
//! before any float math happens.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::QuoteSource;

/// Gas units budgeted for one harvest-and-restake rebalance
pub const GAS_UNITS_PER_REBALANCE: u64 = 150_000;

/// USD per rebalance used when the live gas price is unavailable
pub const FALLBACK_GAS_USD: f64 = 5.0;

const WEI_DECIMALS: u32 = 18;
const GAS_UNITS: Decimal = dec!(150000);

/// Per-rebalance gas cost and where it came from
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasQuote {
    pub per_rebalance_usd: f64,
    pub source: QuoteSource,
}

impl GasQuote {
    /// Quote from a live gas price and ETH spot price
    pub fn live(gas_price_wei: u128, eth_price_usd: f64) -> Self {
        match gas_per_rebalance_usd(gas_price_wei, eth_price_usd) {
            Some(per_rebalance_usd) => Self {
                per_rebalance_usd,
                source: QuoteSource::Live,
            },
            None => Self::fallback(),
        }
    }

    pub const fn fallback() -> Self {
        Self {
            per_rebalance_usd: FALLBACK_GAS_USD,
            source: QuoteSource::Fallback,
        }
    }
}

/// Exact wei -> ether conversion; `None` past 96 bits of wei
pub fn wei_to_ether(wei: u128) -> Option<Decimal> {
    let mut ether = Decimal::from_u128(wei)?;
    ether.set_scale(WEI_DECIMALS).ok()?;
    Some(ether.normalize())
}

/// `gas_price_wei * 150_000 / 1e18 * eth_price_usd`
pub fn gas_per_rebalance_usd(gas_price_wei: u128, eth_price_usd: f64) -> Option<f64> {
    let eth = wei_to_ether(gas_price_wei)?.checked_mul(GAS_UNITS)?;
    let usd = eth.to_f64()? * eth_price_usd;
    usd.is_finite().then_some(usd)
}
