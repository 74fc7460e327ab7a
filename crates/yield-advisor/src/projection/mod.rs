//! Financial Projection Engine
//!
//! Pure functions only. Live inputs (gas price, spot price, pools) are
//! fetched by the gateway and passed in, so identical inputs always give
//! identical results.

mod gas;
mod harvest;
mod returns;

pub use gas::{gas_per_rebalance_usd, wei_to_ether, GasQuote, FALLBACK_GAS_USD, GAS_UNITS_PER_REBALANCE};
pub use harvest::{simulate, simulate_at_fallback_apy, CHECKPOINT_DAYS, FALLBACK_APY, REBALANCE_INTERVAL_DAYS};
pub use returns::{compound_growth, net_roi, projected_returns, simple_growth, ProjectedReturns};
