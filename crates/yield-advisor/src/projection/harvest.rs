//! Harvest Simulation

use crate::error::{AdvisorError, Result};
use crate::model::{Checkpoint, PoolRecord, QuoteSource, SimulationInput, SimulationResult};

use super::gas::GasQuote;
use super::returns::{compound_growth, net_roi, simple_growth};

/// Fixed weekly rebalance cadence
pub const REBALANCE_INTERVAL_DAYS: u32 = 7;

/// Illustrative curve points, independent of the simulated duration
pub const CHECKPOINT_DAYS: [u32; 4] = [7, 30, 90, 365];

/// APY assumed when the pool list is unavailable
pub const FALLBACK_APY: f64 = 12.0;

/// Project a position across the resolved pools.
///
/// Pools are blended with equal weight. Checkpoints always use daily
/// compounding from day 0, even when `auto_compound` is off.
pub fn simulate(
    input: &SimulationInput,
    pools: &[PoolRecord],
    gas: GasQuote,
) -> Result<SimulationResult> {
    if pools.is_empty() {
        return Err(AdvisorError::EmptySelection);
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_apy = pools.iter().map(|p| p.apy).sum::<f64>() / pools.len() as f64;

    Ok(project(input, pools.to_vec(), avg_apy, QuoteSource::Live, gas))
}

/// Project a position at [`FALLBACK_APY`], with no pools attached
pub fn simulate_at_fallback_apy(input: &SimulationInput, gas: GasQuote) -> SimulationResult {
    project(input, Vec::new(), FALLBACK_APY, QuoteSource::Fallback, gas)
}

fn project(
    input: &SimulationInput,
    pools: Vec<PoolRecord>,
    avg_apy: f64,
    apy_source: QuoteSource,
    gas: GasQuote,
) -> SimulationResult {
    let principal = input.principal_usd;
    let days = input.duration_days;

    let final_amount_usd = if input.auto_compound {
        compound_growth(principal, avg_apy, days)
    } else {
        simple_growth(principal, avg_apy, days)
    };

    let rebalance_count = days / REBALANCE_INTERVAL_DAYS;
    let gas_cost_usd = f64::from(rebalance_count) * gas.per_rebalance_usd;
    let gross_profit_usd = final_amount_usd - principal;
    let net_profit_usd = net_roi(gross_profit_usd, gas_cost_usd);

    let checkpoints = CHECKPOINT_DAYS
        .iter()
        .map(|&day| Checkpoint {
            day,
            amount_usd: compound_growth(principal, avg_apy, day),
        })
        .collect();

    SimulationResult {
        principal_usd: principal,
        duration_days: days,
        auto_compound: input.auto_compound,
        pools,
        avg_apy,
        final_amount_usd,
        gross_profit_usd,
        gas_per_rebalance_usd: gas.per_rebalance_usd,
        gas_source: gas.source,
        apy_source,
        rebalance_count,
        gas_cost_usd,
        net_profit_usd,
        roi_percent: net_profit_usd / principal * 100.0,
        checkpoints,
    }
}
