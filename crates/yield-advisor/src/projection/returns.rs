//! Yield growth formulas

use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// Principal after `days` of daily compounding at `apy` percent
pub fn compound_growth(principal: f64, apy: f64, days: u32) -> f64 {
    let daily_rate = apy / 100.0 / DAYS_PER_YEAR;
    principal * (1.0 + daily_rate).powi(i32::try_from(days).unwrap_or(i32::MAX))
}

/// Principal after `days` of simple interest at `apy` percent
pub fn simple_growth(principal: f64, apy: f64, days: u32) -> f64 {
    principal * (1.0 + apy / 100.0 * f64::from(days) / DAYS_PER_YEAR)
}

/// Return left after paying gas
pub fn net_roi(projected_return: f64, gas_cost_usd: f64) -> f64 {
    projected_return - gas_cost_usd
}

/// Simple-interest earnings for an amount at a target APY
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedReturns {
    pub daily: f64,
    pub monthly: f64,
    pub yearly: f64,
}

pub fn projected_returns(amount_usd: f64, apy: f64) -> ProjectedReturns {
    let yearly = amount_usd * apy / 100.0;
    ProjectedReturns {
        daily: yearly / DAYS_PER_YEAR,
        monthly: yearly / 12.0,
        yearly,
    }
}
