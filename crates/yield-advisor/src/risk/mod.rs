//! Risk Rules
//!
//! Two independent rule sets:
//!
//! - [`score_risk`]: per-pool point score and bucket
//! - [`RiskTolerance::rule`]: profile-based pool eligibility table

mod scorer;
mod tiers;

pub use scorer::{score_risk, STABLE_SYMBOL_MARKERS};
pub use tiers::{recommend_pools, Recommendation, RiskTolerance, TierRule};
