//! Domain Models
//!
//! Request-scoped value records. Nothing here is persisted or cached: pools
//! are fetched per call and every derived record is recomputed from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Pools below this TVL are treated as dust and never returned by a scan
pub const MIN_TVL_USD: f64 = 100_000.0;

/// Default number of pools a scan returns
pub const DEFAULT_POOL_LIMIT: usize = 20;

/// Longest simulation horizon accepted
pub const MAX_SIMULATION_DAYS: u32 = 365;

/// Most pools one simulation may blend
pub const MAX_POOL_SELECTIONS: usize = 5;

/// Impermanent-loss exposure as reported by the aggregator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IlRisk {
    None,
    Low,
    High,
    Unknown,
}

impl IlRisk {
    /// Parse the aggregator's `ilRisk` field ("no"/"yes" upstream)
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("no" | "none") => Self::None,
            Some("low") => Self::Low,
            Some("yes" | "high") => Self::High,
            _ => Self::Unknown,
        }
    }

    /// Ordering used for ceilings; unknown exposure counts as high
    pub const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::High | Self::Unknown => 2,
        }
    }
}

/// One yield pool as returned by the aggregator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    /// Aggregator pool identifier
    pub pool_id: String,

    /// Protocol / project slug (e.g., "aave-v3")
    pub protocol: String,

    /// Pool symbol (e.g., "USDC-FRAX")
    pub pool_symbol: String,

    /// Chain name as reported upstream (e.g., "Ethereum")
    pub chain: String,

    /// Total APY in percent
    pub apy: f64,

    /// Total value locked in USD
    pub tvl_usd: f64,

    pub is_stablecoin: bool,

    pub il_risk: IlRisk,
}

/// Risk bucket attached to a point score.
///
/// `Low` is assigned to the HIGHEST scores (see `risk::score_risk`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    /// Highest point score a pool may have to pass a `max_risk` filter
    pub const fn score_ceiling(self) -> u8 {
        match self {
            Self::Low => 3,
            Self::Medium => 6,
            Self::High => 10,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived from exactly one `PoolRecord`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Point score in `1..=10`
    pub score: u8,
    pub bucket: RiskBucket,
    pub rationale: String,
}

/// Scan criteria for `MarketGateway::fetch_pools`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFilter {
    /// APY floor in percent
    pub min_apy: f64,

    /// Point-score ceiling (see `RiskBucket::score_ceiling`)
    pub max_risk: RiskBucket,

    /// Exact chain match (case-insensitive)
    pub chain: Option<String>,

    /// Case-insensitive substrings matched against the protocol name
    pub protocols: Option<Vec<String>>,

    /// Maximum pools returned
    pub limit: usize,
}

impl Default for PoolFilter {
    fn default() -> Self {
        Self {
            min_apy: 5.0,
            max_risk: RiskBucket::Medium,
            chain: None,
            protocols: None,
            limit: DEFAULT_POOL_LIMIT,
        }
    }
}

/// Validated simulation request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub principal_usd: f64,
    pub duration_days: u32,
    /// Pool ids or name fragments, in the order given
    pub pool_selections: Vec<String>,
    pub auto_compound: bool,
}

impl SimulationInput {
    /// Validate and build
    pub fn new(
        principal_usd: f64,
        duration_days: u32,
        pool_selections: Vec<String>,
        auto_compound: bool,
    ) -> Result<Self> {
        if !principal_usd.is_finite() || principal_usd <= 0.0 {
            return Err(AdvisorError::Validation(format!(
                "principal must be positive, got {principal_usd}"
            )));
        }

        if !(1..=MAX_SIMULATION_DAYS).contains(&duration_days) {
            return Err(AdvisorError::Validation(format!(
                "duration must be between 1 and {MAX_SIMULATION_DAYS} days, got {duration_days}"
            )));
        }

        if pool_selections.is_empty() {
            return Err(AdvisorError::Validation("at least one pool must be selected".into()));
        }

        if pool_selections.len() > MAX_POOL_SELECTIONS {
            return Err(AdvisorError::Validation(format!(
                "at most {MAX_POOL_SELECTIONS} pools may be selected, got {}",
                pool_selections.len()
            )));
        }

        Ok(Self {
            principal_usd,
            duration_days,
            pool_selections,
            auto_compound,
        })
    }
}

/// Whether a figure came from a live source or a fixed fallback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Live,
    Fallback,
}

/// Value of the principal on a given day, compounding daily from day 0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub day: u32,
    pub amount_usd: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub principal_usd: f64,
    pub duration_days: u32,
    pub auto_compound: bool,
    pub pools: Vec<PoolRecord>,
    pub avg_apy: f64,
    pub final_amount_usd: f64,
    pub gross_profit_usd: f64,
    pub gas_per_rebalance_usd: f64,
    pub gas_source: QuoteSource,
    /// `Fallback` when the pool list could not be fetched
    pub apy_source: QuoteSource,
    pub rebalance_count: u32,
    pub gas_cost_usd: f64,
    pub net_profit_usd: f64,
    pub roi_percent: f64,
    pub checkpoints: Vec<Checkpoint>,
}

/// Wallet part of the network status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Formatted native balance, e.g. "1.5 FRAX"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

/// Live chain state, fetched fresh on every call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub network_name: String,
    pub chain_id: u64,
    pub expected_chain_id: u64,
    pub block_number: u64,
    /// Decimal integer string; wei amounts overflow JSON numbers
    pub gas_price_wei: String,
    pub wallet: WalletStatus,
    pub rpc_url: String,
    pub explorer_url: String,
    pub faucet_url: String,
    pub fetched_at: DateTime<Utc>,
}

impl NetworkStatus {
    pub const fn chain_matches(&self) -> bool {
        self.chain_id == self.expected_chain_id
    }

    pub const fn wallet_configured(&self) -> bool {
        self.wallet.configured
    }

    pub fn wallet_balance(&self) -> Option<&str> {
        self.wallet.balance.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolTvl {
    pub protocol: String,
    pub tvl_usd: f64,
}

/// Aggregate view over every pool the aggregator lists
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub total_tvl_usd: f64,
    pub avg_apy: f64,
    pub total_pools: usize,
    pub active_chains: usize,
    pub top_protocols: Vec<ProtocolTvl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraxPools {
    pub pools: Vec<PoolRecord>,
    /// Summed over every Frax-related pool, not just the returned ones
    pub total_frax_tvl_usd: f64,
}

/// Compact USD display: `$1.23B`, `$4.56M`, `$7.89K`, `$12.00`
pub fn format_tvl(tvl: f64) -> String {
    if tvl >= 1_000_000_000.0 {
        format!("${:.2}B", tvl / 1_000_000_000.0)
    } else if tvl >= 1_000_000.0 {
        format!("${:.2}M", tvl / 1_000_000.0)
    } else if tvl >= 1_000.0 {
        format!("${:.2}K", tvl / 1_000.0)
    } else {
        format!("${tvl:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_il_risk_parse() {
        assert_eq!(IlRisk::parse(Some("no")), IlRisk::None);
        assert_eq!(IlRisk::parse(Some("yes")), IlRisk::High);
        assert_eq!(IlRisk::parse(Some("LOW")), IlRisk::Low);
        assert_eq!(IlRisk::parse(None), IlRisk::Unknown);
        assert_eq!(IlRisk::Unknown.rank(), IlRisk::High.rank());
    }

    #[test]
    fn test_simulation_input_validation() {
        let pools = vec!["aave".to_string()];
        assert!(SimulationInput::new(1000.0, 30, pools.clone(), true).is_ok());
        assert!(SimulationInput::new(0.0, 30, pools.clone(), true).is_err());
        assert!(SimulationInput::new(-5.0, 30, pools.clone(), true).is_err());
        assert!(SimulationInput::new(f64::NAN, 30, pools.clone(), true).is_err());
        assert!(SimulationInput::new(1000.0, 0, pools.clone(), true).is_err());
        assert!(SimulationInput::new(1000.0, 366, pools, true).is_err());
        assert!(SimulationInput::new(1000.0, 30, Vec::new(), true).is_err());

        let six = (0..6).map(|i| format!("p{i}")).collect();
        assert!(matches!(
            SimulationInput::new(1000.0, 30, six, true),
            Err(AdvisorError::Validation(_))
        ));
    }

    #[test]
    fn test_format_tvl() {
        assert_eq!(format_tvl(2_500_000_000.0), "$2.50B");
        assert_eq!(format_tvl(12_340_000.0), "$12.34M");
        assert_eq!(format_tvl(7_890.0), "$7.89K");
        assert_eq!(format_tvl(12.0), "$12.00");
    }

    #[test]
    fn test_risk_bucket_ceiling() {
        assert_eq!(RiskBucket::parse("Medium"), Some(RiskBucket::Medium));
        assert_eq!(RiskBucket::Low.score_ceiling(), 3);
        assert_eq!(RiskBucket::High.score_ceiling(), 10);
        assert!(RiskBucket::parse("extreme").is_none());
    }
}
