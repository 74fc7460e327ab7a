//! Risk Tolerance Tiers
//!
//! Profile-based eligibility table. This is a separate rule set from the
//! point scorer: a pool's score never feeds into tier eligibility.

use serde::{Deserialize, Serialize};

use crate::model::{IlRisk, PoolRecord, RiskAssessment};
use super::score_risk;

/// Most recommendations returned for one profile
const MAX_RECOMMENDATIONS: usize = 5;

/// User risk tolerance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

/// Eligibility limits for one tolerance level
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRule {
    /// APY ceiling in percent
    pub max_apy: f64,
    /// TVL floor in USD
    pub min_tvl_usd: f64,
    pub stablecoin_only: bool,
    /// Highest impermanent-loss exposure allowed
    pub il_risk_ceiling: IlRisk,
}

impl RiskTolerance {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Some(Self::Conservative),
            "moderate" => Some(Self::Moderate),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }

    pub const fn rule(self) -> TierRule {
        match self {
            Self::Conservative => TierRule {
                max_apy: 15.0,
                min_tvl_usd: 10_000_000.0,
                stablecoin_only: true,
                il_risk_ceiling: IlRisk::None,
            },
            Self::Moderate => TierRule {
                max_apy: 30.0,
                min_tvl_usd: 5_000_000.0,
                stablecoin_only: false,
                il_risk_ceiling: IlRisk::Low,
            },
            Self::Aggressive => TierRule {
                max_apy: 100.0,
                min_tvl_usd: 1_000_000.0,
                stablecoin_only: false,
                il_risk_ceiling: IlRisk::High,
            },
        }
    }

    /// Headline score shown for the profile itself (3 / 6 / 9)
    pub const fn profile_score(self) -> u8 {
        match self {
            Self::Conservative => 3,
            Self::Moderate => 6,
            Self::Aggressive => 9,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Conservative => "Focus on stablecoin pools and established protocols",
            Self::Moderate => "Mix of stablecoins and blue-chip token pairs",
            Self::Aggressive => "Higher risk/reward with newer protocols and tokens",
        }
    }

    pub const fn recommended_protocols(self) -> &'static [&'static str] {
        match self {
            Self::Conservative => &["Aave", "Compound", "Frax"],
            Self::Moderate => &["Uniswap", "Curve", "Balancer", "Frax"],
            Self::Aggressive => &["Uniswap", "SushiSwap", "PancakeSwap"],
        }
    }
}

impl TierRule {
    /// Whether a pool fits this tier
    pub fn admits(&self, pool: &PoolRecord, require_stablecoin: bool) -> bool {
        if pool.tvl_usd < self.min_tvl_usd || pool.apy > self.max_apy {
            return false;
        }
        if (self.stablecoin_only || require_stablecoin) && !pool.is_stablecoin {
            return false;
        }
        pool.il_risk.rank() <= self.il_risk_ceiling.rank()
    }
}

/// One pool recommended for a profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub pool: PoolRecord,
    pub risk: RiskAssessment,
    pub note: String,
}

/// Pick the best pools for a tolerance level, highest APY first
pub fn recommend_pools(
    pools: &[PoolRecord],
    tolerance: RiskTolerance,
    target_apy: Option<f64>,
    prefer_stablecoins: bool,
) -> Vec<Recommendation> {
    let rule = tolerance.rule();
    let floor = target_apy.filter(|t| *t > 0.0);

    let mut eligible: Vec<&PoolRecord> = pools
        .iter()
        .filter(|p| rule.admits(p, prefer_stablecoins))
        .filter(|p| floor.is_none_or(|t| p.apy >= t))
        .collect();

    eligible.sort_by(|a, b| b.apy.total_cmp(&a.apy));
    eligible.truncate(MAX_RECOMMENDATIONS);

    eligible
        .into_iter()
        .map(|pool| Recommendation {
            pool: pool.clone(),
            risk: score_risk(pool),
            note: note_for(pool, tolerance),
        })
        .collect()
}

fn note_for(pool: &PoolRecord, tolerance: RiskTolerance) -> String {
    match tolerance {
        RiskTolerance::Conservative if pool.is_stablecoin => format!(
            "Excellent choice for conservative investors. Stable {:.2}% APY with minimal risk.",
            pool.apy
        ),
        RiskTolerance::Conservative => "Consider stablecoin alternatives for lower risk.".into(),
        RiskTolerance::Moderate if pool.apy > 15.0 => format!(
            "Good balance of risk and reward. {:.2}% APY with moderate volatility.",
            pool.apy
        ),
        RiskTolerance::Moderate => "Acceptable returns for moderate risk tolerance.".into(),
        RiskTolerance::Aggressive if pool.apy > 30.0 => format!(
            "High yield opportunity at {:.2}% APY. Monitor closely for volatility.",
            pool.apy
        ),
        RiskTolerance::Aggressive => "Consider higher APY pools for aggressive strategy.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(symbol: &str, apy: f64, tvl_usd: f64, stable: bool, il: IlRisk) -> PoolRecord {
        PoolRecord {
            pool_id: symbol.to_lowercase(),
            protocol: "curve".into(),
            pool_symbol: symbol.into(),
            chain: "Ethereum".into(),
            apy,
            tvl_usd,
            is_stablecoin: stable,
            il_risk: il,
        }
    }

    #[test]
    fn test_conservative_rule() {
        let rule = RiskTolerance::Conservative.rule();
        assert!(rule.admits(&pool("USDC", 8.0, 20_000_000.0, true, IlRisk::None), false));
        assert!(!rule.admits(&pool("USDC", 16.0, 20_000_000.0, true, IlRisk::None), false));
        assert!(!rule.admits(&pool("USDC", 8.0, 9_000_000.0, true, IlRisk::None), false));
        assert!(!rule.admits(&pool("ETH", 8.0, 20_000_000.0, false, IlRisk::None), false));
        assert!(!rule.admits(&pool("USDC", 8.0, 20_000_000.0, true, IlRisk::Unknown), false));
    }

    #[test]
    fn test_aggressive_accepts_unknown_il() {
        let rule = RiskTolerance::Aggressive.rule();
        assert!(rule.admits(&pool("PEPE", 90.0, 2_000_000.0, false, IlRisk::Unknown), false));
        assert!(!rule.admits(&pool("PEPE", 90.0, 2_000_000.0, false, IlRisk::Unknown), true));
    }

    #[test]
    fn test_recommend_sorts_filters_and_caps() {
        let pools: Vec<_> = (0..8)
            .map(|i| pool(&format!("USD{i}"), 10.0 + f64::from(i), 6_000_000.0, true, IlRisk::Low))
            .collect();

        let recs = recommend_pools(&pools, RiskTolerance::Moderate, Some(12.0), true);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].pool.pool_symbol, "USD7");
        assert!(recs.iter().all(|r| r.pool.apy >= 12.0));
        assert!(recs[0].note.starts_with("Good balance"));
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(RiskTolerance::parse("Aggressive"), Some(RiskTolerance::Aggressive));
        assert!(RiskTolerance::parse("yolo").is_none());
        assert_eq!(RiskTolerance::Moderate.profile_score(), 6);
    }
}
