//! Pool Risk Scorer
//!
//! Point accumulation on TVL, APY and stablecoin membership. The rule order
//! is fixed; changing it changes scores.

use crate::model::{format_tvl, PoolRecord, RiskAssessment, RiskBucket};

const BASE_SCORE: i32 = 5;
const MIN_SCORE: i32 = 1;
const MAX_SCORE: i32 = 10;

/// Symbol fragments that mark a stablecoin pool (case-sensitive)
pub const STABLE_SYMBOL_MARKERS: [&str; 3] = ["USD", "DAI", "FRAX"];

/// Score one pool.
///
/// Scores of 6 and above land in `RiskBucket::Low`, 4 and 5 in `Medium`,
/// anything lower in `High`. The bucket names run opposite to the score.
pub fn score_risk(pool: &PoolRecord) -> RiskAssessment {
    let mut score = BASE_SCORE;
    let mut notes = vec![format!("base {BASE_SCORE}")];

    let tvl = format_tvl(pool.tvl_usd);
    if pool.tvl_usd < 1_000_000.0 {
        score += 3;
        notes.push(format!("TVL {tvl} under $1M +3"));
    } else if pool.tvl_usd < 10_000_000.0 {
        score += 1;
        notes.push(format!("TVL {tvl} under $10M +1"));
    } else {
        score -= 1;
        notes.push(format!("TVL {tvl} at or above $10M -1"));
    }

    if pool.apy > 50.0 {
        score += 2;
        notes.push(format!("APY {:.2}% over 50% +2", pool.apy));
    } else if pool.apy > 20.0 {
        score += 1;
        notes.push(format!("APY {:.2}% over 20% +1", pool.apy));
    }

    if STABLE_SYMBOL_MARKERS
        .iter()
        .any(|marker| pool.pool_symbol.contains(marker))
    {
        score -= 2;
        notes.push(format!("stable symbol {} -2", pool.pool_symbol));
    }

    let score = score.clamp(MIN_SCORE, MAX_SCORE);
    let bucket = if score >= 6 {
        RiskBucket::Low
    } else if score >= 4 {
        RiskBucket::Medium
    } else {
        RiskBucket::High
    };

    RiskAssessment {
        // clamped to 1..=10 above
        score: u8::try_from(score).unwrap_or(10),
        bucket,
        rationale: format!("{} => {score}", notes.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IlRisk;

    fn pool(symbol: &str, apy: f64, tvl_usd: f64) -> PoolRecord {
        PoolRecord {
            pool_id: "id".into(),
            protocol: "proto".into(),
            pool_symbol: symbol.into(),
            chain: "Ethereum".into(),
            apy,
            tvl_usd,
            is_stablecoin: false,
            il_risk: IlRisk::Unknown,
        }
    }

    #[test]
    fn test_large_stable_pool_scores_two() {
        let risk = score_risk(&pool("USDC", 4.0, 50_000_000.0));
        assert_eq!(risk.score, 2);
        assert_eq!(risk.bucket, RiskBucket::High);
    }

    #[test]
    fn test_small_hot_pool_scores_ten() {
        let risk = score_risk(&pool("PEPE-WETH", 120.0, 400_000.0));
        assert_eq!(risk.score, 10);
        assert_eq!(risk.bucket, RiskBucket::Low);
    }

    #[test]
    fn test_clamps_and_boundaries() {
        // 5 - 1 + 0 - 2 = 2, never below 1
        assert_eq!(score_risk(&pool("FRAX-DAI", 0.0, 10_000_000.0)).score, 2);
        // exactly 20% APY earns nothing, exactly $1M is the middle band
        let mid = score_risk(&pool("WETH", 20.0, 1_000_000.0));
        assert_eq!(mid.score, 6);
        assert_eq!(mid.bucket, RiskBucket::Low);
        // 5 + 1 + 1 = 7 ... minus stable 2 = 5
        let medium = score_risk(&pool("sUSDe", 25.0, 5_000_000.0));
        assert_eq!(medium.score, 5);
        assert_eq!(medium.bucket, RiskBucket::Medium);
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        assert_eq!(score_risk(&pool("usdc", 4.0, 50_000_000.0)).score, 4);
    }

    #[test]
    fn test_scoring_is_pure() {
        let p = pool("ETH-USDC", 33.0, 2_000_000.0);
        assert_eq!(score_risk(&p), score_risk(&p));
    }
}
