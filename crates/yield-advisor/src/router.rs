//! Intent Router
//!
//! Flat, ordered keyword table. Every rule is checked independently, so one
//! message can fire zero, one or several intents; they come back in table
//! order. Matching is case-insensitive substring search.

use agent_core::ToolCall;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::svckit::names;

/// Principal assumed when a simulation request names no amount
pub const DEFAULT_SIMULATION_USD: f64 = 1000.0;

/// Horizon assumed when a simulation request names no duration
pub const DEFAULT_SIMULATION_DAYS: u32 = 30;

/// A gateway-backed fetch the message asks for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    ScanPools,
    EthPrice,
    FraxPools,
    SimulateHarvest { amount_usd: f64, duration_days: u32 },
    MarketOverview,
    NetworkStatus,
}

#[derive(Clone, Copy, Debug)]
enum Matcher {
    /// Any keyword present
    Any(&'static [&'static str]),
    /// Every keyword present
    All(&'static [&'static str]),
}

impl Matcher {
    fn matches(self, text: &str) -> bool {
        match self {
            Self::Any(words) => words.iter().any(|w| text.contains(w)),
            Self::All(words) => words.iter().all(|w| text.contains(w)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Topic {
    Yield,
    Price,
    Frax,
    Simulation,
    Market,
    Network,
}

const RULES: [(Topic, Matcher); 6] = [
    (Topic::Yield, Matcher::Any(&["yield", "apy", "pool", "opportunit"])),
    (Topic::Price, Matcher::All(&["eth", "price"])),
    (Topic::Frax, Matcher::Any(&["frax"])),
    (Topic::Simulation, Matcher::Any(&["simulat", "return"])),
    (Topic::Market, Matcher::Any(&["market", "overview"])),
    (Topic::Network, Matcher::Any(&["fraxtal", "testnet"])),
];

/// Map a free-text message to the intents it triggers
pub fn route(message: &str) -> Vec<Intent> {
    let text = message.to_lowercase();

    let intents: Vec<Intent> = RULES
        .iter()
        .filter(|(_, matcher)| matcher.matches(&text))
        .map(|(topic, _)| match topic {
            Topic::Yield => Intent::ScanPools,
            Topic::Price => Intent::EthPrice,
            Topic::Frax => Intent::FraxPools,
            Topic::Simulation => Intent::SimulateHarvest {
                amount_usd: extract_amount_usd(message).unwrap_or(DEFAULT_SIMULATION_USD),
                duration_days: extract_days(message).unwrap_or(DEFAULT_SIMULATION_DAYS),
            },
            Topic::Market => Intent::MarketOverview,
            Topic::Network => Intent::NetworkStatus,
        })
        .collect();

    debug!(?intents, "Routed message");
    intents
}

impl Intent {
    /// Tool call that serves this intent
    pub fn tool_call(&self) -> ToolCall {
        match self {
            Self::ScanPools => ToolCall::new(names::SCAN_YIELD_POOLS),
            Self::EthPrice => ToolCall::new(names::GET_CURRENT_ETH_PRICE),
            Self::FraxPools => ToolCall::new(names::GET_FRAX_POOLS),
            Self::SimulateHarvest {
                amount_usd,
                duration_days,
            } => ToolCall::new(names::SIMULATE_HARVEST)
                .arg("investmentAmount", *amount_usd)
                .arg("durationDays", *duration_days),
            Self::MarketOverview => ToolCall::new(names::GET_MARKET_CONDITIONS),
            Self::NetworkStatus => ToolCall::new(names::CHECK_FRAXTAL_STATUS),
        }
    }
}

fn tokens(message: &str) -> Vec<&str> {
    message.split_whitespace().collect()
}

fn trim_punct(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, '.' | ',' | '?' | '!' | ';' | ':' | '(' | ')'))
}

/// `5,000` / `2.5k` / `1m` as a positive number
fn parse_amount(raw: &str) -> Option<f64> {
    let raw = trim_punct(raw).to_ascii_lowercase().replace(',', "");
    let (digits, scale) = match raw.strip_suffix('k') {
        Some(d) => (d, 1_000.0),
        None => match raw.strip_suffix('m') {
            Some(d) => (d, 1_000_000.0),
            None => (raw.as_str(), 1.0),
        },
    };
    let value = digits.parse::<f64>().ok()? * scale;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// First currency-looking amount: `$5,000`, `5000 usd`, `2k dollars`
pub fn extract_amount_usd(message: &str) -> Option<f64> {
    let words = tokens(message);
    words.iter().enumerate().find_map(|(i, word)| {
        if let Some(rest) = word.strip_prefix('$') {
            return parse_amount(rest);
        }
        let unit = words.get(i + 1).map(|w| trim_punct(w).to_ascii_lowercase())?;
        matches!(unit.as_str(), "usd" | "usdc" | "dollar" | "dollars")
            .then(|| parse_amount(word))
            .flatten()
    })
}

/// First `<n> day(s)` within the simulation horizon
fn extract_days(message: &str) -> Option<u32> {
    let words = tokens(message);
    words.windows(2).find_map(|pair| {
        let unit = trim_punct(pair[1]).to_ascii_lowercase();
        if unit != "day" && unit != "days" {
            return None;
        }
        trim_punct(pair[0])
            .parse::<u32>()
            .ok()
            .filter(|d| (1..=crate::model::MAX_SIMULATION_DAYS).contains(d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_routes_nowhere() {
        assert!(route("").is_empty());
        assert!(route("hi").is_empty());
    }

    #[test]
    fn test_multiple_topics_fire_in_table_order() {
        assert_eq!(route("show me frax yield"), vec![Intent::ScanPools, Intent::FraxPools]);
        assert_eq!(
            route("Fraxtal testnet status and ETH PRICE"),
            vec![Intent::EthPrice, Intent::FraxPools, Intent::NetworkStatus]
        );
    }

    #[test]
    fn test_price_needs_both_words() {
        assert!(route("what is the price of gold").is_empty());
        assert_eq!(route("eth?"), Vec::<Intent>::new());
        assert_eq!(route("ETH price now"), vec![Intent::EthPrice]);
    }

    #[test]
    fn test_simulation_amount() {
        assert_eq!(
            route("simulate $5,000 for 90 days"),
            vec![Intent::SimulateHarvest {
                amount_usd: 5000.0,
                duration_days: 90
            }]
        );
        assert_eq!(
            route("what returns on 2.5k dollars?"),
            vec![Intent::SimulateHarvest {
                amount_usd: 2500.0,
                duration_days: DEFAULT_SIMULATION_DAYS
            }]
        );
        assert_eq!(
            route("simulate something"),
            vec![Intent::SimulateHarvest {
                amount_usd: DEFAULT_SIMULATION_USD,
                duration_days: DEFAULT_SIMULATION_DAYS
            }]
        );
    }

    #[test]
    fn test_extractors() {
        assert_eq!(extract_amount_usd("put 750 USD in"), Some(750.0));
        assert_eq!(extract_amount_usd("$0"), None);
        assert_eq!(extract_amount_usd("1000 apples"), None);
        assert_eq!(extract_days("over 400 days"), None);
        assert_eq!(extract_days("over 1 day."), Some(1));
    }

    #[test]
    fn test_tool_calls() {
        let call = Intent::SimulateHarvest {
            amount_usd: 1000.0,
            duration_days: 30,
        }
        .tool_call();
        assert_eq!(call.name, names::SIMULATE_HARVEST);
        assert_eq!(call.f64_arg("investmentAmount"), Some(1000.0));
        assert_eq!(call.u64_arg("durationDays"), Some(30));
        assert_eq!(Intent::NetworkStatus.tool_call().name, names::CHECK_FRAXTAL_STATUS);
    }
}
