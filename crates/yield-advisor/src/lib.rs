//! # yield-advisor
//!
//! DeFi yield advisor: scans yield pools, scores their risk, projects
//! harvest returns net of gas and reports Fraxtal testnet state.
//!
//! ## Request Flow
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ message  │──▶│ Intent Router│──▶│ Tools (seq.) │──▶│ Agent (1 LLM │
//! └──────────┘   │ keyword table│   │ via Gateway  │   │  completion) │
//!                └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! The gateway talks to a yield aggregator, a spot-price API and an EVM
//! JSON-RPC node. Price and gas lookups degrade to fixed fallbacks; chain
//! status lookups fail loudly.

pub mod advisor;
pub mod error;
pub mod gateway;
pub mod model;
pub mod projection;
pub mod risk;
pub mod router;
pub mod svckit;

pub use advisor::YieldAdvisor;
pub use error::{AdvisorError, Result};
pub use gateway::{GatewayConfig, MarketGateway, NetworkConfig};
pub use model::{
    format_tvl, IlRisk, MarketSummary, NetworkStatus, PoolFilter, PoolRecord, RiskAssessment, RiskBucket,
    SimulationInput, SimulationResult,
};
pub use projection::simulate;
pub use risk::{recommend_pools, score_risk, RiskTolerance};
pub use router::{route, Intent};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        names, registry, EthPriceTool, FraxPoolsTool, FraxtalStatusTool, HarvestSimulatorTool,
        MarketConditionsTool, RiskProfileTool, ScanPoolsTool,
    };
}

/// System prompt for the yield advisor agent
pub const YIELD_ADVISOR_PROMPT: &str = r"You are YieldForge, a DeFi yield optimization advisor focused on Frax Finance and the Fraxtal testnet.

## What You Do

1. Find yield opportunities across DeFi protocols and explain APY, TVL and risk
2. Score pool risk on a 1-10 scale and explain what drives the score
3. Simulate harvest strategies: compounding, weekly rebalancing and gas costs
4. Report live Fraxtal testnet status: chain id, block height, gas price, wallet

## Using Live Data

Live data may be attached to the conversation as tool results:

- `SCAN_YIELD_POOLS` - filtered pools with APY, TVL and risk score
- `GET_CURRENT_ETH_PRICE` - ETH spot price in USD
- `GET_FRAX_POOLS` - Frax Finance pools and total Frax TVL
- `SIMULATE_HARVEST` - projected returns, gas costs, net profit and ROI
- `GET_MARKET_CONDITIONS` - total TVL, average APY and top protocols
- `CHECK_FRAXTAL_STATUS` - network and wallet status

When data is attached, cite its numbers. When a data source failed, say so and do not invent figures.
When nothing is attached, answer from general DeFi knowledge and suggest what the user could ask for.

## Risk Communication

Always mention impermanent loss for non-stablecoin pairs, smart-contract risk for young protocols,
and that projections are estimates, not guarantees. Never present an APY as guaranteed.";
