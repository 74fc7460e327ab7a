//! Service Kit - Agent Tools
//!
//! Gateway-backed tools that implement `agent_core::Tool`. Each one turns a
//! gateway call into a text summary plus structured data for the prompt.

mod fraxtal_status;
mod harvest_simulator;
mod market_data;
mod pool_scanner;
mod risk_profile;

pub use fraxtal_status::FraxtalStatusTool;
pub use harvest_simulator::HarvestSimulatorTool;
pub use market_data::{EthPriceTool, MarketConditionsTool};
pub use pool_scanner::{FraxPoolsTool, ScanPoolsTool, DEFAULT_FRAX_LIMIT};
pub use risk_profile::RiskProfileTool;

use std::sync::Arc;

use agent_core::ToolRegistry;

use crate::gateway::MarketGateway;

/// Registered tool names
pub mod names {
    pub const SCAN_YIELD_POOLS: &str = "SCAN_YIELD_POOLS";
    pub const GET_CURRENT_ETH_PRICE: &str = "GET_CURRENT_ETH_PRICE";
    pub const GET_FRAX_POOLS: &str = "GET_FRAX_POOLS";
    pub const SIMULATE_HARVEST: &str = "SIMULATE_HARVEST";
    pub const GET_MARKET_CONDITIONS: &str = "GET_MARKET_CONDITIONS";
    pub const CHECK_FRAXTAL_STATUS: &str = "CHECK_FRAXTAL_STATUS";
    pub const ANALYZE_RISK_PROFILE: &str = "ANALYZE_RISK_PROFILE";
}

/// Registry with every tool bound to one gateway
pub fn registry(gateway: &Arc<MarketGateway>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ScanPoolsTool::new(Arc::clone(gateway)));
    registry.register(EthPriceTool::new(Arc::clone(gateway)));
    registry.register(FraxPoolsTool::new(Arc::clone(gateway)));
    registry.register(HarvestSimulatorTool::new(Arc::clone(gateway)));
    registry.register(MarketConditionsTool::new(Arc::clone(gateway)));
    registry.register(FraxtalStatusTool::new(Arc::clone(gateway)));
    registry.register(RiskProfileTool::new(Arc::clone(gateway)));
    registry
}
