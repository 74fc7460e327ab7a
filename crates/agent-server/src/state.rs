//! Application State

use std::sync::Arc;

use yield_advisor::YieldAdvisor;

/// Shared application state, built once in `main`
#[derive(Clone)]
pub struct AppState {
    /// Router, tools and model client for every request
    pub advisor: Arc<YieldAdvisor>,

    /// Include error details in 500 payloads
    pub debug: bool,

    /// Static market sources are in use
    pub mock_market_data: bool,
}
