//! Error Types for Yield Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Caller input rejected at the boundary
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A REST data source could not be reached or answered garbage
    #[error("Upstream unavailable: {source_name}: {message}")]
    UpstreamUnavailable {
        source_name: &'static str,
        message: String,
    },

    /// Chain state could not be read; never papered over with a default
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Simulation requested but none of the selected pools resolved
    #[error("No matching pools found for simulation")]
    EmptySelection,

    /// JSON-RPC call failed at the transport or node
    #[error("RPC {method} failed: {message}")]
    Rpc { method: &'static str, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn upstream(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            source_name,
            message: message.into(),
        }
    }
}
