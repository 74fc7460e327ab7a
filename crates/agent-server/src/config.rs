//! Server Configuration
//!
//! Read once from the environment at start-up. In strict mode any invalid or
//! missing required value aborts start-up; otherwise it is logged and the
//! default is used.

use agent_core::provider::DEFAULT_MODEL;
use agent_runtime::GeminiConfig;
use thiserror::Error;
use tracing::warn;
use yield_advisor::{GatewayConfig, NetworkConfig};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} must be an http(s) URL, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be an integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("WALLET_PRIVATE_KEY is not a valid private key")]
    InvalidWalletKey,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub strict: bool,
    /// `APP_ENV=development`: error payloads carry details
    pub debug: bool,
    pub mock_market_data: bool,
    pub gemini: GeminiConfig,
    pub gateway: GatewayConfig,
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// Collects problems, failing fast only in strict mode
struct Checker<F> {
    lookup: F,
    strict: bool,
}

impl<F: Fn(&str) -> Option<String>> Checker<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn reject<T>(&self, err: ConfigError, fallback: T) -> Result<T, ConfigError> {
        if self.strict {
            return Err(err);
        }
        warn!(error = %err, "Invalid configuration, using default");
        Ok(fallback)
    }

    fn url(&self, name: &'static str, default: &str) -> Result<String, ConfigError> {
        match self.get(name) {
            None => Ok(default.into()),
            Some(v) if is_http_url(&v) => Ok(v),
            Some(value) => self.reject(ConfigError::InvalidUrl { name, value }, default.into()),
        }
    }

    fn number(&self, name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => match value.trim().parse() {
                Ok(n) => Ok(n),
                Err(_) => self.reject(ConfigError::InvalidNumber { name, value }, default),
            },
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let strict = flag(lookup("STRICT_ENV"));
        let env = Checker { lookup, strict };

        let api_key = env.get("GOOGLE_API_KEY");
        if api_key.is_none() {
            env.reject(ConfigError::Missing("GOOGLE_API_KEY"), ())?;
        }

        let defaults = GatewayConfig::default();
        let network_defaults = NetworkConfig::default();

        let mut network = NetworkConfig {
            rpc_url: env.url("FRAXTAL_RPC_URL", &network_defaults.rpc_url)?,
            chain_id: env.number("FRAXTAL_CHAIN_ID", network_defaults.chain_id)?,
            explorer_url: env.url("FRAXTAL_EXPLORER", &network_defaults.explorer_url)?,
            ..network_defaults
        };
        if let Some(key) = env.get("WALLET_PRIVATE_KEY") {
            network = match network.clone().with_wallet_key(&key) {
                Ok(with_wallet) => with_wallet,
                Err(_) => env.reject(ConfigError::InvalidWalletKey, network)?,
            };
        }

        let gateway = GatewayConfig {
            defillama_base_url: env.url("DEFILLAMA_BASE_URL", &defaults.defillama_base_url)?,
            coingecko_base_url: env.url("COINGECKO_BASE_URL", &defaults.coingecko_base_url)?,
            network,
        };

        let gemini = GeminiConfig {
            api_key,
            base_url: env.url("GEMINI_BASE_URL", agent_runtime::gemini::DEFAULT_BASE_URL)?,
            default_model: env.get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
        };

        Ok(Self {
            bind_addr: env.get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            strict,
            debug: env
                .get("APP_ENV")
                .is_some_and(|v| v.eq_ignore_ascii_case("development")),
            mock_market_data: flag(env.get("MOCK_MARKET_DATA")),
            gemini,
            gateway,
        })
    }
}
