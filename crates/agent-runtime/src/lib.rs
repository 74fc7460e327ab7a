//! # agent-runtime
//!
//! Hosted model providers for the yieldforge agent.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language API over HTTPS
//! - **OpenAI** (not yet): OpenAI API integration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::GeminiProvider;
//!
//! let provider = GeminiProvider::from_config(GeminiConfig::default());
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use agent_core::{Agent, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry};
