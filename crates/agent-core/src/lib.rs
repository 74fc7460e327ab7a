//! # agent-core
//!
//! Provider-agnostic LLM abstraction, a small tool framework, and the
//! single-pass agent that turns fetched context into a model prompt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Prompt    │  │    Tool     │  │   LlmProvider       │  │
//! │  │  Composer   │──│   Results   │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tools are selected and executed by the caller (for example a keyword
//! router); the agent only folds their results into the prompt and asks the
//! provider once.

pub mod provider;
pub mod tool;
pub mod composer;
pub mod message;
pub mod error;

pub use composer::{Agent, AgentBuilder, AgentConfig};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
