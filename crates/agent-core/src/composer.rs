//! Response Composer
//!
//! Builds one prompt out of the system instructions, any data fetched for
//! the request, and the user's message, then asks the provider once.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::ToolResult;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System instructions sent with every request
    pub system_prompt: String,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant.

When live data is attached to the conversation, base your answer on it and cite the numbers.
If no data is attached, answer from general knowledge.
Be concise and accurate.";

/// Single-pass agent: compose, complete, return text
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(provider, AgentConfig::default())
    }

    /// Build the conversation for one request
    pub fn compose(&self, question: &str, context: &[ToolResult]) -> Conversation {
        let mut conversation = Conversation::with_system_prompt(&self.config.system_prompt);

        for result in context {
            conversation.push(Message::tool(&result.name, Self::format_tool_result(result)));
        }

        conversation.push(Message::user(question));
        conversation
    }

    /// Answer a question, optionally grounded on fetched data
    ///
    /// The generated text is returned verbatim.
    pub async fn respond(&self, question: &str, context: &[ToolResult]) -> Result<String> {
        let conversation = self.compose(question, context);

        tracing::debug!(
            model = %self.config.generation.model,
            context = context.len(),
            "Requesting completion"
        );

        let completion = self
            .provider
            .complete(conversation.messages(), &self.config.generation)
            .await?;

        Ok(completion.content)
    }

    /// Format tool result for the prompt
    fn format_tool_result(result: &ToolResult) -> String {
        let header = if result.success {
            format!("[Data from '{}']", result.name)
        } else {
            format!("[Data source '{}' failed]", result.name)
        };

        match &result.data {
            Some(data) => {
                let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
                format!("{header}\n{}\n{json}", result.output)
            }
            None => format!("{header}\n{}", result.output),
        }
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, self.config))
    }
}
