//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with a payload none of the known reply shapes match
    #[error("Unrecognized provider response: {0}")]
    UnrecognizedResponse(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Errors raised while the hosted model was producing a reply.
    ///
    /// These are answered with an apologetic chat message instead of a
    /// failed HTTP request.
    pub const fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::ProviderUnavailable(_)
                | Self::UnrecognizedResponse(_)
                | Self::RateLimited(_)
                | Self::Auth(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            Self::UnrecognizedResponse(_) => "The AI service returned a response we could not read.".into(),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication with the AI service failed. Please check the API key.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_failures() {
        assert!(AgentError::Provider("boom".into()).is_inference_failure());
        assert!(AgentError::Auth("bad key".into()).is_inference_failure());
        assert!(AgentError::UnrecognizedResponse("{}".into()).is_inference_failure());
        assert!(!AgentError::Config("missing".into()).is_inference_failure());
        assert!(!AgentError::ToolNotFound("x".into()).is_inference_failure());
    }

    #[test]
    fn test_user_message_keeps_provider_detail() {
        let msg = AgentError::Provider("quota exceeded".into()).user_message();
        assert!(msg.contains("quota exceeded"));
    }
}
