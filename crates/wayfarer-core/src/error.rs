//! Error taxonomy.
//!
//! - [`ProviderError`]: the language-model transport failed or returned
//!   something unusable. Always propagated.
//! - [`ArgumentError`]: a tool argument was missing or mistyped. Tools turn
//!   these into error-carrying results so the model can correct itself.
//! - [`ExecutionError`]: an agent `run` was aborted.
//! - [`PlanError`]: a plan edit was rejected (unknown plan or step, or a
//!   status change that would move a step backwards).
//! - [`FlowError`]: a planning flow `execute` was aborted.
//!
//! Step-limit exhaustion and "no more tool calls" are normal returns, not
//! errors, and have no variant here.

use thiserror::Error;

/// Failure talking to the language model.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("malformed arguments for tool call '{name}': {reason}")]
    MalformedToolCall { name: String, reason: String },
}

/// A tool argument failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing required parameter: {0}")]
    Missing(String),

    #[error("Invalid parameter '{key}': expected {expected}, got {found}")]
    Invalid {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// An agent run could not complete.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("agent '{0}' is already running")]
    Busy(String),
}

/// A plan edit was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("No plan found with ID: {0}")]
    NotFound(String),

    #[error("Plan with ID '{0}' already exists")]
    AlreadyExists(String),

    #[error("Step index {index} out of range (plan has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Invalid step status '{0}': expected not_started, in_progress, completed or blocked")]
    InvalidStatus(String),

    #[error("Step {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: usize,
        from: &'static str,
        to: &'static str,
    },
}

/// A planning flow could not complete.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("step execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("plan '{0}' not found")]
    MissingPlan(String),

    #[error("planning tool failed: {0}")]
    Tool(String),

    #[error("flow was cancelled")]
    Cancelled,

    #[error("flow is already executing a plan")]
    AlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_error_messages() {
        assert_eq!(
            ArgumentError::Missing("origin".into()).to_string(),
            "Missing required parameter: origin"
        );
        let invalid = ArgumentError::Invalid {
            key: "adults".into(),
            expected: "integer",
            found: "string",
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid parameter 'adults': expected integer, got string"
        );
    }

    #[test]
    fn test_provider_error_is_transparent_through_execution() {
        let err: ExecutionError = ProviderError::Status {
            status: 429,
            body: "slow down".into(),
        }
        .into();
        assert_eq!(err.to_string(), "provider returned 429: slow down");
    }

    #[test]
    fn test_plan_error_messages() {
        let err = PlanError::InvalidTransition {
            index: 2,
            from: "completed",
            to: "in_progress",
        };
        assert_eq!(err.to_string(), "Step 2 cannot move from completed to in_progress");
        assert_eq!(
            PlanError::NotFound("plan_x".into()).to_string(),
            "No plan found with ID: plan_x"
        );
    }

    #[test]
    fn test_flow_error_wraps_execution() {
        let err: FlowError = ExecutionError::Busy("flight".into()).into();
        assert!(err.to_string().contains("agent 'flight' is already running"));
    }
}
