//! Wayfarer core: shared types used by every other crate.
//!
//! - **types**: messages, tool calls, tool definitions, LLM responses
//! - **value**: dynamically-typed tool arguments with typed accessors
//! - **error**: the error taxonomy for providers, agents, and flows
//! - **config**: `~/.wayfarer/config.json` schema and loader
//! - **utils**: paths and small string helpers

pub mod config;
pub mod error;
pub mod types;
pub mod utils;
pub mod value;

pub use error::{ArgumentError, ExecutionError, FlowError, PlanError, ProviderError};
pub use types::{LlmResponse, Message, Role, ToolCall, ToolChoice, ToolDefinition};
pub use value::{Arguments, Value};
