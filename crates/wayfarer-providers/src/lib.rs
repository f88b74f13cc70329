//! LLM provider layer for Wayfarer.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: the `ask_tool` contract the agent loop calls
//! - [`wire`]: OpenAI-compatible `/chat/completions` request/response shapes
//! - [`http_provider::HttpProvider`]: reqwest client for any compatible endpoint

pub mod http_provider;
pub mod traits;
pub mod wire;

pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
