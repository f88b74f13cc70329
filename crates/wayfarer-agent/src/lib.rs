//! Wayfarer Agent: memory, tools, the agent loop and the planning flow.
//!
//! This crate contains:
//! - **memory**: bounded conversation history with a pinned system prompt
//! - **tools**: Tool trait, registry, and built-in tools (planning, calculator, files, travel search)
//! - **agent_loop**: the think/act loop over a model and a tool registry
//! - **plan**: plans, steps, and the rendered plan text the flow scans
//! - **profiles**: the general, flight, hotel, route and budget agents
//! - **flow**: the planning flow and its step-type routing
//! - **context**: wires all of the above from one config

pub mod agent_loop;
pub mod context;
pub mod flow;
pub mod memory;
pub mod plan;
pub mod profiles;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use agent_loop::{Agent, AgentCapability, AgentLoop, AgentSettings};
pub use context::AppContext;
pub use flow::{AgentRegistry, FlowProgress, FlowResult, FlowStatus, PlanningFlow};
pub use memory::MemoryStore;
pub use plan::{Plan, Step, StepStatus};
pub use profiles::{AgentProfile, ToolKit};
pub use tools::{Tool, ToolRegistry, ToolResult};
