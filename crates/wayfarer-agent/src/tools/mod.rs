//! Tools the agents can call.

pub mod base;
pub mod calculator;
pub mod filesystem;
pub mod planning;
pub mod registry;
pub mod terminate;
pub mod travel;

pub use base::{Tool, ToolResult};
pub use registry::ToolRegistry;
