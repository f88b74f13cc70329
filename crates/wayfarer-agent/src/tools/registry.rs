//! Tool Registry: maps tool names to implementations, hands the model its
//! schema list, and dispatches calls by name.
//!
//! Registration is first-wins: a second tool with an already-registered name
//! is ignored, so agent construction can list tools declaratively without
//! worrying about overlap. Dispatch is total: unknown names and failing tools
//! both come back as error-carrying [`ToolResult`]s.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use wayfarer_core::types::ToolDefinition;
use wayfarer_core::value::Arguments;

use super::base::{Tool, ToolResult};

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across agents and threads.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Returns `false` (and keeps the existing tool) when
    /// the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            debug!(tool = %name, "tool already registered, ignoring duplicate");
            return false;
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        true
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// LLM-facing definitions for all registered tools, in registration order.
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name. Never fails: errors come back inside the result.
    pub async fn dispatch(&self, name: &str, args: &Arguments) -> ToolResult {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "tool not found");
            return ToolResult::error(format!("Tool '{name}' not found"));
        };

        match tool.execute(args).await {
            Ok(result) => {
                if let Some(ref e) = result.error {
                    debug!(tool = name, error = %e, "tool returned an error result");
                }
                result
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                ToolResult::error(e.to_string())
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut registry = ToolRegistry::new();
        for tool in iter {
            registry.register(tool);
        }
        registry
    }
}
