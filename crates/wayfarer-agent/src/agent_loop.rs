//! Agent loop: the think → act iteration behind every agent.
//!
//! One `run` call:
//! 1. appends the request to memory (inserting the system prompt if absent)
//! 2. asks the model for a turn with the registry's tool schemas
//! 3. stops if the turn has no tool calls, otherwise dispatches each call
//!    and records the results as tool messages
//! 4. stops early if the terminate tool was called, or after `max_steps`

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use wayfarer_core::config::AgentConfig;
use wayfarer_core::error::ExecutionError;
use wayfarer_core::types::{Message, ToolCall, ToolChoice};
use wayfarer_providers::LlmProvider;

use crate::memory::{MemoryStore, DEFAULT_MAX_MESSAGES};
use crate::tools::terminate::TERMINATE_TOOL;
use crate::tools::ToolRegistry;

/// Returned when the model stops without ever producing text.
pub const FALLBACK_RESPONSE: &str = "Unable to generate a response";

/// Returned when `max_steps` iterations pass without termination.
pub const STEP_LIMIT_REACHED: &str = "Step limit reached";

/// Default think/act iterations per run.
pub const DEFAULT_MAX_STEPS: usize = 10;

// ─────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────

/// What an agent declares it is good at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    FlightSearch,
    HotelBooking,
    RoutePlanning,
    BudgetPlanning,
    TextGeneration,
    DataAnalysis,
    WebSearch,
    TravelPlanning,
}

impl AgentCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentCapability::FlightSearch => "flight_search",
            AgentCapability::HotelBooking => "hotel_booking",
            AgentCapability::RoutePlanning => "route_planning",
            AgentCapability::BudgetPlanning => "budget_planning",
            AgentCapability::TextGeneration => "text_generation",
            AgentCapability::DataAnalysis => "data_analysis",
            AgentCapability::WebSearch => "web_search",
            AgentCapability::TravelPlanning => "travel_planning",
        }
    }
}

impl fmt::Display for AgentCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Agent trait
// ─────────────────────────────────────────────

/// An executor the planning flow can hand a step to.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &[AgentCapability];

    /// Handle one request and return the final text.
    async fn run(&self, request: &str) -> Result<String, ExecutionError>;
}

// ─────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────

/// Bounds and sentinel for one agent loop.
#[derive(Clone, Debug)]
pub struct AgentSettings {
    pub max_steps: usize,
    pub max_messages: usize,
    pub terminate_tool: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_messages: DEFAULT_MAX_MESSAGES,
            terminate_tool: TERMINATE_TOOL.to_string(),
        }
    }
}

impl From<&AgentConfig> for AgentSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            max_messages: config.max_messages,
            terminate_tool: config.terminate_tool.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// One system prompt, one tool registry and one memory, driven by a model.
pub struct AgentLoop {
    name: String,
    system_prompt: String,
    capabilities: Vec<AgentCapability>,
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    /// Single writer: a second concurrent `run` fails with `Busy`.
    memory: Mutex<MemoryStore>,
    max_steps: usize,
    terminate_tool: String,
}

impl AgentLoop {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        settings: AgentSettings,
    ) -> Self {
        let name = name.into();
        info!(
            agent = %name,
            model = provider.default_model(),
            tools = tools.len(),
            max_steps = settings.max_steps,
            "agent loop initialized"
        );
        Self {
            name,
            system_prompt: system_prompt.into(),
            capabilities: Vec::new(),
            provider,
            tools,
            memory: Mutex::new(MemoryStore::new(settings.max_messages)),
            max_steps: settings.max_steps,
            terminate_tool: settings.terminate_tool,
        }
    }

    /// Declare the capability tags this agent advertises.
    pub fn with_capabilities(mut self, capabilities: Vec<AgentCapability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Copy of the current conversation. Fails with `Busy` while a run is in flight.
    pub fn history(&self) -> Result<Vec<Message>, ExecutionError> {
        let memory = self.lock_memory()?;
        Ok(memory.messages().to_vec())
    }

    /// Forget everything but the system prompt.
    pub fn reset(&self) -> Result<(), ExecutionError> {
        self.lock_memory()?.clear();
        Ok(())
    }

    fn lock_memory(&self) -> Result<tokio::sync::MutexGuard<'_, MemoryStore>, ExecutionError> {
        self.memory
            .try_lock()
            .map_err(|_| ExecutionError::Busy(self.name.clone()))
    }

    /// Run every call of one turn. Returns the newline-joined outputs and
    /// whether the terminate tool was among them.
    async fn act(&self, memory: &mut MemoryStore, calls: &[ToolCall]) -> (String, bool) {
        let mut outputs = Vec::with_capacity(calls.len());
        let mut terminated = false;

        for call in calls {
            info!(agent = %self.name, tool = %call.name, "executing tool call");
            let result = self.tools.dispatch(&call.name, &call.arguments).await;
            let content = result.content().to_string();
            debug!(tool = %call.name, result_len = content.len(), error = result.is_error(), "tool result");

            memory.add_message(Message::tool_result(
                &call.id,
                &call.name,
                content.clone(),
                result.image,
            ));
            outputs.push(content);

            if call.name == self.terminate_tool {
                terminated = true;
            }
        }

        (outputs.join("\n"), terminated)
    }
}

#[async_trait]
impl Agent for AgentLoop {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &[AgentCapability] {
        &self.capabilities
    }

    async fn run(&self, request: &str) -> Result<String, ExecutionError> {
        let mut memory = self.lock_memory()?;

        memory.add_message(Message::user(request));
        if !memory.has_system() {
            memory.add_message(Message::system(&self.system_prompt));
        }

        let schemas = self.tools.schemas();

        for step in 1..=self.max_steps {
            debug!(agent = %self.name, step, "think");
            let response = self
                .provider
                .ask_tool(memory.messages(), &schemas, ToolChoice::Auto)
                .await?;

            let content = response.content.clone().unwrap_or_default();
            if response.has_tool_calls() {
                memory.add_message(Message::assistant_with_tools(
                    content,
                    response.tool_calls.clone(),
                ));
            } else if !content.is_empty() {
                memory.add_message(Message::assistant(content));
            }

            if !response.has_tool_calls() {
                debug!(agent = %self.name, step, "no tool calls, finishing");
                return Ok(memory
                    .last_assistant_content()
                    .unwrap_or(FALLBACK_RESPONSE)
                    .to_string());
            }

            let (output, terminated) = self.act(&mut memory, &response.tool_calls).await;
            if terminated {
                info!(agent = %self.name, step, "terminate tool called");
                return Ok(output);
            }
        }

        warn!(agent = %self.name, max_steps = self.max_steps, "step limit reached");
        Ok(STEP_LIMIT_REACHED.to_string())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
