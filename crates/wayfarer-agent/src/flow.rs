//! Planning flow: turns one request into a typed plan and runs it step by
//! step, handing each step to the agent registered for its type.
//!
//! ```text
//! Idle → Planning → Executing → Completed
//!                       │
//!                       ├──→ Failed(reason)   (step stays in_progress)
//!                       └──→ Cancelled        (checked before each step)
//! ```
//!
//! Plans live in the shared [`PlanStore`] and are driven exclusively
//! through the planning tool, so what the flow scans is exactly what a
//! model calling `planning get` would see.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use wayfarer_core::error::{FlowError, PlanError};
use wayfarer_core::utils::truncate_string;
use wayfarer_core::value::Arguments;

use crate::agent_loop::Agent;
use crate::plan::{next_not_started, parse_steps_or_default, Step, StepStatus, DEFAULT_STEP_TYPE};
use crate::tools::planning::{PlanStore, PlanningTool};
use crate::tools::Tool;

const TITLE_MAX_CHARS: usize = 80;

// ─────────────────────────────────────────────
// AgentRegistry
// ─────────────────────────────────────────────

/// Step type → executor, with the primary agent as the fallback.
#[derive(Clone)]
pub struct AgentRegistry {
    primary: Arc<dyn Agent>,
    by_type: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new(primary: Arc<dyn Agent>) -> Self {
        Self {
            primary,
            by_type: HashMap::new(),
        }
    }

    /// Route steps tagged `[STEP_TYPE]` to `agent`. Keys are case-insensitive.
    pub fn register(&mut self, step_type: &str, agent: Arc<dyn Agent>) {
        self.by_type.insert(step_type.to_lowercase(), agent);
    }

    pub fn with(mut self, step_type: &str, agent: Arc<dyn Agent>) -> Self {
        self.register(step_type, agent);
        self
    }

    /// Executor for a step type; unknown types go to the primary agent.
    pub fn resolve(&self, step_type: &str) -> &Arc<dyn Agent> {
        self.by_type
            .get(&step_type.to_lowercase())
            .unwrap_or(&self.primary)
    }

    pub fn primary(&self) -> &Arc<dyn Agent> {
        &self.primary
    }

    /// Registered type keys, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.by_type.keys().cloned().collect();
        types.sort();
        types
    }
}

// ─────────────────────────────────────────────
// Status, progress, result
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FlowStatus {
    #[default]
    Idle,
    Planning,
    Executing,
    Completed,
    Failed(String),
    Cancelled,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Idle => f.write_str("idle"),
            FlowStatus::Planning => f.write_str("planning"),
            FlowStatus::Executing => f.write_str("executing"),
            FlowStatus::Completed => f.write_str("completed"),
            FlowStatus::Failed(reason) => write!(f, "failed: {reason}"),
            FlowStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Read-only snapshot returned by [`PlanningFlow::progress`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlowProgress {
    pub status: FlowStatus,
    pub plan_id: Option<String>,
    /// Text of the step currently being executed.
    pub current_step: Option<String>,
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Clone, Debug)]
pub struct FlowResult {
    pub output: String,
    pub plan_id: String,
    pub steps_completed: usize,
    pub elapsed: Duration,
}

#[derive(Default)]
struct FlowState {
    status: FlowStatus,
    plan_id: Option<String>,
    current_step: Option<String>,
    completed: usize,
    total: usize,
}

/// Clears the running flag however `execute` exits.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ─────────────────────────────────────────────
// PlanningFlow
// ─────────────────────────────────────────────

pub struct PlanningFlow {
    agents: AgentRegistry,
    planning: Arc<PlanningTool>,
    state: RwLock<FlowState>,
    running: AtomicBool,
    cancel_requested: AtomicBool,
}

impl PlanningFlow {
    pub fn new(agents: AgentRegistry, planning: Arc<PlanningTool>) -> Self {
        Self {
            agents,
            planning,
            state: RwLock::new(FlowState::default()),
            running: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn plans(&self) -> &Arc<PlanStore> {
        self.planning.store()
    }

    pub fn status(&self) -> FlowStatus {
        self.read_state(|s| s.status.clone())
    }

    /// Ask a running flow to stop before its next step.
    pub fn cancel(&self) {
        info!("flow cancellation requested");
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn progress(&self) -> FlowProgress {
        self.read_state(|s| FlowProgress {
            status: s.status.clone(),
            plan_id: s.plan_id.clone(),
            current_step: s.current_step.clone(),
            completed: s.completed,
            total: s.total,
            percentage: if s.total == 0 {
                0.0
            } else {
                s.completed as f64 * 100.0 / s.total as f64
            },
        })
    }

    /// Plan and execute `request`. Only one execution may run at a time.
    pub async fn execute(&self, request: &str) -> Result<FlowResult, FlowError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FlowError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);
        self.cancel_requested.store(false, Ordering::SeqCst);

        let started = Instant::now();
        let result = self.drive(request, started).await;

        let final_status = match &result {
            Ok(_) => FlowStatus::Completed,
            Err(FlowError::Cancelled) => FlowStatus::Cancelled,
            Err(e) => FlowStatus::Failed(e.to_string()),
        };
        match &result {
            Ok(r) => info!(plan_id = %r.plan_id, steps = r.steps_completed, elapsed_ms = r.elapsed.as_millis() as u64, "flow completed"),
            Err(e) => warn!(error = %e, "flow stopped"),
        }
        self.write_state(|s| {
            s.status = final_status;
            s.current_step = None;
        });
        result
    }

    async fn drive(&self, request: &str, started: Instant) -> Result<FlowResult, FlowError> {
        let plan_id = crate::plan::Plan::new_id();
        self.write_state(|s| {
            *s = FlowState {
                status: FlowStatus::Planning,
                plan_id: Some(plan_id.clone()),
                ..FlowState::default()
            }
        });

        let total = self.create_plan(&plan_id, request).await?;
        self.write_state(|s| {
            s.status = FlowStatus::Executing;
            s.total = total;
        });

        let mut results = Vec::new();
        loop {
            let rendered = self.render(&plan_id).await?;
            let Some(index) = next_not_started(&rendered) else {
                break;
            };
            if self.cancel_requested.load(Ordering::SeqCst) {
                info!(plan_id = %plan_id, step = index + 1, "flow cancelled before step");
                return Err(FlowError::Cancelled);
            }

            let step = self.step(&plan_id, index)?;
            self.mark(&plan_id, index, StepStatus::InProgress).await?;
            self.write_state(|s| s.current_step = Some(step.text.clone()));

            let executor = self.agents.resolve(&step.step_type);
            info!(
                plan_id = %plan_id,
                step = index + 1,
                step_type = %step.step_type,
                agent = executor.name(),
                "executing step"
            );

            let status = self.render(&plan_id).await?;
            let output = executor.run(&step_prompt(&status, index, &step)).await?;
            debug!(step = index + 1, output_len = output.len(), "step finished");

            self.mark(&plan_id, index, StepStatus::Completed).await?;
            self.write_state(|s| {
                s.completed += 1;
                s.current_step = None;
            });
            results.push(output);
        }

        let steps_completed = results.len();
        let summary = self.render(&plan_id).await?;
        results.push(format!("Task completed. Summary:\n{summary}"));

        Ok(FlowResult {
            output: results.join("\n\n"),
            plan_id,
            steps_completed,
            elapsed: started.elapsed(),
        })
    }

    /// Ask the primary agent for a plan and store it. Returns the step count.
    async fn create_plan(&self, plan_id: &str, request: &str) -> Result<usize, FlowError> {
        let primary = self.agents.primary();
        info!(plan_id, agent = primary.name(), "requesting plan");
        let reply = primary.run(&planning_prompt(request, &self.agents.types())).await?;

        let steps = parse_steps_or_default(&reply);
        debug!(plan_id, steps = steps.len(), "parsed plan");

        let tagged: Vec<String> = steps.iter().map(Step::tagged_text).collect();
        self.call_planning(
            Arguments::new()
                .with("command", "create")
                .with("plan_id", plan_id)
                .with("title", format!("Plan for: {}", truncate_string(request, TITLE_MAX_CHARS)))
                .with("steps", tagged),
        )
        .await?;
        Ok(steps.len())
    }

    async fn render(&self, plan_id: &str) -> Result<String, FlowError> {
        self.call_planning(
            Arguments::new()
                .with("command", "get")
                .with("plan_id", plan_id),
        )
        .await
    }

    async fn mark(&self, plan_id: &str, index: usize, status: StepStatus) -> Result<(), FlowError> {
        self.call_planning(
            Arguments::new()
                .with("command", "mark_step")
                .with("plan_id", plan_id)
                .with("step_index", index)
                .with("step_status", status.as_str()),
        )
        .await
        .map(|_| ())
    }

    fn step(&self, plan_id: &str, index: usize) -> Result<Step, FlowError> {
        let plan = self
            .planning
            .store()
            .get(plan_id)
            .ok_or_else(|| FlowError::MissingPlan(plan_id.to_string()))?;
        let len = plan.steps.len();
        plan.steps
            .into_iter()
            .nth(index)
            .ok_or_else(|| FlowError::Tool(PlanError::StepOutOfRange { index, len }.to_string()))
    }

    async fn call_planning(&self, args: Arguments) -> Result<String, FlowError> {
        match self.planning.execute(&args).await {
            Ok(result) if result.is_error() => Err(FlowError::Tool(result.content().to_string())),
            Ok(result) => Ok(result.content().to_string()),
            Err(e) => match e.downcast_ref::<PlanError>() {
                Some(PlanError::NotFound(id)) => Err(FlowError::MissingPlan(id.clone())),
                _ => Err(FlowError::Tool(e.to_string())),
            },
        }
    }

    fn read_state<T>(&self, read: impl FnOnce(&FlowState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        read(&state)
    }

    fn write_state(&self, write: impl FnOnce(&mut FlowState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        write(&mut state);
    }
}

fn planning_prompt(request: &str, types: &[String]) -> String {
    let mut tags: Vec<String> = types.iter().map(|t| t.to_uppercase()).collect();
    tags.push(DEFAULT_STEP_TYPE.to_string());
    format!(
        "Create an execution plan for the following request, breaking it into concrete steps:\n\n\
         {request}\n\n\
         Reply with a numbered list, one step per line, each starting with a type tag:\n\
         1. [GENERAL] Analyze the requirements\n\
         2. [ROUTE] Plan the daily route\n\
         3. [GENERAL] Write the final summary\n\n\
         Available types: {}. Use GENERAL when no other type fits.",
        tags.join(", ")
    )
}

fn step_prompt(plan_status: &str, index: usize, step: &Step) -> String {
    format!(
        "Current plan status:\n{plan_status}\n\
         Your current task:\n\
         You are executing step {}: \"{}\"\n\n\
         Please complete this step and report the result.",
        index + 1,
        step.text
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
