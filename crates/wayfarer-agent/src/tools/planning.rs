//! Planning tool: create, inspect and update plans held in a shared store.
//!
//! The planning flow drives plans through this tool, and the general agent
//! can call it directly to sketch or revise a plan mid-conversation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use wayfarer_core::error::PlanError;
use wayfarer_core::value::Arguments;

use super::base::{Tool, ToolResult};
use crate::plan::{Plan, Step, StepStatus};

const COMMANDS: [&str; 6] = ["create", "update", "list", "get", "mark_step", "delete"];

// ─────────────────────────────────────────────
// PlanStore
// ─────────────────────────────────────────────

/// In-memory plans, in creation order. Lives only as long as the process.
#[derive(Default)]
pub struct PlanStore {
    plans: Mutex<Vec<Plan>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Plan>> {
        self.plans.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, plan: Plan) -> Result<(), PlanError> {
        let mut plans = self.lock();
        if plans.iter().any(|p| p.id == plan.id) {
            return Err(PlanError::AlreadyExists(plan.id));
        }
        plans.push(plan);
        Ok(())
    }

    /// Snapshot of one plan.
    pub fn get(&self, id: &str) -> Option<Plan> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    pub fn list(&self) -> Vec<Plan> {
        self.lock().clone()
    }

    /// Apply `edit` to the plan with `id` and return the edited snapshot.
    pub fn modify<F>(&self, id: &str, edit: F) -> Result<Plan, PlanError>
    where
        F: FnOnce(&mut Plan) -> Result<(), PlanError>,
    {
        let mut plans = self.lock();
        let plan = plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PlanError::NotFound(id.to_string()))?;
        edit(plan)?;
        Ok(plan.clone())
    }

    pub fn mark_step(
        &self,
        id: &str,
        index: usize,
        status: StepStatus,
        notes: Option<String>,
    ) -> Result<Plan, PlanError> {
        self.modify(id, |plan| plan.mark_step(index, status, notes))
    }

    pub fn remove(&self, id: &str) -> Result<Plan, PlanError> {
        let mut plans = self.lock();
        let pos = plans
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PlanError::NotFound(id.to_string()))?;
        Ok(plans.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// ─────────────────────────────────────────────
// PlanningTool
// ─────────────────────────────────────────────

pub struct PlanningTool {
    store: Arc<PlanStore>,
}

impl PlanningTool {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PlanStore> {
        &self.store
    }

    fn create(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let id = match args.optional_str("plan_id")? {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Plan::new_id(),
        };
        let title = args.require_str("title")?;
        let steps: Vec<Step> = args
            .require_string_list("steps")?
            .iter()
            .map(|s| Step::parse(s))
            .collect();
        if steps.is_empty() {
            return Ok(ToolResult::error("Parameter `steps` must contain at least one step"));
        }

        let plan = Plan::new(id.clone(), title, steps);
        let rendered = plan.render();
        self.store.insert(plan)?;
        debug!(plan_id = %id, "plan created");

        Ok(ToolResult::success(format!(
            "Plan created successfully with ID: {id}\n\n{rendered}"
        ))
        .with_metadata("plan_id", id))
    }

    fn update(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let id = args.require_str("plan_id")?;
        let title = args.optional_str("title")?.map(str::to_string);
        let steps = match args.get("steps") {
            Some(_) => Some(args.require_string_list("steps")?),
            None => None,
        };

        let plan = self.store.modify(id, |plan| {
            if let Some(title) = title {
                plan.title = title;
            }
            if let Some(steps) = steps {
                // Keep progress for steps that did not change position or text.
                let updated = steps
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| {
                        let fresh = Step::parse(raw);
                        match plan.steps.get(i) {
                            Some(old) if old.text == fresh.text && old.step_type == fresh.step_type => {
                                old.clone()
                            }
                            _ => fresh,
                        }
                    })
                    .collect();
                plan.steps = updated;
            }
            Ok(())
        })?;

        Ok(ToolResult::success(format!(
            "Plan updated successfully: {id}\n\n{}",
            plan.render()
        )))
    }

    fn list(&self) -> ToolResult {
        let plans = self.store.list();
        if plans.is_empty() {
            return ToolResult::success("No plans available.");
        }
        let lines: Vec<String> = plans
            .iter()
            .map(|p| {
                format!(
                    "• {}: {} - {}/{} steps completed",
                    p.id,
                    p.title,
                    p.completed_count(),
                    p.steps.len()
                )
            })
            .collect();
        ToolResult::success(format!("Available plans:\n{}", lines.join("\n")))
            .with_metadata("count", plans.len())
    }

    fn get(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let id = args.require_str("plan_id")?;
        let plan = self
            .store
            .get(id)
            .ok_or_else(|| PlanError::NotFound(id.to_string()))?;
        Ok(ToolResult::success(plan.render()))
    }

    fn mark_step(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let id = args.require_str("plan_id")?;
        let index = args.require_i64("step_index")?;
        let Ok(index) = usize::try_from(index) else {
            return Ok(ToolResult::error(format!(
                "Parameter `step_index` must be non-negative, got {index}"
            )));
        };
        let status = match args.optional_str("step_status")? {
            Some(raw) => Some(raw.parse::<StepStatus>()?),
            None => None,
        };
        let notes = args.optional_str("step_notes")?.map(str::to_string);

        let plan = self.store.modify(id, |plan| {
            let current = plan
                .steps
                .get(index)
                .map(|s| s.status)
                .ok_or(PlanError::StepOutOfRange {
                    index,
                    len: plan.steps.len(),
                })?;
            plan.mark_step(index, status.unwrap_or(current), notes)
        })?;

        Ok(ToolResult::success(format!(
            "Step {index} updated in plan '{id}'.\n\n{}",
            plan.render()
        )))
    }

    fn delete(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let id = args.require_str("plan_id")?;
        self.store.remove(id)?;
        Ok(ToolResult::success(format!("Plan '{id}' has been deleted.")))
    }
}

#[async_trait]
impl Tool for PlanningTool {
    fn name(&self) -> &str {
        "planning"
    }

    fn description(&self) -> &str {
        "Create and manage plans for multi-step tasks. Steps may start with a \
         [TYPE] tag (e.g. [FLIGHT], [HOTEL], [ROUTE], [BUDGET]) naming the agent \
         best suited to carry them out."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": COMMANDS,
                    "description": "The command to execute"
                },
                "plan_id": {
                    "type": "string",
                    "description": "Plan identifier. Optional for create, required otherwise"
                },
                "title": { "type": "string", "description": "Plan title" },
                "steps": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ordered step descriptions"
                },
                "step_index": {
                    "type": "integer",
                    "description": "Zero-based step index for mark_step"
                },
                "step_status": {
                    "type": "string",
                    "enum": ["not_started", "in_progress", "completed", "blocked"],
                    "description": "New status for mark_step"
                },
                "step_notes": { "type": "string", "description": "Notes for mark_step" }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let command = args.require_str("command")?;
        match command {
            "create" => self.create(args),
            "update" => self.update(args),
            "list" => Ok(self.list()),
            "get" => self.get(args),
            "mark_step" => self.mark_step(args),
            "delete" => self.delete(args),
            other => Ok(ToolResult::error(format!(
                "Unrecognized command: {other}. Allowed commands are: {}",
                COMMANDS.join(", ")
            ))),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::value::Value;

    fn tool() -> PlanningTool {
        PlanningTool::new(Arc::new(PlanStore::new()))
    }

    async fn create(tool: &PlanningTool, id: &str) {
        tool.execute(
            &Arguments::new()
                .with("command", "create")
                .with("plan_id", id)
                .with("title", "Hangzhou weekend")
                .with("steps", vec!["[ROUTE] walk the lake", "summarize"]),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let tool = tool();
        create(&tool, "plan_a").await;

        let plan = tool.store().get("plan_a").unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].step_type, "ROUTE");

        let got = tool
            .execute(&Arguments::new().with("command", "get").with("plan_id", "plan_a"))
            .await
            .unwrap();
        assert!(got.output.unwrap().contains("1. ◯ [ROUTE] walk the lake"));
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let tool = tool();
        let result = tool
            .execute(
                &Arguments::new()
                    .with("command", "create")
                    .with("title", "t")
                    .with("steps", vec!["one"]),
            )
            .await
            .unwrap();
        let Value::String(id) = &result.metadata["plan_id"] else {
            panic!("plan_id metadata missing");
        };
        assert!(id.starts_with("plan_"));
        assert!(tool.store().get(id).is_some());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let tool = tool();
        create(&tool, "plan_a").await;
        let err = tool
            .execute(
                &Arguments::new()
                    .with("command", "create")
                    .with("plan_id", "plan_a")
                    .with("title", "again")
                    .with("steps", vec!["x"]),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_mark_step_and_monotonic() {
        let tool = tool();
        create(&tool, "plan_a").await;

        let mark = |status: &str| {
            Arguments::new()
                .with("command", "mark_step")
                .with("plan_id", "plan_a")
                .with("step_index", 0i64)
                .with("step_status", status)
        };

        let ok = tool.execute(&mark("completed")).await.unwrap();
        assert!(ok.output.unwrap().contains("1. ✓ [ROUTE] walk the lake"));

        let err = tool.execute(&mark("in_progress")).await.unwrap_err();
        assert!(err.to_string().contains("cannot move from completed"));

        let err = tool.execute(&mark("finished")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid step status"));
    }

    #[tokio::test]
    async fn test_mark_step_notes_only() {
        let tool = tool();
        create(&tool, "plan_a").await;
        tool.execute(
            &Arguments::new()
                .with("command", "mark_step")
                .with("plan_id", "plan_a")
                .with("step_index", 1i64)
                .with("step_notes", "remember umbrellas"),
        )
        .await
        .unwrap();
        let plan = tool.store().get("plan_a").unwrap();
        assert_eq!(plan.steps[1].status, StepStatus::NotStarted);
        assert_eq!(plan.steps[1].notes.as_deref(), Some("remember umbrellas"));
    }

    #[tokio::test]
    async fn test_update_keeps_unchanged_progress() {
        let tool = tool();
        create(&tool, "plan_a").await;
        tool.store()
            .mark_step("plan_a", 0, StepStatus::Completed, None)
            .unwrap();

        tool.execute(
            &Arguments::new()
                .with("command", "update")
                .with("plan_id", "plan_a")
                .with("title", "Hangzhou long weekend")
                .with("steps", vec!["[ROUTE] walk the lake", "[BUDGET] add costs", "summarize"]),
        )
        .await
        .unwrap();

        let plan = tool.store().get("plan_a").unwrap();
        assert_eq!(plan.title, "Hangzhou long weekend");
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[0].status, StepStatus::Completed);
        assert_eq!(plan.steps[1].step_type, "BUDGET");
        assert_eq!(plan.steps[2].status, StepStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let tool = tool();
        let empty = tool.execute(&Arguments::new().with("command", "list")).await.unwrap();
        assert_eq!(empty.output.as_deref(), Some("No plans available."));

        create(&tool, "plan_a").await;
        let listed = tool.execute(&Arguments::new().with("command", "list")).await.unwrap();
        assert!(listed.output.unwrap().contains("• plan_a: Hangzhou weekend - 0/2 steps completed"));

        tool.execute(&Arguments::new().with("command", "delete").with("plan_id", "plan_a"))
            .await
            .unwrap();
        assert!(tool.store().is_empty());

        let err = tool
            .execute(&Arguments::new().with("command", "get").with("plan_id", "plan_a"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No plan found with ID: plan_a");
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let result = tool()
            .execute(&Arguments::new().with("command", "explode"))
            .await
            .unwrap();
        assert!(result.error.unwrap().starts_with("Unrecognized command: explode"));
    }
}
