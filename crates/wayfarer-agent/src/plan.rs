//! Plans: ordered, typed steps with monotonic statuses.
//!
//! A plan is rendered to text as:
//!
//! ```text
//! Plan: Hangzhou weekend
//! Progress: 1/3 steps completed (33.3%)
//! 1. ✓ [ROUTE] plan walking route
//! 2. ⚙️ [HOTEL] find a hotel near West Lake
//! 3. ◯ [GENERAL] summarize
//! ```
//!
//! The flow finds its next step by scanning this text for the not-started
//! glyph, so [`Plan::render`] and [`next_not_started`] share the glyph
//! constants below and must stay in lock-step.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wayfarer_core::error::PlanError;

pub const GLYPH_NOT_STARTED: &str = "◯";
pub const GLYPH_IN_PROGRESS: &str = "⚙️";
pub const GLYPH_COMPLETED: &str = "✓";
pub const GLYPH_BLOCKED: &str = "⚠️";

/// Step type used when a line carries no `[TYPE]` tag.
pub const DEFAULT_STEP_TYPE: &str = "GENERAL";

/// Substituted when the model's plan text has no numbered lines.
pub const DEFAULT_STEPS: [&str; 3] = [
    "[GENERAL] Analyze the request",
    "[GENERAL] Execute the task",
    "[GENERAL] Verify the results",
];

// ─────────────────────────────────────────────
// StepStatus
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Blocked,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Blocked => "blocked",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => GLYPH_NOT_STARTED,
            StepStatus::InProgress => GLYPH_IN_PROGRESS,
            StepStatus::Completed => GLYPH_COMPLETED,
            StepStatus::Blocked => GLYPH_BLOCKED,
        }
    }

    /// Completed and blocked are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Blocked)
    }

    /// Statuses only move forward; re-marking the same status is allowed.
    pub fn can_become(&self, next: StepStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            StepStatus::NotStarted => true,
            StepStatus::InProgress => next.is_terminal(),
            StepStatus::Completed | StepStatus::Blocked => false,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepStatus {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(StepStatus::NotStarted),
            "in_progress" => Ok(StepStatus::InProgress),
            "completed" => Ok(StepStatus::Completed),
            "blocked" => Ok(StepStatus::Blocked),
            other => Err(PlanError::InvalidStatus(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// Step
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
    /// Upper-case routing tag, e.g. `ROUTE`.
    pub step_type: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Step {
    /// Build a step from a description that may start with a `[TYPE]` tag.
    pub fn parse(description: &str) -> Self {
        let description = description.trim();
        let tagged = Regex::new(r"^\[(\w+)\]\s*(.*)$")
            .ok()
            .and_then(|re| re.captures(description));

        let (step_type, text) = match tagged {
            Some(caps) => (caps[1].to_uppercase(), caps[2].trim().to_string()),
            None => (DEFAULT_STEP_TYPE.to_string(), description.to_string()),
        };

        Self {
            text,
            step_type,
            status: StepStatus::NotStarted,
            notes: None,
        }
    }

    /// `[TYPE] text`, the form the planning tool accepts back.
    pub fn tagged_text(&self) -> String {
        format!("[{}] {}", self.step_type, self.text)
    }
}

// ─────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub title: String,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(id: impl Into<String>, title: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            steps,
        }
    }

    /// Fresh `plan_<uuid>` identifier.
    pub fn new_id() -> String {
        format!("plan_{}", Uuid::new_v4().simple())
    }

    /// Change one step's status, refusing backward moves.
    pub fn mark_step(
        &mut self,
        index: usize,
        status: StepStatus,
        notes: Option<String>,
    ) -> Result<(), PlanError> {
        let len = self.steps.len();
        let step = self
            .steps
            .get_mut(index)
            .ok_or(PlanError::StepOutOfRange { index, len })?;

        if !step.status.can_become(status) {
            return Err(PlanError::InvalidTransition {
                index,
                from: step.status.as_str(),
                to: status.as_str(),
            });
        }
        step.status = status;
        if notes.is_some() {
            step.notes = notes;
        }
        Ok(())
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    /// Completed steps as a percentage of all steps (0 for an empty plan).
    pub fn percentage(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 * 100.0 / self.steps.len() as f64
        }
    }

    /// Text form read by both the model and [`next_not_started`].
    ///
    /// Every step renders on one line (plus an optional notes line), so
    /// line breaks inside free text are flattened to spaces.
    pub fn render(&self) -> String {
        let mut out = format!("Plan: {}\n", single_line(&self.title));
        out.push_str(&format!(
            "Progress: {}/{} steps completed ({:.1}%)\n",
            self.completed_count(),
            self.steps.len(),
            self.percentage()
        ));
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} [{}] {}\n",
                i + 1,
                step.status.glyph(),
                step.step_type,
                single_line(&step.text)
            ));
            if let Some(notes) = step.notes.as_deref().filter(|n| !n.is_empty()) {
                out.push_str(&format!("   Notes: {}\n", single_line(notes)));
            }
        }
        out
    }
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

// ─────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────

/// Zero-based index of the first step rendered with the not-started glyph.
///
/// Blocked steps are never returned, so they are skipped for good.
pub fn next_not_started(rendered: &str) -> Option<usize> {
    rendered.lines().find_map(|line| {
        let (number, rest) = line.split_once(". ")?;
        let number: usize = number.trim().parse().ok()?;
        let after_glyph = rest.strip_prefix(GLYPH_NOT_STARTED)?;
        if after_glyph.starts_with(' ') && number > 0 {
            Some(number - 1)
        } else {
            None
        }
    })
}

/// Numbered step lines (`N. description`) from free-form model output.
pub fn parse_steps(text: &str) -> Vec<Step> {
    let Ok(line_re) = Regex::new(r"^\s*\d+\.\s*(.*)$") else {
        return Vec::new();
    };
    text.lines()
        .filter_map(|line| line_re.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .filter(|description| !description.is_empty())
        .map(|description| Step::parse(&description))
        .collect()
}

/// [`parse_steps`], falling back to [`DEFAULT_STEPS`] when nothing matched.
pub fn parse_steps_or_default(text: &str) -> Vec<Step> {
    let steps = parse_steps(text);
    if steps.is_empty() {
        DEFAULT_STEPS.iter().map(|s| Step::parse(s)).collect()
    } else {
        steps
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
