//! Agent state — the single mutable record threaded through every stage
//! of the control loop, plus the structured decision types recovered from
//! LLM output.

use serde::{Deserialize, Serialize};

/// Control-loop phase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Commander,
    Tactical,
    Executor,
    Observe,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Commander => "commander",
            Phase::Tactical => "tactical",
            Phase::Executor => "executor",
            Phase::Observe => "observe",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Shared state of one agent session. Created once per task; each stage
/// merges its partial update into it; dropped when the loop terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// The original task instruction.
    pub task: String,

    /// Commander output — raw tactical intent text.
    pub tactical_intent: Option<String>,

    /// Situation summary built from the latest world-state fetch.
    pub world_state_summary: Option<String>,

    /// Tactical output — raw skill decision text.
    pub skill_decision: Option<String>,

    /// Executor output — human-readable execution summary.
    pub execution_result: Option<String>,

    /// Number of executor passes completed. Monotonically non-decreasing.
    pub iteration_count: u32,

    /// Iteration ceiling; the loop terminates once observed.
    pub max_iterations: u32,

    pub should_continue: bool,

    pub phase: Phase,

    /// Trace log, one human-readable line per stage transition.
    pub messages: Vec<String>,
}

impl AgentState {
    pub fn new(task: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            task: task.into(),
            tactical_intent: None,
            world_state_summary: None,
            skill_decision: None,
            execution_result: None,
            iteration_count: 0,
            max_iterations,
            should_continue: true,
            phase: Phase::Commander,
            messages: Vec::new(),
        }
    }

    pub fn push_message(&mut self, line: impl Into<String>) {
        self.messages.push(line.into());
    }
}

/// Structured tactical intent the commander stage is expected to emit.
///
/// Parsed best-effort: downstream stages keep working from the raw text
/// when this fails to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticalIntent {
    #[serde(default)]
    pub mission_understanding: String,
    #[serde(default)]
    pub situation_assessment: String,
    #[serde(default)]
    pub knowledge_reference: String,
    #[serde(default)]
    pub tactical_intent: String,
    #[serde(default)]
    pub priority_targets: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub recommended_approach: String,
    #[serde(default)]
    pub phase_plan: Vec<String>,
}

/// One skill selection entry. Execution order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillInvocation {
    pub skill_name: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub reason: String,
}

/// Structured output of the skill-selection stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDecision {
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub skills: Vec<SkillInvocation>,
}

impl SkillDecision {
    /// Recover a decision from an extracted JSON value.
    ///
    /// Accepts both the documented `{"skills": [...]}` form and a bare
    /// single-entry `{"skill_name": ..., "params": ...}` object.
    pub fn from_value(value: &serde_json::Value) -> Option<SkillDecision> {
        if let Ok(decision) = serde_json::from_value::<SkillDecision>(value.clone()) {
            if !decision.skills.is_empty() {
                return Some(decision);
            }
        }
        if value.get("skill_name").is_some() {
            if let Ok(single) = serde_json::from_value::<SkillInvocation>(value.clone()) {
                return Some(SkillDecision {
                    analysis: String::new(),
                    skills: vec![single],
                });
            }
        }
        None
    }
}
