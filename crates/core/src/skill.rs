//! Skill trait — the abstraction over tactical actions.
//!
//! A skill is a deterministic, named, parameterized action that translates
//! a tactical intent into one or more remote engine calls. Skills are
//! registered in the SkillRegistry; the same registry instance feeds both
//! the skill menu shown to the LLM and the executor's dispatch, so what is
//! offered is always exactly what is executable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One remote call attempted during a skill, in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Logical tool name, e.g. "alter_unit" or "control_equipment".
    pub tool: String,
    /// The request body sent to the engine.
    pub params: serde_json::Value,
    /// Result status reported by the engine ("success", "error", ...).
    pub result: String,
}

/// The result of executing one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillResult {
    pub success: bool,
    /// Human-readable summary of what was done (or why it failed).
    pub description: String,
    /// Audit trail: one entry per remote call attempt, preserving order.
    #[serde(default)]
    pub actions_taken: Vec<ActionRecord>,
    /// Auxiliary computed values (e.g. computed bearing).
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl SkillResult {
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
            actions_taken: Vec::new(),
            data: serde_json::Map::new(),
        }
    }
}

/// Skill grouping used when rendering the skill menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Maneuver,
    Flight,
    Sensor,
    ElectronicWarfare,
    Communication,
    Weapon,
}

impl SkillCategory {
    /// Label shown in the tactical prompt.
    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Maneuver => "机动技能",
            SkillCategory::Flight => "飞行控制",
            SkillCategory::Sensor => "传感器",
            SkillCategory::ElectronicWarfare => "电子战",
            SkillCategory::Communication => "通信",
            SkillCategory::Weapon => "武器",
        }
    }

    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Maneuver,
        SkillCategory::Flight,
        SkillCategory::Sensor,
        SkillCategory::ElectronicWarfare,
        SkillCategory::Communication,
        SkillCategory::Weapon,
    ];
}

/// The core Skill trait.
///
/// Implementations hold whatever they need (typically an `Arc<EngineApi>`)
/// and execute against a JSON params object produced by the LLM.
///
/// Failure semantics: a skill never returns `Err` — remote-call failures
/// are recorded in the result and reported via `success: false`.
#[async_trait]
pub trait Skill: Send + Sync {
    /// The unique name of this skill (e.g. "evade_missile").
    fn name(&self) -> &str;

    /// A description of what this skill does (shown to the LLM).
    fn description(&self) -> &str;

    /// Menu grouping.
    fn category(&self) -> SkillCategory;

    /// Parameter names, in documentation order.
    fn param_names(&self) -> &[&str];

    /// Execute with the given params object.
    async fn execute(&self, args: &serde_json::Value) -> SkillResult;
}

/// A registry of available skills.
///
/// Built once at startup and treated as immutable read-only shared state.
/// BTreeMap keeps iteration deterministic so the rendered menu is stable.
pub struct SkillRegistry {
    skills: BTreeMap<String, Arc<dyn Skill>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self {
            skills: BTreeMap::new(),
        }
    }

    /// Register a skill. Replaces any existing skill with the same name.
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        self.skills.insert(skill.name().to_string(), skill);
    }

    /// Get a skill by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Skill>> {
        self.skills.get(name)
    }

    /// List all registered skill names.
    pub fn names(&self) -> Vec<&str> {
        self.skills.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Render the skill menu for the tactical prompt, grouped by category.
    ///
    /// Generated from the registry itself — never a hand-maintained list.
    pub fn menu(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut idx = 1usize;

        for category in SkillCategory::ALL {
            let in_category: Vec<&Arc<dyn Skill>> = self
                .skills
                .values()
                .filter(|s| s.category() == category)
                .collect();
            if in_category.is_empty() {
                continue;
            }

            parts.push(format!("### {}", category.label()));
            for skill in in_category {
                parts.push(format!("{idx}. **{}** - {}", skill.name(), skill.description()));
                parts.push(format!("   参数: {}", skill.param_names().join(", ")));
                idx += 1;
            }
            parts.push(String::new());
        }

        parts.join("\n")
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}
