//! # Wingman Core
//!
//! Domain types, traits, and error definitions for the Wingman tactical
//! agent. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod extract;
pub mod provider;
pub mod schema;
pub mod skill;
pub mod state;

// Re-export key types at crate root for ergonomics
pub use error::{EngineError, Error, KnowledgeError, ProviderError, Result};
pub use extract::extract_json;
pub use provider::{Embedder, Provider};
pub use schema::{
    ActionResult, EquipmentInfo, EquipmentStatus, EquipmentType, Orientation, Position,
    UnitState, UnitSummary, UnitsList, WorldState,
};
pub use skill::{ActionRecord, Skill, SkillCategory, SkillRegistry, SkillResult};
pub use state::{AgentState, Phase, SkillDecision, SkillInvocation, TacticalIntent};
