//! Engine client for Wingman — request/response plumbing to the remote
//! combat-simulation engine.
//!
//! Three layers:
//! - [`transport`]: raw GET/POST with the error-object contract (the
//!   transport never fails; faults arrive as `{"error": ...}` data).
//! - [`client`]: [`EngineApi`], the typed endpoint surface the rest of the
//!   system calls. Every call is recorded for replay.
//! - [`replay`]: the append-only session call log, persisted at loop end.

pub mod client;
pub mod replay;
pub mod requests;
pub mod testing;
pub mod transport;

pub use client::EngineApi;
pub use replay::{ReplayRecord, ReplayRecorder, ReplaySession};
pub use requests::{
    EquipmentControl, FormationOrder, JammerCommand, MissionOrder, MoveToDirection,
    MoveToPosition, PatrolOrder, ReturnLand, UnitAlteration,
};
pub use transport::{EngineTransport, HttpTransport};
