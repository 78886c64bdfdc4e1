//! The mission control loop.
//!
//! Commander understands the task and the battlefield, tactical picks
//! skills from the registry menu, executor dispatches them against the
//! engine, observe judges whether to loop back to tactical or stop. The
//! replay log is saved on every exit path.

pub mod mission;
pub mod prompts;

pub use mission::MissionLoop;
