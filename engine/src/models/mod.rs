//! Domain models for the activity engine

pub mod combatant;
pub mod event;
pub mod job;
pub mod position;

// Re-exports
pub use combatant::{CombatantSnapshot, MonsterStats};
pub use event::{EngineEvent, EventLog};
pub use job::{DurationTier, Job, JobKind, JobPhase, JobSpec};
pub use position::Position;
