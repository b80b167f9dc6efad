//! Activity Engine - Rust Core
//!
//! Client-predicted, server-authoritative activity scheduler for a timed
//! action queue (strikes, travel, sleep, duels) with deterministic duel
//! resolution.
//!
//! # Architecture
//!
//! - **core**: Time math (travel durations, phase progress)
//! - **models**: Domain types (Job, Position, CombatantSnapshot, events)
//! - **queue**: Bounded per-actor job queue with chained travel legs
//! - **predict**: Local wall-clock prediction between authoritative resyncs
//! - **combat**: Deterministic duel simulator and reward tables
//! - **coordinator**: Facade owning per-actor state and the resync cycle
//! - **store**: Collaborator interfaces (job store, character stats, reporting)
//!
//! # Critical Invariants
//!
//! 1. An actor never holds more than 3 queued jobs
//! 2. Remaining phase times never go negative and never increase locally
//! 3. Duel resolution is deterministic (no randomness anywhere)
//! 4. The authoritative snapshot replaces local state wholesale, never
//!    field-by-field

// Module declarations
pub mod combat;
pub mod coordinator;
pub mod core;
pub mod models;
pub mod predict;
pub mod queue;
pub mod store;

// Re-exports for convenience
pub use combat::{
    effective_damage,
    rewards::{RewardCalculator, Rewards},
    CombatResult, CombatSimulator, DuelOutcome, RoundEvent, MAX_ROUNDS,
};
pub use coordinator::{ActivityCoordinator, CoordinatorConfig, EngineError};
pub use core::time::{
    progress_fraction, travel_duration_secs, travel_duration_secs_at, SPEED_UNITS_PER_MINUTE,
    TRAVEL_TOLERANCE_UNITS,
};
pub use models::{
    combatant::{CombatantSnapshot, MonsterStats},
    event::{EngineEvent, EventLog},
    job::{DurationTier, Job, JobKind, JobPhase, JobSpec},
    position::Position,
};
pub use predict::{PhaseTransition, PredictedTick, PredictionReconciler, SmoothedProgress};
pub use queue::{JobQueue, QueueError};
pub use store::{
    CharacterStats, InMemoryCharacterStats, InMemoryJobStore, JobStore, OutcomeReport,
    RecordingReporter, Reporting, StoreError,
};
