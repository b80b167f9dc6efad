//! Event logging for replay and auditing.
//!
//! The coordinator appends an event for every significant state change:
//! enqueues, cancels, phase transitions, completions, resyncs, and outcome
//! emission. The log is ordered by occurrence and each entry carries the
//! wall-clock time it happened at.

use crate::models::job::JobPhase;

/// Engine event capturing a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A job was confirmed by the store and entered the local queue
    Enqueued {
        at: f64,
        actor_id: String,
        job_id: String,
        kind: String,
        travel_secs: f64,
        execute_secs: f64,
    },

    /// A job was removed by the caller; its stamina was refunded
    Canceled {
        at: f64,
        actor_id: String,
        job_id: String,
        stamina_refunded: i64,
    },

    /// The head job moved between phases (locally predicted)
    PhaseChanged {
        at: f64,
        actor_id: String,
        job_id: String,
        from: JobPhase,
        to: JobPhase,
    },

    /// The head job's execute countdown reached zero locally
    JobCompleted {
        at: f64,
        actor_id: String,
        job_id: String,
    },

    /// The authoritative snapshot replaced local state
    Resynced {
        at: f64,
        actor_id: String,
        num_jobs: usize,
        digest: String,
    },

    /// A completion outcome (combat result or strike reward) was published
    OutcomeEmitted {
        at: f64,
        actor_id: String,
        job_id: String,
        outcome: String,
        experience: i64,
        yang: i64,
    },
}

impl EngineEvent {
    /// Wall-clock time the event occurred at.
    pub fn at(&self) -> f64 {
        match self {
            EngineEvent::Enqueued { at, .. }
            | EngineEvent::Canceled { at, .. }
            | EngineEvent::PhaseChanged { at, .. }
            | EngineEvent::JobCompleted { at, .. }
            | EngineEvent::Resynced { at, .. }
            | EngineEvent::OutcomeEmitted { at, .. } => *at,
        }
    }

    /// Actor the event belongs to.
    pub fn actor_id(&self) -> &str {
        match self {
            EngineEvent::Enqueued { actor_id, .. }
            | EngineEvent::Canceled { actor_id, .. }
            | EngineEvent::PhaseChanged { actor_id, .. }
            | EngineEvent::JobCompleted { actor_id, .. }
            | EngineEvent::Resynced { actor_id, .. }
            | EngineEvent::OutcomeEmitted { actor_id, .. } => actor_id,
        }
    }
}

/// Append-only log of engine events.
///
/// # Example
/// ```
/// use activity_engine_core_rs::{EngineEvent, EventLog};
///
/// let mut log = EventLog::new();
/// log.log(EngineEvent::JobCompleted {
///     at: 12.5,
///     actor_id: "kael".to_string(),
///     job_id: "job-1".to_string(),
/// });
/// assert_eq!(log.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Events belonging to one actor, in occurrence order.
    pub fn of_actor<'a>(&'a self, actor_id: &'a str) -> impl Iterator<Item = &'a EngineEvent> {
        self.events.iter().filter(move |e| e.actor_id() == actor_id)
    }
}
