//! Activity Coordinator
//!
//! Top-level facade the application talks to:
//! - `enqueue`/`cancel` validate locally, then confirm against the store
//! - `tick` advances local prediction and drives the resync cycle
//! - completed duels run the simulator and reward tables, then publish a
//!   report and apply stat deltas through the collaborators
//!
//! # Concurrency
//!
//! Each actor's state lives behind its own mutex; ticks and resyncs for
//! the same actor are serialized, different actors run in parallel.
//! Blocking collaborator calls (create/delete/list) are never made while
//! a per-actor lock is held: validate and reserve under the lock, release,
//! call out, reacquire to commit or roll back.
//!
//! # Outcome firing
//!
//! A completion outcome fires exactly once, on the tick that observes the
//! head job complete (locally predicted or via resync), guarded by a
//! per-job flag that lives until the authority stops reporting the job.
//! Prediction that free-runs more than one resync interval without
//! authoritative contact keeps counting down but does not fire outcomes.

use crate::combat::rewards::RewardCalculator;
use crate::combat::CombatSimulator;
use crate::core::time::{travel_duration_secs_at, SPEED_UNITS_PER_MINUTE};
use crate::models::event::{EngineEvent, EventLog};
use crate::models::job::{Job, JobKind, JobSpec};
use crate::models::position::Position;
use crate::predict::{snapshot_digest, PredictionReconciler};
use crate::queue::{JobQueue, DEFAULT_CAPACITY};
use crate::store::{CharacterStats, JobStore, OutcomeReport, Reporting, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// Configuration
// ============================================================================

/// Coordinator tuning knobs.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Seconds between periodic authoritative resyncs
    pub resync_interval_secs: f64,

    /// Delay between predicting a head-job completion and the confirming
    /// resync
    pub completion_resync_delay_secs: f64,

    /// Per-actor cap on queued activities
    pub max_queued_jobs: usize,

    /// Movement speed, world units per minute
    pub speed_units_per_minute: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            resync_interval_secs: 10.0,
            completion_resync_delay_secs: 1.0,
            max_queued_jobs: DEFAULT_CAPACITY,
            speed_units_per_minute: SPEED_UNITS_PER_MINUTE,
        }
    }
}

impl CoordinatorConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if self.resync_interval_secs <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "resync_interval_secs must be > 0".to_string(),
            ));
        }
        if self.completion_resync_delay_secs < 0.0 {
            return Err(EngineError::InvalidConfig(
                "completion_resync_delay_secs must be >= 0".to_string(),
            ));
        }
        if self.max_queued_jobs == 0 {
            return Err(EngineError::InvalidConfig(
                "max_queued_jobs must be > 0".to_string(),
            ));
        }
        if self.speed_units_per_minute <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "speed_units_per_minute must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Travel duration for a distance at the configured speed.
    fn travel_secs(&self, distance: f64) -> f64 {
        travel_duration_secs_at(distance, self.speed_units_per_minute)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by coordinator operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Queue full; non-retryable until a slot frees
    #[error("activity queue is full ({capacity} jobs)")]
    CapacityExceeded { capacity: usize },

    /// Not enough stamina; non-retryable until stamina regenerates
    #[error("insufficient stamina: required {required}, available {available}")]
    InsufficientStamina { required: i64, available: i64 },

    /// Collaborator failure; Enqueue/Cancel surface it for retry
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Per-actor state
// ============================================================================

/// Everything the coordinator tracks for one actor. Guarded by the
/// actor's own mutex; see the module docs for the locking discipline.
#[derive(Debug)]
struct ActorState {
    queue: JobQueue,
    position: Position,

    /// Stamina reserved by enqueues whose store create is still in flight
    reserved_stamina: i64,

    /// Creates in flight; counted against capacity so concurrent enqueues
    /// cannot oversubscribe the queue
    in_flight_creates: usize,

    /// Job ids whose completion outcome already fired; pruned when the
    /// authority stops reporting the job
    fired_outcomes: HashSet<String>,

    last_resync_at: Option<f64>,

    /// Last successful store round trip; gates outcome firing while the
    /// predictor free-runs
    last_authoritative_contact: Option<f64>,

    /// One-shot resync scheduled shortly after a predicted completion
    completion_resync_due: Option<f64>,

    last_snapshot_digest: Option<String>,

    /// Latest `now` seen by tick; timestamps events from enqueue/cancel,
    /// which take no clock parameter
    last_seen_now: f64,
}

impl ActorState {
    fn new(capacity: usize) -> Self {
        Self {
            queue: JobQueue::new(capacity),
            position: Position::ORIGIN,
            reserved_stamina: 0,
            in_flight_creates: 0,
            fired_outcomes: HashSet::new(),
            last_resync_at: None,
            last_authoritative_contact: None,
            completion_resync_due: None,
            last_snapshot_digest: None,
            last_seen_now: 0.0,
        }
    }

    fn resync_due(&self, now: f64, interval: f64) -> bool {
        if self.completion_resync_due.map_or(false, |due| now >= due) {
            return true;
        }
        match self.last_resync_at {
            None => true,
            Some(at) => now - at >= interval,
        }
    }

    /// Whether prediction is fresh enough to fire outcomes.
    fn contact_is_fresh(&self, now: f64, interval: f64) -> bool {
        self.last_authoritative_contact
            .map_or(false, |at| now - at <= interval)
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Facade owning per-actor queues, the prediction loop, and the resync
/// cycle.
pub struct ActivityCoordinator {
    config: CoordinatorConfig,
    store: Arc<dyn JobStore>,
    stats: Arc<dyn CharacterStats>,
    reporting: Arc<dyn Reporting>,
    reconciler: PredictionReconciler,
    actors: Mutex<HashMap<String, Arc<Mutex<ActorState>>>>,
    event_log: Mutex<EventLog>,
}

impl ActivityCoordinator {
    /// # Errors
    /// Returns `InvalidConfig` when the configuration fails validation.
    pub fn new(
        config: CoordinatorConfig,
        store: Arc<dyn JobStore>,
        stats: Arc<dyn CharacterStats>,
        reporting: Arc<dyn Reporting>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            stats,
            reporting,
            reconciler: PredictionReconciler::new(),
            actors: Mutex::new(HashMap::new()),
            event_log: Mutex::new(EventLog::new()),
        })
    }

    /// Record where an actor currently stands; the start of its next
    /// chain of travel legs.
    pub fn set_actor_position(&self, actor_id: &str, position: Position) {
        let entry = self.actor_entry(actor_id);
        entry.lock().unwrap().position = position;
    }

    /// All events logged so far, in occurrence order.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.event_log.lock().unwrap().events().to_vec()
    }

    // ========================================================================
    // Public operations
    // ========================================================================

    /// Queue a new activity for an actor.
    ///
    /// Capacity and stamina are validated and reserved under the actor's
    /// lock; the lock is released for the store round trip and reacquired
    /// to commit (or to roll back the reservation when the store fails).
    pub fn enqueue(&self, actor_id: &str, spec: &JobSpec) -> Result<Job, EngineError> {
        let available = self.stats.stamina(actor_id)?;
        let entry = self.actor_entry(actor_id);

        // Phase 1: validate and reserve.
        let local = {
            let mut state = entry.lock().unwrap();
            if state.queue.len() + state.in_flight_creates >= self.config.max_queued_jobs {
                return Err(EngineError::CapacityExceeded {
                    capacity: self.config.max_queued_jobs,
                });
            }
            let unreserved = available - state.reserved_stamina;
            if spec.stamina_cost > unreserved {
                return Err(EngineError::InsufficientStamina {
                    required: spec.stamina_cost,
                    available: unreserved.max(0),
                });
            }

            let start = state.queue.chain_start(state.position);
            let distance = start.distance_to(&spec.target_position);
            let travel = self.config.travel_secs(distance);

            state.reserved_stamina += spec.stamina_cost;
            state.in_flight_creates += 1;
            Job::from_spec(spec, travel)
        };

        // Phase 2: store round trip, lock released.
        let created = match self.store.create(actor_id, &local) {
            Ok(job) => job,
            Err(err) => {
                let mut state = entry.lock().unwrap();
                state.reserved_stamina -= spec.stamina_cost;
                state.in_flight_creates -= 1;
                return Err(err.into());
            }
        };

        // Phase 3: commit.
        let at = {
            let mut state = entry.lock().unwrap();
            state.reserved_stamina -= spec.stamina_cost;
            state.in_flight_creates -= 1;
            if let Err(err) = state.queue.push(created.clone()) {
                // A concurrent resync filled the queue from server state;
                // the job exists authoritatively and the next resync will
                // report it.
                warn!(actor_id, job_id = created.id(), %err, "created job not held locally");
            }
            state.last_seen_now
        };

        if let Err(err) = self.stats.adjust_stamina(actor_id, -spec.stamina_cost) {
            // The stamina ledger reconciles on the server side.
            warn!(actor_id, %err, "stamina debit failed after create");
        }

        debug!(actor_id, job_id = created.id(), kind = created.kind().label(), "enqueued");
        self.log(EngineEvent::Enqueued {
            at,
            actor_id: actor_id.to_string(),
            job_id: created.id().to_string(),
            kind: created.kind().label().to_string(),
            travel_secs: created.original_travel_duration(),
            execute_secs: created.original_execute_duration(),
        });
        Ok(created)
    }

    /// Remove a job from any queue position and refund its stamina.
    ///
    /// Idempotent: an id the authority already completed or never knew is
    /// reported as success. A job whose completion already resolved
    /// (outcome fired, or locally `Completed` awaiting the confirming
    /// resync) is removed without a refund: its rewards were earned.
    pub fn cancel(&self, actor_id: &str, job_id: &str) -> Result<(), EngineError> {
        let entry = self.actor_entry(actor_id);

        // Store first; local state is only mutated once the authority
        // agrees (or already forgot the job).
        match self.store.delete(actor_id, job_id) {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let (removed, at) = {
            let mut state = entry.lock().unwrap();
            // A stale fired flag is pruned by the next resync, never here.
            let resolved = state.fired_outcomes.contains(job_id)
                || state
                    .queue
                    .get(job_id)
                    .map(|j| j.is_complete())
                    .unwrap_or(false);
            let removed = state.queue.cancel(job_id).map(|job| (job, resolved));
            (removed, state.last_seen_now)
        };

        let Some((job, resolved)) = removed else {
            return Ok(());
        };

        let refund = if resolved { 0 } else { job.stamina_cost() };
        if refund > 0 {
            if let Err(err) = self.stats.adjust_stamina(actor_id, refund) {
                warn!(actor_id, job_id, %err, "stamina refund failed");
            }
        }

        debug!(actor_id, job_id, refund, "canceled");
        self.log(EngineEvent::Canceled {
            at,
            actor_id: actor_id.to_string(),
            job_id: job_id.to_string(),
            stamina_refunded: refund,
        });
        Ok(())
    }

    /// Current, locally predicted view of an actor's queue.
    pub fn snapshot(&self, actor_id: &str) -> Vec<Job> {
        let entry = self.actor_entry(actor_id);
        let state = entry.lock().unwrap();
        state.queue.jobs().to_vec()
    }

    /// Advance local prediction to `now` and drive the resync cycle.
    ///
    /// Returns the head job after advancement. Call at animation-frame or
    /// fixed-interval rate.
    pub fn tick(&self, actor_id: &str, now: f64) -> Option<Job> {
        let entry = self.actor_entry(actor_id);

        let due = {
            let mut state = entry.lock().unwrap();
            state.last_seen_now = now;
            state.resync_due(now, self.config.resync_interval_secs)
        };
        if due {
            self.resync(actor_id, &entry, now);
        }

        // Advance prediction and pick up at most one unfired completion.
        let (head, pending_outcome, transitions) = {
            let mut state = entry.lock().unwrap();
            let tick = self.reconciler.advance(&mut state.queue, now);

            let completed_unfired = state
                .queue
                .head()
                .filter(|h| h.is_complete() && !state.fired_outcomes.contains(h.id()))
                .cloned();

            let pending = match completed_unfired {
                Some(job) if state.contact_is_fresh(now, self.config.resync_interval_secs) => {
                    state.fired_outcomes.insert(job.id().to_string());
                    state.completion_resync_due =
                        Some(now + self.config.completion_resync_delay_secs);
                    Some(job)
                }
                _ => None,
            };

            (
                state.queue.head().cloned(),
                pending,
                tick.transitions,
            )
        };

        for t in &transitions {
            self.log(EngineEvent::PhaseChanged {
                at: now,
                actor_id: actor_id.to_string(),
                job_id: t.job_id.clone(),
                from: t.from,
                to: t.to,
            });
        }

        if let Some(job) = pending_outcome {
            self.log(EngineEvent::JobCompleted {
                at: now,
                actor_id: actor_id.to_string(),
                job_id: job.id().to_string(),
            });
            self.emit_outcome(actor_id, &job, now);
        }

        head
    }

    // ========================================================================
    // Resync
    // ========================================================================

    /// Replace local state with the authoritative snapshot.
    ///
    /// The store call runs without the actor lock. A failed list is logged
    /// and swallowed: prediction free-runs until the next attempt.
    fn resync(&self, actor_id: &str, entry: &Arc<Mutex<ActorState>>, now: f64) {
        let jobs = match self.store.list(actor_id) {
            Ok(jobs) => jobs,
            Err(err) => {
                warn!(actor_id, %err, "resync failed; continuing on local prediction");
                let mut state = entry.lock().unwrap();
                // Back off one full interval rather than retrying every tick.
                state.last_resync_at = Some(now);
                state.completion_resync_due = None;
                return;
            }
        };

        let digest = snapshot_digest(&jobs);
        let num_jobs = jobs.len();

        {
            let mut state = entry.lock().unwrap();
            state.last_resync_at = Some(now);
            state.last_authoritative_contact = Some(now);
            state.completion_resync_due = None;

            // Flags for jobs the authority no longer reports are dead:
            // keeping them would leak; dropping them cannot double-fire
            // because the job itself is gone.
            let reported: HashSet<&str> = jobs.iter().map(|j| j.id()).collect();
            state.fired_outcomes.retain(|id| reported.contains(id.as_str()));

            if state.last_snapshot_digest.as_deref() != Some(digest.as_str()) {
                state.queue.replace_all(jobs);
                state.last_snapshot_digest = Some(digest.clone());
            }
        }

        debug!(actor_id, num_jobs, "resynced");
        self.log(EngineEvent::Resynced {
            at: now,
            actor_id: actor_id.to_string(),
            num_jobs,
            digest,
        });
    }

    // ========================================================================
    // Outcome emission
    // ========================================================================

    /// Resolve a completed job into a report and stat deltas.
    ///
    /// Collaborator failures here are logged and swallowed: the outcome
    /// fired, and re-running it would double-grant.
    fn emit_outcome(&self, actor_id: &str, job: &Job, now: f64) {
        let report = match job.kind() {
            JobKind::Duel {
                challenger,
                opponent,
            } => {
                let mut result =
                    CombatSimulator::new(challenger.clone(), opponent.clone()).run();
                result.rewards = RewardCalculator::duel(
                    result.outcome,
                    challenger.level(),
                    opponent.level(),
                );
                let hp_delta = result.final_challenger_hp - challenger.hp_current();
                let narrative = format!(
                    "{} dueled {} for {} rounds: {} ({} hp left against {}).",
                    challenger.name(),
                    opponent.name(),
                    result.rounds_played,
                    result.outcome.label(),
                    result.final_challenger_hp,
                    result.final_opponent_hp,
                );

                if hp_delta != 0 {
                    if let Err(err) = self.stats.adjust_hp(actor_id, hp_delta) {
                        warn!(actor_id, %err, "hp adjustment failed");
                    }
                }

                OutcomeReport {
                    actor_id: actor_id.to_string(),
                    job_id: job.id().to_string(),
                    narrative,
                    outcome: Some(result.outcome),
                    rewards: result.rewards,
                    hp_delta,
                }
            }
            JobKind::TimedStrike { monster } => {
                let rewards = RewardCalculator::timed_strike(job.duration_tier(), monster);
                let narrative = format!(
                    "Fought {} and earned {} experience and {} yang.",
                    monster.name(),
                    rewards.experience,
                    rewards.yang,
                );
                OutcomeReport {
                    actor_id: actor_id.to_string(),
                    job_id: job.id().to_string(),
                    narrative,
                    outcome: None,
                    rewards,
                    hp_delta: 0,
                }
            }
            JobKind::Travel => OutcomeReport {
                actor_id: actor_id.to_string(),
                job_id: job.id().to_string(),
                narrative: "Arrived at the destination.".to_string(),
                outcome: None,
                rewards: Default::default(),
                hp_delta: 0,
            },
            JobKind::Sleep => OutcomeReport {
                actor_id: actor_id.to_string(),
                job_id: job.id().to_string(),
                narrative: "Woke up rested.".to_string(),
                outcome: None,
                rewards: Default::default(),
                hp_delta: 0,
            },
        };

        if report.rewards.experience > 0 {
            if let Err(err) = self.stats.grant_experience(actor_id, report.rewards.experience) {
                warn!(actor_id, %err, "experience grant failed");
            }
        }
        if report.rewards.yang > 0 {
            if let Err(err) = self.stats.adjust_yang(actor_id, report.rewards.yang) {
                warn!(actor_id, %err, "yang grant failed");
            }
        }
        if let Err(err) = self.reporting.publish(actor_id, &report) {
            warn!(actor_id, %err, "report publish failed");
        }

        // Travel completion moves the actor to the job's target.
        if matches!(job.kind(), JobKind::Travel) {
            let entry = self.actor_entry(actor_id);
            entry.lock().unwrap().position = job.target_position();
        }

        self.log(EngineEvent::OutcomeEmitted {
            at: now,
            actor_id: actor_id.to_string(),
            job_id: job.id().to_string(),
            outcome: report
                .outcome
                .map(|o| o.label().to_string())
                .unwrap_or_else(|| "completed".to_string()),
            experience: report.rewards.experience,
            yang: report.rewards.yang,
        });
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn actor_entry(&self, actor_id: &str) -> Arc<Mutex<ActorState>> {
        let mut actors = self.actors.lock().unwrap();
        actors
            .entry(actor_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ActorState::new(self.config.max_queued_jobs))))
            .clone()
    }

    fn log(&self, event: EngineEvent) {
        self.event_log.lock().unwrap().log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoordinatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = CoordinatorConfig {
            resync_interval_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
