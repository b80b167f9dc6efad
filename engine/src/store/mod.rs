//! Collaborator interfaces
//!
//! The engine owns scheduling and simulation; persistence, character
//! stats, and report delivery are remote collaborators reached through
//! these narrow, transport-agnostic traits. Calls are blocking and must
//! never be made while holding a per-actor lock.
//!
//! The in-memory implementations back the integration tests and the demo
//! binary. They are kept in the regular build, like any other test double
//! a consumer may want to wire up.

use crate::combat::rewards::Rewards;
use crate::combat::DuelOutcome;
use crate::models::job::Job;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by collaborator calls.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Transient transport failure; the caller may retry
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The entity no longer exists (e.g. the job already completed)
    #[error("not found: {0}")]
    NotFound(String),
}

/// Remote persistence of job queues, keyed by actor id.
pub trait JobStore: Send + Sync {
    /// Authoritative, order-preserving job list for an actor.
    fn list(&self, actor_id: &str) -> Result<Vec<Job>, StoreError>;

    /// Persist a new job and return it with its store-assigned id.
    fn create(&self, actor_id: &str, job: &Job) -> Result<Job, StoreError>;

    /// Remove a job. `NotFound` means it already completed or was removed.
    fn delete(&self, actor_id: &str, job_id: &str) -> Result<(), StoreError>;
}

/// Remote character stat adjustments.
pub trait CharacterStats: Send + Sync {
    fn stamina(&self, actor_id: &str) -> Result<i64, StoreError>;
    fn adjust_stamina(&self, actor_id: &str, delta: i64) -> Result<(), StoreError>;
    fn adjust_hp(&self, actor_id: &str, delta: i64) -> Result<(), StoreError>;
    fn adjust_yang(&self, actor_id: &str, delta: i64) -> Result<(), StoreError>;
    fn grant_experience(&self, actor_id: &str, amount: i64) -> Result<(), StoreError>;
}

/// Completion report published when a job resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeReport {
    pub actor_id: String,
    pub job_id: String,
    /// Human-readable narrative of what happened
    pub narrative: String,
    /// Set for duels only
    pub outcome: Option<DuelOutcome>,
    pub rewards: Rewards,
    /// Hp change applied to the actor (non-positive; duels only)
    pub hp_delta: i64,
}

/// Delivery of completion reports to the rest of the application.
pub trait Reporting: Send + Sync {
    fn publish(&self, actor_id: &str, report: &OutcomeReport) -> Result<(), StoreError>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// In-memory `JobStore` that mints UUID job ids.
///
/// Tests and the demo binary use the inherent methods to play the role of
/// the server: advancing countdowns, completing or dropping jobs out from
/// under the client.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, Vec<Job>>>,
    unavailable: Mutex<bool>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreError::Unavailable` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.unavailable.lock().unwrap() {
            Err(StoreError::Unavailable("in-memory store offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Server-side time advancement: tick every actor's head job.
    pub fn advance_all(&self, dt: f64) {
        let mut jobs = self.jobs.lock().unwrap();
        for list in jobs.values_mut() {
            let mut remaining = dt;
            if let Some(head) = list.first_mut() {
                // The authority consumes travel overshoot into execution,
                // unlike the client predictor; it holds ground truth.
                if head.travel_remaining() > 0.0 {
                    let used = head.travel_remaining().min(remaining);
                    head.promote();
                    head.advance(used);
                    remaining -= used;
                }
                if remaining > 0.0 {
                    head.promote();
                    head.advance(remaining);
                }
            }
            // Drop jobs the server considers finished.
            if list.first().map(|j| j.is_complete()).unwrap_or(false) {
                list.remove(0);
            }
        }
    }

    /// Drop every job for an actor (server-side wipe).
    pub fn clear_actor(&self, actor_id: &str) {
        self.jobs.lock().unwrap().remove(actor_id);
    }

    /// Remove one job server-side without going through `delete`.
    pub fn drop_job(&self, actor_id: &str, job_id: &str) {
        if let Some(list) = self.jobs.lock().unwrap().get_mut(actor_id) {
            list.retain(|j| j.id() != job_id);
        }
    }
}

impl JobStore for InMemoryJobStore {
    fn list(&self, actor_id: &str) -> Result<Vec<Job>, StoreError> {
        self.check_available()?;
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(actor_id)
            .cloned()
            .unwrap_or_default())
    }

    fn create(&self, actor_id: &str, job: &Job) -> Result<Job, StoreError> {
        self.check_available()?;
        let created = job.clone().with_id(uuid::Uuid::new_v4().to_string());
        self.jobs
            .lock()
            .unwrap()
            .entry(actor_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    fn delete(&self, actor_id: &str, job_id: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut jobs = self.jobs.lock().unwrap();
        let list = jobs
            .get_mut(actor_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        let before = list.len();
        list.retain(|j| j.id() != job_id);
        if list.len() == before {
            return Err(StoreError::NotFound(job_id.to_string()));
        }
        Ok(())
    }
}

/// Mutable stat block held by [`InMemoryCharacterStats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatBlock {
    pub stamina: i64,
    pub hp: i64,
    pub yang: i64,
    pub experience: i64,
}

/// In-memory `CharacterStats`.
#[derive(Debug, Default)]
pub struct InMemoryCharacterStats {
    blocks: Mutex<HashMap<String, StatBlock>>,
}

impl InMemoryCharacterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, actor_id: &str, block: StatBlock) {
        self.blocks
            .lock()
            .unwrap()
            .insert(actor_id.to_string(), block);
    }

    pub fn block(&self, actor_id: &str) -> Option<StatBlock> {
        self.blocks.lock().unwrap().get(actor_id).copied()
    }

    fn with_block<T>(
        &self,
        actor_id: &str,
        f: impl FnOnce(&mut StatBlock) -> T,
    ) -> Result<T, StoreError> {
        let mut blocks = self.blocks.lock().unwrap();
        let block = blocks
            .get_mut(actor_id)
            .ok_or_else(|| StoreError::NotFound(actor_id.to_string()))?;
        Ok(f(block))
    }
}

impl CharacterStats for InMemoryCharacterStats {
    fn stamina(&self, actor_id: &str) -> Result<i64, StoreError> {
        self.with_block(actor_id, |b| b.stamina)
    }

    fn adjust_stamina(&self, actor_id: &str, delta: i64) -> Result<(), StoreError> {
        self.with_block(actor_id, |b| b.stamina += delta)
    }

    fn adjust_hp(&self, actor_id: &str, delta: i64) -> Result<(), StoreError> {
        self.with_block(actor_id, |b| b.hp = (b.hp + delta).max(0))
    }

    fn adjust_yang(&self, actor_id: &str, delta: i64) -> Result<(), StoreError> {
        self.with_block(actor_id, |b| b.yang += delta)
    }

    fn grant_experience(&self, actor_id: &str, amount: i64) -> Result<(), StoreError> {
        self.with_block(actor_id, |b| b.experience += amount)
    }
}

/// `Reporting` double that records every published report.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<OutcomeReport>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<OutcomeReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl Reporting for RecordingReporter {
    fn publish(&self, _actor_id: &str, report: &OutcomeReport) -> Result<(), StoreError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
