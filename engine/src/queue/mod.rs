//! Per-actor job queue
//!
//! The bounded, ordered collection of one actor's activities. Execution
//! order is FIFO by enqueue time and is never reordered. Travel legs
//! chain: a new job starts where the previous one ends.
//!
//! # Critical Invariants
//!
//! 1. At most `capacity` (default 3) jobs per actor
//! 2. Exactly the head job is `Traveling`/`Executing`/`Completed`; every
//!    other job is `Queued`
//! 3. Resync replaces the whole list, never individual fields

use crate::models::job::{Job, JobPhase};
use crate::models::position::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default per-actor cap on queued activities.
pub const DEFAULT_CAPACITY: usize = 3;

/// Errors from queue mutations.
#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("activity queue is full ({capacity} jobs)")]
    CapacityExceeded { capacity: usize },
}

/// Bounded FIFO of one actor's jobs.
///
/// # Example
/// ```
/// use activity_engine_core_rs::{DurationTier, Job, JobKind, JobQueue, JobSpec, Position};
///
/// let mut queue = JobQueue::new(3);
/// let spec = JobSpec {
///     kind: JobKind::Travel,
///     duration_tier: DurationTier::Short,
///     target_position: Position::new(100.0, 0.0),
///     stamina_cost: 1,
/// };
/// queue.push(Job::from_spec(&spec, 60.0).with_id("j1".to_string())).unwrap();
/// assert_eq!(queue.head().unwrap().id(), "j1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobQueue {
    jobs: Vec<Job>,
    capacity: usize,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl JobQueue {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            jobs: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// The head job: the single job allowed to count down.
    pub fn head(&self) -> Option<&Job> {
        self.jobs.first()
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut Job> {
        self.jobs.first_mut()
    }

    pub fn get(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id() == job_id)
    }

    /// Start position for the next job's travel leg: the actor's current
    /// position, or the target of the last queued job (jobs chain).
    pub fn chain_start(&self, actor_position: Position) -> Position {
        self.jobs
            .last()
            .map(|j| j.target_position())
            .unwrap_or(actor_position)
    }

    /// Append a job. A job pushed onto an empty queue is promoted to head
    /// immediately; otherwise it stays `Queued`.
    pub fn push(&mut self, job: Job) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.jobs.push(job);
        if self.jobs.len() == 1 {
            self.rederive_head();
        }
        Ok(())
    }

    /// Remove a job from any position and re-derive the head.
    ///
    /// Returns the removed job (its `stamina_cost` is what the caller must
    /// refund), or `None` when the id is unknown (cancellation is
    /// idempotent). Travel legs of later jobs are deliberately left
    /// untouched even though the chain's start position changed.
    pub fn cancel(&mut self, job_id: &str) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.id() == job_id)?;
        let removed = self.jobs.remove(idx);
        self.rederive_head();
        Some(removed)
    }

    /// Replace the whole queue with an authoritative snapshot.
    ///
    /// Phases are re-derived from the reported countdowns: the head is
    /// `Traveling` while it has a travel leg left, `Executing` while it has
    /// execute time left, else `Completed`; every other job is `Queued`.
    pub fn replace_all(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
        for job in self.jobs.iter_mut().skip(1) {
            job.set_phase(JobPhase::Queued);
        }
        if let Some(head) = self.jobs.first_mut() {
            let phase = if head.travel_remaining() > 0.0 {
                JobPhase::Traveling
            } else if head.execute_remaining() > 0.0 {
                JobPhase::Executing
            } else {
                JobPhase::Completed
            };
            head.set_phase(phase);
        }
    }

    /// Promote the head if it is still `Queued`. Returns the transition.
    pub(crate) fn rederive_head(&mut self) -> Option<(JobPhase, JobPhase)> {
        self.jobs.first_mut().and_then(|head| head.promote())
    }
}
