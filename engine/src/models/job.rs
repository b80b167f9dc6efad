//! Job model
//!
//! One queued timed activity. Each job has:
//! - A kind (timed strike, travel, sleep, duel) carrying its payload
//! - A duration tier (Short/Medium/Long) for strike timing and rewards
//! - A target position and a travel leg derived from it
//! - An explicit phase (`Queued`, `Traveling`, `Executing`, `Completed`)
//! - Remaining/original durations for both phases
//!
//! The phase is tagged state, never inferred from queue position: a job
//! that is not the head is `Queued`, and a locally finished job stays
//! `Completed` until the authority stops reporting it.
//!
//! CRITICAL: remaining times are clamped at 0 and only ever decrease
//! between authoritative refreshes.

use crate::core::time::progress_fraction;
use crate::models::combatant::{CombatantSnapshot, MonsterStats};
use crate::models::position::Position;
use serde::{Deserialize, Serialize};

/// Coarse length bucket for a timed strike, also keyed by the reward tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationTier {
    /// 15 seconds
    Short,
    /// 10 minutes
    Medium,
    /// 1 hour
    Long,
}

impl DurationTier {
    /// Execute-phase length for a strike of this tier, in seconds.
    pub fn execute_secs(&self) -> f64 {
        match self {
            DurationTier::Short => 15.0,
            DurationTier::Medium => 600.0,
            DurationTier::Long => 3600.0,
        }
    }

    /// Fraction of the payload's full reward granted at this tier.
    pub fn reward_fraction(&self) -> f64 {
        match self {
            DurationTier::Short => 0.0065,
            DurationTier::Medium => 0.235,
            DurationTier::Long => 1.0,
        }
    }
}

/// What the activity does, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobKind {
    /// Fight a monster for the tier's duration
    TimedStrike { monster: MonsterStats },

    /// Move to the target position; arriving completes the job
    Travel,

    /// Rest at the target position
    Sleep,

    /// Duel another player; both snapshots frozen at enqueue time
    Duel {
        challenger: CombatantSnapshot,
        opponent: CombatantSnapshot,
    },
}

impl JobKind {
    /// Execute-phase length fixed by the kind, or `None` when the duration
    /// tier decides (timed strikes).
    pub fn fixed_execute_secs(&self) -> Option<f64> {
        match self {
            JobKind::TimedStrike { .. } => None,
            JobKind::Travel => Some(0.0),
            JobKind::Sleep => Some(3600.0),
            JobKind::Duel { .. } => Some(15.0),
        }
    }

    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::TimedStrike { .. } => "timed_strike",
            JobKind::Travel => "travel",
            JobKind::Sleep => "sleep",
            JobKind::Duel { .. } => "duel",
        }
    }
}

/// Lifecycle phase of a job.
///
/// `Queued` jobs are waiting behind the head. The head is `Traveling` or
/// `Executing`; a head whose execute countdown hit zero is `Completed` and
/// stays in place until an authoritative resync removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Queued,
    Traveling,
    Executing,
    Completed,
}

/// Caller-supplied description of a job to enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: JobKind,
    pub duration_tier: DurationTier,
    pub target_position: Position,
    pub stamina_cost: i64,
}

impl JobSpec {
    /// Execute-phase duration: fixed by kind, else by tier.
    pub fn execute_duration_secs(&self) -> f64 {
        self.kind
            .fixed_execute_secs()
            .unwrap_or_else(|| self.duration_tier.execute_secs())
    }
}

/// One queued or active activity.
///
/// # Example
/// ```
/// use activity_engine_core_rs::{DurationTier, Job, JobKind, JobPhase, JobSpec, Position};
///
/// let spec = JobSpec {
///     kind: JobKind::Sleep,
///     duration_tier: DurationTier::Short,
///     target_position: Position::new(0.0, 0.0),
///     stamina_cost: 5,
/// };
/// let job = Job::from_spec(&spec, 120.0);
/// assert_eq!(job.phase(), JobPhase::Queued);
/// assert_eq!(job.travel_remaining(), 120.0);
/// assert_eq!(job.original_execute_duration(), 3600.0); // fixed for Sleep
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the remote store on creation.
    /// Empty until the store confirms the job.
    id: String,

    kind: JobKind,

    duration_tier: DurationTier,

    target_position: Position,

    phase: JobPhase,

    /// Seconds of travel left; clamped at 0
    travel_remaining: f64,

    /// Seconds of execution left; clamped at 0
    execute_remaining: f64,

    /// Travel length at creation; immutable, needed for progress math
    original_travel_duration: f64,

    /// Execute length at creation; immutable
    original_execute_duration: f64,

    /// Stamina reserved when the job was enqueued, refunded on cancel
    stamina_cost: i64,

    /// Wall-clock instant of the last local advancement; `None` until the
    /// predictor first touches the job
    last_local_update: Option<f64>,
}

impl Job {
    /// Build a local job from a spec and its computed travel leg.
    ///
    /// The job starts `Queued`; the queue promotes it when it becomes the
    /// head. The id stays empty until the store assigns one.
    ///
    /// # Panics
    /// Panics if the travel duration or stamina cost is negative.
    pub fn from_spec(spec: &JobSpec, original_travel_duration: f64) -> Self {
        assert!(
            original_travel_duration >= 0.0,
            "travel duration must be non-negative"
        );
        assert!(spec.stamina_cost >= 0, "stamina_cost must be non-negative");

        let execute = spec.execute_duration_secs();
        Self {
            id: String::new(),
            kind: spec.kind.clone(),
            duration_tier: spec.duration_tier,
            target_position: spec.target_position,
            phase: JobPhase::Queued,
            travel_remaining: original_travel_duration,
            execute_remaining: execute,
            original_travel_duration,
            original_execute_duration: execute,
            stamina_cost: spec.stamina_cost,
            last_local_update: None,
        }
    }

    /// Attach the store-assigned id.
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn duration_tier(&self) -> DurationTier {
        self.duration_tier
    }

    pub fn target_position(&self) -> Position {
        self.target_position
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn travel_remaining(&self) -> f64 {
        self.travel_remaining
    }

    pub fn execute_remaining(&self) -> f64 {
        self.execute_remaining
    }

    pub fn original_travel_duration(&self) -> f64 {
        self.original_travel_duration
    }

    pub fn original_execute_duration(&self) -> f64 {
        self.original_execute_duration
    }

    pub fn stamina_cost(&self) -> i64 {
        self.stamina_cost
    }

    pub fn last_local_update(&self) -> Option<f64> {
        self.last_local_update
    }

    pub fn is_complete(&self) -> bool {
        self.phase == JobPhase::Completed
    }

    /// Normalized progress of the current phase, in [0, 1].
    pub fn phase_progress(&self) -> f64 {
        match self.phase {
            JobPhase::Queued => 0.0,
            JobPhase::Traveling => {
                progress_fraction(self.original_travel_duration, self.travel_remaining)
            }
            JobPhase::Executing => {
                progress_fraction(self.original_execute_duration, self.execute_remaining)
            }
            JobPhase::Completed => 1.0,
        }
    }

    /// Promote a `Queued` job to head: travel if there is a leg left,
    /// otherwise execute immediately. Returns the transition, if any.
    pub(crate) fn promote(&mut self) -> Option<(JobPhase, JobPhase)> {
        if self.phase != JobPhase::Queued {
            return None;
        }
        let to = if self.travel_remaining > 0.0 {
            JobPhase::Traveling
        } else {
            JobPhase::Executing
        };
        self.phase = to;
        Some((JobPhase::Queued, to))
    }

    /// Advance the countdown of the active phase by `dt` seconds.
    ///
    /// At most one phase is consumed per call: a travel countdown that hits
    /// zero flips the job to `Executing` without carrying the overshoot
    /// into execute time. An execute countdown that hits zero flips to
    /// `Completed`. Returns the transition, if any.
    pub(crate) fn advance(&mut self, dt: f64) -> Option<(JobPhase, JobPhase)> {
        assert!(dt >= 0.0, "dt must be non-negative");
        match self.phase {
            JobPhase::Queued | JobPhase::Completed => None,
            JobPhase::Traveling => {
                self.travel_remaining = (self.travel_remaining - dt).max(0.0);
                if self.travel_remaining == 0.0 {
                    self.phase = JobPhase::Executing;
                    Some((JobPhase::Traveling, JobPhase::Executing))
                } else {
                    None
                }
            }
            JobPhase::Executing => {
                self.execute_remaining = (self.execute_remaining - dt).max(0.0);
                if self.execute_remaining == 0.0 {
                    self.phase = JobPhase::Completed;
                    Some((JobPhase::Executing, JobPhase::Completed))
                } else {
                    None
                }
            }
        }
    }

    /// Record the wall-clock instant of the latest local advancement.
    pub(crate) fn anchor(&mut self, now: f64) {
        self.last_local_update = Some(now);
    }

    /// Force a phase, used when applying an authoritative snapshot.
    pub(crate) fn set_phase(&mut self, phase: JobPhase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleep_spec() -> JobSpec {
        JobSpec {
            kind: JobKind::Sleep,
            duration_tier: DurationTier::Short,
            target_position: Position::new(10.0, 0.0),
            stamina_cost: 2,
        }
    }

    #[test]
    fn test_promote_skips_travel_when_no_leg() {
        let mut job = Job::from_spec(&sleep_spec(), 0.0);
        assert_eq!(job.promote(), Some((JobPhase::Queued, JobPhase::Executing)));
    }

    #[test]
    fn test_travel_overshoot_not_carried_into_execute() {
        let mut job = Job::from_spec(&sleep_spec(), 10.0);
        job.promote();
        // 25s elapsed against a 10s leg: execute time untouched.
        let transition = job.advance(25.0);
        assert_eq!(transition, Some((JobPhase::Traveling, JobPhase::Executing)));
        assert_eq!(job.execute_remaining(), 3600.0);
    }

    #[test]
    fn test_completed_job_stops_advancing() {
        let mut job = Job::from_spec(&sleep_spec(), 0.0);
        job.promote();
        job.advance(3600.0);
        assert!(job.is_complete());
        assert_eq!(job.advance(100.0), None);
        assert_eq!(job.execute_remaining(), 0.0);
    }
}
