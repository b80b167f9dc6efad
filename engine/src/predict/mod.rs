//! Local prediction between authoritative refreshes
//!
//! The reconciler advances the head job's countdown at wall-clock rate so
//! consumers get smooth, monotonic progress without a server round trip
//! per frame. The underlying numeric state is exact; only the optional
//! display helper interpolates.
//!
//! The reconciler never deletes jobs: a finished job flips to `Completed`
//! and waits for the authoritative refresh to remove it. Deletion and
//! outcome computation belong to the coordinator.

use crate::models::job::{Job, JobPhase};
use crate::queue::JobQueue;
use sha2::{Digest, Sha256};

/// One phase transition observed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTransition {
    pub job_id: String,
    pub from: JobPhase,
    pub to: JobPhase,
}

/// Result of advancing an actor's queue to `now`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictedTick {
    /// Id of the head job after advancement, if any
    pub head_job_id: Option<String>,

    /// Phase transitions that occurred this tick, in order
    pub transitions: Vec<PhaseTransition>,

    /// Set when the head's execute countdown reached zero this tick.
    /// This fires at most once per job: later ticks see `Completed` and
    /// leave it alone.
    pub completed_job_id: Option<String>,
}

/// Advances locally predicted state at wall-clock rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionReconciler;

impl PredictionReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Advance the head job to `now`.
    ///
    /// Elapsed time is measured against the job's own `last_local_update`
    /// anchor; the first tick after a job becomes head only anchors it.
    /// A clock that apparently ran backwards advances nothing.
    ///
    /// A `Traveling` head whose countdown hits zero flips to `Executing`
    /// without carrying the overshoot into execute time. An `Executing`
    /// head whose countdown hits zero flips to `Completed` and stops.
    pub fn advance(&self, queue: &mut JobQueue, now: f64) -> PredictedTick {
        let mut result = PredictedTick::default();

        // A head left Queued by a cancel or resync starts counting here.
        if let Some((from, to)) = queue.rederive_head() {
            if let Some(head) = queue.head() {
                result.transitions.push(PhaseTransition {
                    job_id: head.id().to_string(),
                    from,
                    to,
                });
            }
        }

        let Some(head) = queue.head_mut() else {
            return result;
        };
        result.head_job_id = Some(head.id().to_string());

        let dt = match head.last_local_update() {
            Some(anchor) => (now - anchor).max(0.0),
            None => 0.0,
        };
        head.anchor(now);

        if let Some((from, to)) = head.advance(dt) {
            let job_id = head.id().to_string();
            if to == JobPhase::Completed {
                result.completed_job_id = Some(job_id.clone());
            }
            result.transitions.push(PhaseTransition { job_id, from, to });
        }

        // A zero-length execute phase (travel-only job) completes in the
        // same tick it starts executing.
        if let Some(head) = queue.head_mut() {
            if head.phase() == JobPhase::Executing && head.execute_remaining() == 0.0 {
                if let Some((from, to)) = head.advance(0.0) {
                    let job_id = head.id().to_string();
                    result.completed_job_id = Some(job_id.clone());
                    result.transitions.push(PhaseTransition { job_id, from, to });
                }
            }
        }

        result
    }
}

/// SHA-256 digest of an authoritative job list.
///
/// The coordinator compares digests to skip re-applying a snapshot that
/// matches what it already holds.
pub fn snapshot_digest(jobs: &[Job]) -> String {
    let json = serde_json::to_string(jobs).expect("job list serializes");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bounded-rate interpolation for progress bars.
///
/// Consumers projecting predicted progress onto an animated bar must not
/// snap to the exact numeric value when local and authoritative clocks
/// disagree slightly. This helper moves the shown value at most a fixed
/// fraction of the remaining gap per update.
///
/// # Example
/// ```
/// use activity_engine_core_rs::SmoothedProgress;
///
/// let mut bar = SmoothedProgress::new();
/// let shown = bar.update(1.0);
/// assert!(shown > 0.0 && shown < 1.0); // eases toward the target
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SmoothedProgress {
    shown: f64,
    gap_fraction: f64,
}

impl Default for SmoothedProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SmoothedProgress {
    /// Fraction of the remaining gap consumed per update.
    pub const DEFAULT_GAP_FRACTION: f64 = 0.25;

    /// Gaps smaller than this snap to the target outright.
    const SNAP_EPSILON: f64 = 1e-4;

    pub fn new() -> Self {
        Self::with_gap_fraction(Self::DEFAULT_GAP_FRACTION)
    }

    /// # Panics
    /// Panics unless `gap_fraction` is within (0, 1].
    pub fn with_gap_fraction(gap_fraction: f64) -> Self {
        assert!(
            gap_fraction > 0.0 && gap_fraction <= 1.0,
            "gap_fraction must be within (0, 1]"
        );
        Self {
            shown: 0.0,
            gap_fraction,
        }
    }

    /// Move the shown value toward `target` (a [0, 1] progress fraction)
    /// and return it.
    pub fn update(&mut self, target: f64) -> f64 {
        let target = target.clamp(0.0, 1.0);
        let gap = target - self.shown;
        if gap.abs() <= Self::SNAP_EPSILON {
            self.shown = target;
        } else {
            self.shown += gap * self.gap_fraction;
        }
        self.shown
    }

    pub fn shown(&self) -> f64 {
        self.shown
    }

    /// Reset to a known value, e.g. when the tracked job changes.
    pub fn reset(&mut self, value: f64) {
        self.shown = value.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{DurationTier, JobKind, JobSpec};
    use crate::models::position::Position;

    fn sleep_job(id: &str, travel: f64) -> Job {
        let spec = JobSpec {
            kind: JobKind::Sleep,
            duration_tier: DurationTier::Short,
            target_position: Position::new(100.0, 0.0),
            stamina_cost: 1,
        };
        Job::from_spec(&spec, travel).with_id(id.to_string())
    }

    #[test]
    fn test_first_tick_only_anchors() {
        let mut queue = JobQueue::new(3);
        queue.push(sleep_job("j0", 60.0)).unwrap();
        let reconciler = PredictionReconciler::new();

        let tick = reconciler.advance(&mut queue, 1000.0);
        assert_eq!(tick.head_job_id.as_deref(), Some("j0"));
        assert_eq!(queue.head().unwrap().travel_remaining(), 60.0);
    }

    #[test]
    fn test_backwards_clock_advances_nothing() {
        let mut queue = JobQueue::new(3);
        queue.push(sleep_job("j0", 60.0)).unwrap();
        let reconciler = PredictionReconciler::new();

        reconciler.advance(&mut queue, 1000.0);
        reconciler.advance(&mut queue, 990.0);
        assert_eq!(queue.head().unwrap().travel_remaining(), 60.0);
    }

    #[test]
    fn test_travel_only_job_completes_in_one_tick() {
        let mut queue = JobQueue::new(3);
        let spec = JobSpec {
            kind: JobKind::Travel,
            duration_tier: DurationTier::Short,
            target_position: Position::new(100.0, 0.0),
            stamina_cost: 1,
        };
        queue
            .push(Job::from_spec(&spec, 10.0).with_id("j0".to_string()))
            .unwrap();
        let reconciler = PredictionReconciler::new();

        reconciler.advance(&mut queue, 0.0);
        let tick = reconciler.advance(&mut queue, 10.0);
        assert_eq!(tick.completed_job_id.as_deref(), Some("j0"));
        assert_eq!(queue.head().unwrap().phase(), JobPhase::Completed);
    }

    #[test]
    fn test_digest_stable_and_sensitive() {
        let a = vec![sleep_job("j0", 60.0)];
        let b = vec![sleep_job("j0", 60.0)];
        let c = vec![sleep_job("j1", 60.0)];
        assert_eq!(snapshot_digest(&a), snapshot_digest(&b));
        assert_ne!(snapshot_digest(&a), snapshot_digest(&c));
    }

    #[test]
    fn test_smoothing_converges_without_overshoot() {
        let mut bar = SmoothedProgress::new();
        let mut prev = 0.0;
        for _ in 0..200 {
            let shown = bar.update(1.0);
            assert!(shown >= prev && shown <= 1.0);
            prev = shown;
        }
        assert_eq!(bar.shown(), 1.0);
    }
}
