//! Tests for the bounded per-actor job queue.

use activity_engine_core_rs::{
    DurationTier, Job, JobKind, JobPhase, JobQueue, JobSpec, Position, QueueError,
};

fn travel_job(id: &str, x: f64, travel_secs: f64) -> Job {
    let spec = JobSpec {
        kind: JobKind::Travel,
        duration_tier: DurationTier::Short,
        target_position: Position::new(x, 0.0),
        stamina_cost: 3,
    };
    Job::from_spec(&spec, travel_secs).with_id(id.to_string())
}

fn sleep_job(id: &str, travel_secs: f64) -> Job {
    let spec = JobSpec {
        kind: JobKind::Sleep,
        duration_tier: DurationTier::Short,
        target_position: Position::new(0.0, 0.0),
        stamina_cost: 3,
    };
    Job::from_spec(&spec, travel_secs).with_id(id.to_string())
}

#[test]
fn test_fourth_job_rejected() {
    let mut queue = JobQueue::new(3);
    for i in 0..3 {
        queue.push(travel_job(&format!("j{i}"), 10.0, 10.0)).unwrap();
    }
    assert_eq!(
        queue.push(travel_job("j3", 10.0, 10.0)),
        Err(QueueError::CapacityExceeded { capacity: 3 })
    );
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_first_job_promoted_rest_queued() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("j0", 30.0)).unwrap();
    queue.push(sleep_job("j1", 30.0)).unwrap();

    assert_eq!(queue.jobs()[0].phase(), JobPhase::Traveling);
    assert_eq!(queue.jobs()[1].phase(), JobPhase::Queued);
}

#[test]
fn test_zero_travel_head_executes_immediately() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("j0", 0.0)).unwrap();
    assert_eq!(queue.head().unwrap().phase(), JobPhase::Executing);
}

#[test]
fn test_travel_legs_chain_from_last_target() {
    let mut queue = JobQueue::new(3);
    let actor = Position::new(0.0, 0.0);
    assert_eq!(queue.chain_start(actor), actor);

    queue.push(travel_job("j0", 60.0, 60.0)).unwrap();
    assert_eq!(queue.chain_start(actor), Position::new(60.0, 0.0));

    queue.push(travel_job("j1", 120.0, 60.0)).unwrap();
    assert_eq!(queue.chain_start(actor), Position::new(120.0, 0.0));
}

#[test]
fn test_cancel_head_promotes_successor() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("j0", 30.0)).unwrap();
    queue.push(sleep_job("j1", 45.0)).unwrap();

    let removed = queue.cancel("j0").unwrap();
    assert_eq!(removed.stamina_cost(), 3);
    let head = queue.head().unwrap();
    assert_eq!(head.id(), "j1");
    assert_eq!(head.phase(), JobPhase::Traveling);
    assert_eq!(head.travel_remaining(), 45.0);
}

#[test]
fn test_cancel_queued_job_leaves_others_untouched() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("j0", 10.0)).unwrap();
    queue.push(sleep_job("j1", 20.0)).unwrap();
    queue.push(sleep_job("j2", 30.0)).unwrap();

    queue.cancel("j1");

    // The remaining jobs keep their travel legs; the chain is not
    // recomputed on removal.
    assert_eq!(queue.jobs()[0].travel_remaining(), 10.0);
    assert_eq!(queue.jobs()[1].travel_remaining(), 30.0);
}

#[test]
fn test_cancel_is_idempotent() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("j0", 10.0)).unwrap();
    assert!(queue.cancel("j0").is_some());
    assert!(queue.cancel("j0").is_none());
    assert!(queue.is_empty());
}

#[test]
fn test_replace_all_is_wholesale() {
    let mut queue = JobQueue::new(3);
    queue.push(sleep_job("local-a", 10.0)).unwrap();
    queue.push(sleep_job("local-b", 20.0)).unwrap();

    // The authority reports a different set; local jobs vanish.
    queue.replace_all(vec![sleep_job("server-a", 5.0)]);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.head().unwrap().id(), "server-a");
    assert_eq!(queue.head().unwrap().phase(), JobPhase::Traveling);

    // Zero jobs clears the queue outright.
    queue.replace_all(Vec::new());
    assert!(queue.is_empty());
}
