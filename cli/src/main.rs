//! Demo scenario for the activity engine.
//!
//! Wires the coordinator to in-memory collaborators, queues a timed
//! strike and a duel, and ticks the engine once per simulated second
//! while the in-memory store plays the authoritative server.

use activity_engine_core_rs::{
    ActivityCoordinator, CombatantSnapshot, CoordinatorConfig, DurationTier, InMemoryCharacterStats,
    InMemoryJobStore, JobKind, JobSpec, MonsterStats, Position, RecordingReporter,
};
use activity_engine_core_rs::store::StatBlock;
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(InMemoryJobStore::new());
    let stats = Arc::new(InMemoryCharacterStats::new());
    let reporter = Arc::new(RecordingReporter::new());

    stats.insert(
        "kael",
        StatBlock {
            stamina: 100,
            hp: 6339,
            yang: 0,
            experience: 0,
        },
    );

    let coordinator = ActivityCoordinator::new(
        CoordinatorConfig::default(),
        store.clone(),
        stats.clone(),
        reporter.clone(),
    )
    .expect("default config is valid");

    coordinator.set_actor_position("kael", Position::new(0.0, 0.0));

    let strike = JobSpec {
        kind: JobKind::TimedStrike {
            monster: MonsterStats::new("Wild Boar".to_string(), 10_000, 5_000),
        },
        duration_tier: DurationTier::Short,
        target_position: Position::new(10.0, 0.0),
        stamina_cost: 5,
    };
    let duel = JobSpec {
        kind: JobKind::Duel {
            challenger: CombatantSnapshot::new("Kael".to_string(), 134, 5000, 200, 6339, 7500),
            opponent: CombatantSnapshot::new("Brum".to_string(), 120, 4300, 350, 8200, 8200),
        },
        duration_tier: DurationTier::Short,
        target_position: Position::new(10.0, 0.0),
        stamina_cost: 10,
    };

    coordinator.enqueue("kael", &strike).expect("strike queued");
    coordinator.enqueue("kael", &duel).expect("duel queued");

    // One simulated second per iteration; the store is the authority.
    for second in 0..=60 {
        let now = second as f64;
        if second > 0 {
            store.advance_all(1.0);
        }
        if let Some(head) = coordinator.tick("kael", now) {
            println!(
                "t={now:>4.0}s  head={} phase={:?} progress={:.0}%",
                head.kind().label(),
                head.phase(),
                head.phase_progress() * 100.0,
            );
        } else {
            println!("t={now:>4.0}s  queue empty");
        }
    }

    println!("\nreports:");
    for report in reporter.reports() {
        println!("  - {}", report.narrative);
    }
    if let Some(block) = stats.block("kael") {
        println!(
            "\nkael: stamina={} hp={} yang={} experience={}",
            block.stamina, block.hp, block.yang, block.experience
        );
    }
}
