//! Property-based invariant checks.

use activity_engine_core_rs::{
    effective_damage, progress_fraction, travel_duration_secs, CombatSimulator,
    CombatantSnapshot, DuelOutcome, DurationTier, Job, JobKind, JobQueue, JobSpec,
    MonsterStats, Position, PredictionReconciler, RewardCalculator, MAX_ROUNDS,
};
use proptest::prelude::*;

fn combatant_strategy() -> impl Strategy<Value = CombatantSnapshot> {
    (1u32..=200, 1i64..=20_000, 0i64..=5_000, 1i64..=50_000).prop_map(
        |(level, attack, defense, hp)| {
            CombatantSnapshot::new("fighter".to_string(), level, attack, defense, hp, hp)
        },
    )
}

proptest! {
    #[test]
    fn prop_travel_duration_non_negative_and_monotonic(
        a in 0.0f64..10_000.0,
        b in 0.0f64..10_000.0,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let near_secs = travel_duration_secs(near);
        let far_secs = travel_duration_secs(far);
        prop_assert!(near_secs >= 0.0);
        prop_assert!(near_secs <= far_secs);
    }

    #[test]
    fn prop_progress_fraction_bounded(
        original in 0.0f64..100_000.0,
        remaining in 0.0f64..200_000.0,
    ) {
        let p = progress_fraction(original, remaining);
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn prop_damage_never_exceeds_attack(
        attack in 0i64..=1_000_000,
        defense in 0i64..=1_000_000,
    ) {
        let damage = effective_damage(attack, defense);
        prop_assert!(damage >= 0);
        prop_assert!(damage <= attack);
    }

    #[test]
    fn prop_duel_deterministic_and_bounded(
        challenger in combatant_strategy(),
        opponent in combatant_strategy(),
    ) {
        let first = CombatSimulator::new(challenger.clone(), opponent.clone()).run();
        let again = CombatSimulator::new(challenger.clone(), opponent.clone()).run();
        prop_assert_eq!(&first, &again);

        prop_assert!(first.rounds_played <= MAX_ROUNDS);
        prop_assert!(first.final_challenger_hp >= 0);
        prop_assert!(first.final_opponent_hp >= 0);
        match first.outcome {
            DuelOutcome::Victory => prop_assert_eq!(first.final_opponent_hp, 0),
            DuelOutcome::Defeat => prop_assert_eq!(first.final_challenger_hp, 0),
            DuelOutcome::Draw => {
                prop_assert!(first.final_challenger_hp > 0);
                prop_assert!(first.final_opponent_hp > 0);
                prop_assert_eq!(first.rounds_played, MAX_ROUNDS);
            }
        }
    }

    #[test]
    fn prop_strike_rewards_scale_with_tier(
        base_exp in 0i64..=10_000_000,
        base_yang in 0i64..=10_000_000,
    ) {
        let monster = MonsterStats::new("target".to_string(), base_exp, base_yang);
        let short = RewardCalculator::timed_strike(DurationTier::Short, &monster);
        let medium = RewardCalculator::timed_strike(DurationTier::Medium, &monster);
        let long = RewardCalculator::timed_strike(DurationTier::Long, &monster);

        prop_assert!(short.experience >= 0);
        prop_assert!(short.experience <= medium.experience);
        prop_assert!(medium.experience <= long.experience);
        prop_assert_eq!(long.experience, base_exp);
        prop_assert_eq!(long.yang, base_yang);
    }

    #[test]
    fn prop_duel_multiplier_floored(
        challenger_level in 1u32..=200,
        opponent_level in 1u32..=200,
    ) {
        let mult = RewardCalculator::level_multiplier(challenger_level, opponent_level);
        prop_assert!(mult >= 0.5);
        let rewards = RewardCalculator::duel(DuelOutcome::Victory, challenger_level, opponent_level);
        prop_assert!(rewards.experience >= 0);
        prop_assert!(rewards.yang >= 0);
    }

    #[test]
    fn prop_remaining_time_monotonic_under_random_ticks(
        travel in 0.0f64..120.0,
        steps in proptest::collection::vec(0.0f64..5.0, 1..60),
    ) {
        let spec = JobSpec {
            kind: JobKind::Sleep,
            duration_tier: DurationTier::Short,
            target_position: Position::new(10.0, 0.0),
            stamina_cost: 1,
        };
        let mut queue = JobQueue::new(3);
        queue
            .push(Job::from_spec(&spec, travel).with_id("j0".to_string()))
            .unwrap();
        let reconciler = PredictionReconciler::new();

        let mut now = 0.0;
        let mut prev_total = f64::INFINITY;
        for dt in steps {
            now += dt;
            reconciler.advance(&mut queue, now);
            let head = queue.head().unwrap();
            prop_assert!(head.travel_remaining() >= 0.0);
            prop_assert!(head.execute_remaining() >= 0.0);
            let total = head.travel_remaining() + head.execute_remaining();
            prop_assert!(total <= prev_total);
            let p = head.phase_progress();
            prop_assert!((0.0..=1.0).contains(&p));
            prev_total = total;
        }
    }
}
