//! Reward tables
//!
//! Maps completed jobs to experience/yang deltas. Timed strikes pay a
//! fixed fraction of the monster's full values keyed by duration tier;
//! duels pay level-scaled amounts on victory only.

use crate::combat::DuelOutcome;
use crate::models::combatant::MonsterStats;
use crate::models::job::DurationTier;
use serde::{Deserialize, Serialize};

/// Experience and currency granted by a completed job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub experience: i64,
    pub yang: i64,
}

impl Rewards {
    pub const NONE: Rewards = Rewards {
        experience: 0,
        yang: 0,
    };
}

/// Stateless reward math.
pub struct RewardCalculator;

impl RewardCalculator {
    /// Rewards for a completed timed strike.
    ///
    /// The tier fraction (0.65% / 23.5% / 100%) is applied by simple
    /// multiplication and rounded to the nearest integer.
    ///
    /// # Example
    /// ```
    /// use activity_engine_core_rs::{DurationTier, MonsterStats, RewardCalculator};
    ///
    /// let boar = MonsterStats::new("Wild Boar".to_string(), 10_000, 5_000);
    /// let rewards = RewardCalculator::timed_strike(DurationTier::Medium, &boar);
    /// assert_eq!(rewards.experience, 2350);
    /// assert_eq!(rewards.yang, 1175);
    /// ```
    pub fn timed_strike(tier: DurationTier, monster: &MonsterStats) -> Rewards {
        let fraction = tier.reward_fraction();
        Rewards {
            experience: (monster.base_experience() as f64 * fraction).round() as i64,
            yang: (monster.base_yang() as f64 * fraction).round() as i64,
        }
    }

    /// Level-difference multiplier for duel rewards, floored at 0.5.
    ///
    /// Beating someone above your level pays more; farming far below
    /// your level bottoms out at half reward.
    pub fn level_multiplier(challenger_level: u32, opponent_level: u32) -> f64 {
        let diff = opponent_level as f64 - challenger_level as f64;
        (1.0 + diff * 0.02).max(0.5)
    }

    /// Rewards for a resolved duel. Victory only; defeat and draw grant
    /// nothing (the hp loss from the simulation still applies).
    pub fn duel(outcome: DuelOutcome, challenger_level: u32, opponent_level: u32) -> Rewards {
        if outcome != DuelOutcome::Victory {
            return Rewards::NONE;
        }
        let mult = Self::level_multiplier(challenger_level, opponent_level);
        Rewards {
            experience: (opponent_level as f64 * 50.0 * mult).round() as i64,
            yang: (opponent_level as f64 * 100.0 * mult).round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_floor() {
        // 40 levels below: 1 + (-40 * 0.02) = 0.2, floored at 0.5.
        assert_eq!(RewardCalculator::level_multiplier(100, 60), 0.5);
    }

    #[test]
    fn test_defeat_and_draw_pay_nothing() {
        assert_eq!(RewardCalculator::duel(DuelOutcome::Defeat, 10, 10), Rewards::NONE);
        assert_eq!(RewardCalculator::duel(DuelOutcome::Draw, 10, 10), Rewards::NONE);
    }

    #[test]
    fn test_short_tier_fraction() {
        let monster = MonsterStats::new("Rat".to_string(), 10_000, 5_000);
        let rewards = RewardCalculator::timed_strike(DurationTier::Short, &monster);
        assert_eq!(rewards.experience, 65); // round(10000 * 0.0065)
        assert_eq!(rewards.yang, 33); // round(5000 * 0.0065) = round(32.5)
    }
}
