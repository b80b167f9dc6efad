//! Combatant and monster snapshots
//!
//! Inputs to the duel simulator and the reward tables. Snapshots are
//! captured once (at duel start / job creation) and never mutated; the
//! simulator works on its own copies.
//!
//! Malformed stats are a programming error, not a runtime condition: they
//! are rejected here at construction so the simulator itself has no error
//! paths.

use serde::{Deserialize, Serialize};

/// Frozen combat stats for one side of a duel.
///
/// # Example
/// ```
/// use activity_engine_core_rs::CombatantSnapshot;
///
/// let snap = CombatantSnapshot::new("Kael".to_string(), 134, 5000, 200, 6339, 7500);
/// assert_eq!(snap.level(), 134);
/// assert_eq!(snap.hp_current(), 6339);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Display name used in round logs and reports
    name: String,

    /// Character level; decides turn order (higher acts first)
    level: u32,

    /// Flat attack value
    attack: i64,

    /// Flat defense value; mitigates via defense / (defense + 300)
    defense: i64,

    /// Hit points at the moment the duel was queued
    hp_current: i64,

    /// Maximum hit points
    hp_max: i64,
}

impl CombatantSnapshot {
    /// Capture a combatant's stats.
    ///
    /// # Panics
    /// Panics if attack or defense is negative, or if hp is outside
    /// `0..=hp_max`.
    pub fn new(name: String, level: u32, attack: i64, defense: i64, hp_current: i64, hp_max: i64) -> Self {
        assert!(attack >= 0, "attack must be non-negative");
        assert!(defense >= 0, "defense must be non-negative");
        assert!(hp_max > 0, "hp_max must be positive");
        assert!(
            (0..=hp_max).contains(&hp_current),
            "hp_current must be within 0..=hp_max"
        );
        Self {
            name,
            level,
            attack,
            defense,
            hp_current,
            hp_max,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn attack(&self) -> i64 {
        self.attack
    }

    pub fn defense(&self) -> i64 {
        self.defense
    }

    pub fn hp_current(&self) -> i64 {
        self.hp_current
    }

    pub fn hp_max(&self) -> i64 {
        self.hp_max
    }
}

/// Stats of the monster a timed strike targets.
///
/// `base_experience` and `base_yang` are the full-kill values; the reward
/// calculator scales them by duration tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterStats {
    name: String,
    base_experience: i64,
    base_yang: i64,
}

impl MonsterStats {
    /// # Panics
    /// Panics if either base reward is negative.
    pub fn new(name: String, base_experience: i64, base_yang: i64) -> Self {
        assert!(base_experience >= 0, "base_experience must be non-negative");
        assert!(base_yang >= 0, "base_yang must be non-negative");
        Self {
            name,
            base_experience,
            base_yang,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_experience(&self) -> i64 {
        self.base_experience
    }

    pub fn base_yang(&self) -> i64 {
        self.base_yang
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "hp_current must be within")]
    fn test_hp_above_max_rejected() {
        CombatantSnapshot::new("X".to_string(), 1, 10, 10, 101, 100);
    }

    #[test]
    #[should_panic(expected = "hp_current must be within")]
    fn test_negative_hp_rejected() {
        CombatantSnapshot::new("X".to_string(), 1, 10, 10, -1, 100);
    }
}
