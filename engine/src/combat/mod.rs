//! Duel combat simulator
//!
//! Deterministic round-based resolution between two frozen combatant
//! snapshots. No randomness anywhere: identical inputs reproduce the same
//! rounds, log, and outcome bit-for-bit, which keeps results consistent
//! with historical replays.
//!
//! # Contract (exact)
//!
//! - Turn order is decided once at start: the challenger acts first iff
//!   `challenger.level >= opponent.level`, for every round.
//! - Per attack: `damage = round(attack * (1 - defense / (defense + 300)))`,
//!   defender hp floored at 0.
//! - Hp hitting 0 concludes the duel immediately; the round's second
//!   attack does not occur.
//! - At most [`MAX_ROUNDS`] rounds; neither side down means `Draw`.

pub mod rewards;

use crate::models::combatant::CombatantSnapshot;
use rewards::Rewards;
use serde::{Deserialize, Serialize};

/// Hard cap on rounds before a duel is called a draw.
pub const MAX_ROUNDS: u32 = 30;

/// Defense soft-cap constant in the mitigation denominator.
const MITIGATION_SCALE: f64 = 300.0;

/// Duel outcome from the challenger's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelOutcome {
    Victory,
    Defeat,
    Draw,
}

impl DuelOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DuelOutcome::Victory => "victory",
            DuelOutcome::Defeat => "defeat",
            DuelOutcome::Draw => "draw",
        }
    }
}

/// Simulator lifecycle. The machine only moves forward:
/// `NotStarted → RoundInProgress → Concluded`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SimulatorState {
    NotStarted,
    RoundInProgress { round: u32 },
    Concluded { outcome: DuelOutcome },
}

/// One damage event in the round log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundEvent {
    /// 1-based round number
    pub round: u32,
    pub attacker: String,
    pub defender: String,
    pub damage: i64,
    /// Defender's hp immediately after the hit
    pub defender_hp_after: i64,
}

/// Full result of a resolved duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub outcome: DuelOutcome,
    pub rounds_played: u32,
    pub final_challenger_hp: i64,
    pub final_opponent_hp: i64,
    /// Total damage dealt by the challenger
    pub damage_dealt_total: i64,
    /// Ordered log of every damage event
    pub log: Vec<RoundEvent>,
    /// Filled in by the reward calculator after resolution
    pub rewards: Rewards,
}

/// Damage one attack deals through the defender's mitigation.
///
/// # Example
/// ```
/// use activity_engine_core_rs::combat::effective_damage;
///
/// // round(5000 * (1 - 350/650)) = round(2307.69...) = 2308
/// assert_eq!(effective_damage(5000, 350), 2308);
/// ```
pub fn effective_damage(attack: i64, defense: i64) -> i64 {
    let defense = defense as f64;
    let mitigation = 1.0 - defense / (defense + MITIGATION_SCALE);
    (attack as f64 * mitigation).round() as i64
}

/// Round-based duel resolution over two frozen snapshots.
///
/// The simulator owns copies of both snapshots; the originals are never
/// mutated.
///
/// # Example
/// ```
/// use activity_engine_core_rs::{CombatSimulator, CombatantSnapshot, DuelOutcome};
///
/// let challenger = CombatantSnapshot::new("Kael".to_string(), 134, 5000, 200, 6339, 7500);
/// let opponent = CombatantSnapshot::new("Brum".to_string(), 120, 4300, 350, 8200, 8200);
/// let result = CombatSimulator::new(challenger, opponent).run();
/// assert_eq!(result.log[0].damage, 2308); // 134 >= 120, challenger strikes first
/// ```
#[derive(Debug, Clone)]
pub struct CombatSimulator {
    challenger: CombatantSnapshot,
    opponent: CombatantSnapshot,
    state: SimulatorState,
    challenger_hp: i64,
    opponent_hp: i64,
    challenger_first: bool,
    log: Vec<RoundEvent>,
}

impl CombatSimulator {
    pub fn new(challenger: CombatantSnapshot, opponent: CombatantSnapshot) -> Self {
        // Static for the whole duel, decided once here.
        let challenger_first = challenger.level() >= opponent.level();
        let challenger_hp = challenger.hp_current();
        let opponent_hp = opponent.hp_current();
        Self {
            challenger,
            opponent,
            state: SimulatorState::NotStarted,
            challenger_hp,
            opponent_hp,
            challenger_first,
            log: Vec::new(),
        }
    }

    /// Whether the challenger takes the first strike of every round.
    pub fn challenger_first(&self) -> bool {
        self.challenger_first
    }

    /// Resolve the duel to completion.
    pub fn run(mut self) -> CombatResult {
        let mut rounds_played = 0;
        for round in 1..=MAX_ROUNDS {
            self.state = SimulatorState::RoundInProgress { round };
            rounds_played = round;
            if let Some(outcome) = self.play_round(round) {
                self.state = SimulatorState::Concluded { outcome };
                break;
            }
        }

        let outcome = match self.state {
            SimulatorState::Concluded { outcome } => outcome,
            _ => {
                self.state = SimulatorState::Concluded {
                    outcome: DuelOutcome::Draw,
                };
                DuelOutcome::Draw
            }
        };

        let damage_dealt_total = self
            .log
            .iter()
            .filter(|e| e.attacker == self.challenger.name())
            .map(|e| e.damage)
            .sum();

        CombatResult {
            outcome,
            rounds_played,
            final_challenger_hp: self.challenger_hp,
            final_opponent_hp: self.opponent_hp,
            damage_dealt_total,
            log: self.log,
            rewards: Rewards::default(),
        }
    }

    /// Play one round. Returns the outcome when a combatant drops.
    fn play_round(&mut self, round: u32) -> Option<DuelOutcome> {
        let order = if self.challenger_first {
            [true, false]
        } else {
            [false, true]
        };
        for challenger_attacks in order {
            if let Some(outcome) = self.strike(round, challenger_attacks) {
                return Some(outcome);
            }
        }
        None
    }

    /// One attack. Concludes the duel immediately when the defender drops,
    /// skipping the round's remaining strike.
    fn strike(&mut self, round: u32, challenger_attacks: bool) -> Option<DuelOutcome> {
        let (attacker, defender) = if challenger_attacks {
            (&self.challenger, &self.opponent)
        } else {
            (&self.opponent, &self.challenger)
        };
        let damage = effective_damage(attacker.attack(), defender.defense());

        let defender_hp = if challenger_attacks {
            &mut self.opponent_hp
        } else {
            &mut self.challenger_hp
        };
        *defender_hp = (*defender_hp - damage).max(0);
        let hp_after = *defender_hp;

        self.log.push(RoundEvent {
            round,
            attacker: attacker.name().to_string(),
            defender: defender.name().to_string(),
            damage,
            defender_hp_after: hp_after,
        });

        if hp_after == 0 {
            Some(if challenger_attacks {
                DuelOutcome::Victory
            } else {
                DuelOutcome::Defeat
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(name: &str, level: u32, attack: i64, defense: i64, hp: i64) -> CombatantSnapshot {
        CombatantSnapshot::new(name.to_string(), level, attack, defense, hp, hp)
    }

    #[test]
    fn test_lower_level_challenger_strikes_second() {
        let sim = CombatSimulator::new(snap("a", 10, 100, 0, 500), snap("b", 20, 100, 0, 500));
        assert!(!sim.challenger_first());
    }

    #[test]
    fn test_equal_levels_challenger_strikes_first() {
        let sim = CombatSimulator::new(snap("a", 10, 100, 0, 500), snap("b", 10, 100, 0, 500));
        assert!(sim.challenger_first());
    }

    #[test]
    fn test_second_strike_skipped_when_defender_drops() {
        // Challenger one-shots the opponent; opponent never swings.
        let result =
            CombatSimulator::new(snap("a", 10, 1000, 0, 500), snap("b", 5, 1000, 0, 500)).run();
        assert_eq!(result.outcome, DuelOutcome::Victory);
        assert_eq!(result.rounds_played, 1);
        assert_eq!(result.log.len(), 1);
        assert_eq!(result.final_challenger_hp, 500);
    }

    #[test]
    fn test_zero_damage_duel_draws_at_round_cap() {
        // Zero attack on both sides: nobody ever drops.
        let result = CombatSimulator::new(snap("a", 10, 0, 0, 500), snap("b", 10, 0, 0, 500)).run();
        assert_eq!(result.outcome, DuelOutcome::Draw);
        assert_eq!(result.rounds_played, MAX_ROUNDS);
        assert_eq!(result.log.len(), (MAX_ROUNDS * 2) as usize);
    }
}
