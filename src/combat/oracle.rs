//! Duel resolution between two fighters
//!
//! The land-war engine treats 1v1 combat as an oracle: hand it two fully
//! built fighters, get back a winner and a log. [`StrikeOracle`] is the
//! built-in implementation: combatants trade blows in speed order until one
//! side has nobody left standing.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::combat::fighter::{Combatant, Fighter};
use crate::core::types::{CombatantId, UserId};

/// Hard stop for a single duel; after this many strikes the side with more
/// remaining HP wins
pub const MAX_STRIKES: u32 = 1_000;

/// Damage is multiplied by a roll in this range
pub const DAMAGE_SPREAD: (f64, f64) = (0.93, 1.07);

/// One strike in a duel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackLog {
    /// 1-based strike counter
    pub turn: u32,
    pub attacker_player_id: UserId,
    pub defender_player_id: UserId,
    pub attacker_combatant_id: CombatantId,
    pub defender_combatant_id: CombatantId,
    pub attacker_name: String,
    pub defender_name: String,
    pub damage: u32,
    pub defender_hp_after: u32,
    pub defender_defeated: bool,
}

/// What the oracle reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub winner_id: UserId,
    pub logs: Vec<AttackLog>,
}

/// External 1v1 combat resolution
///
/// Implementations update each combatant's HP in place so the caller can
/// carry it into the next duel.
pub trait CombatOracle: Send + Sync {
    fn run_duel(
        &self,
        left: &mut Fighter,
        right: &mut Fighter,
        max_log_turns: usize,
        rng: &mut dyn RngCore,
    ) -> CombatReport;
}

/// Speed-ordered strike exchange
#[derive(Debug, Default, Clone, Copy)]
pub struct StrikeOracle;

impl StrikeOracle {
    fn damage(attacker: &Combatant, defender: &Combatant, rng: &mut dyn RngCore) -> u32 {
        let base = attacker.attack.saturating_sub(defender.defense / 2).max(1);
        let spread = rng.gen_range(DAMAGE_SPREAD.0..=DAMAGE_SPREAD.1);
        ((base as f64) * spread).round().max(1.0) as u32
    }

    /// Does the left combatant strike first this exchange?
    fn left_first(left: &Combatant, right: &Combatant, rng: &mut dyn RngCore) -> bool {
        match left.speed.cmp(&right.speed) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => rng.gen_bool(0.5),
        }
    }
}

/// Resolve one strike of `attacker` against `defender`
fn strike(
    attacker: &Fighter,
    attacker_idx: usize,
    defender: &mut Fighter,
    defender_idx: usize,
    turn: u32,
    rng: &mut dyn RngCore,
) -> AttackLog {
    let damage = StrikeOracle::damage(
        &attacker.combatants[attacker_idx],
        &defender.combatants[defender_idx],
        rng,
    );
    let defender_player_id = defender.user_id;
    let target = &mut defender.combatants[defender_idx];
    target.take_damage(damage);
    let hitter = &attacker.combatants[attacker_idx];

    AttackLog {
        turn,
        attacker_player_id: attacker.user_id,
        defender_player_id,
        attacker_combatant_id: hitter.id,
        defender_combatant_id: target.id,
        attacker_name: hitter.name.clone(),
        defender_name: target.name.clone(),
        damage,
        defender_hp_after: target.hp_current,
        defender_defeated: !target.alive(),
    }
}

impl CombatOracle for StrikeOracle {
    fn run_duel(
        &self,
        left: &mut Fighter,
        right: &mut Fighter,
        max_log_turns: usize,
        rng: &mut dyn RngCore,
    ) -> CombatReport {
        let mut logs = Vec::new();
        let mut turn = 0u32;

        while turn < MAX_STRIKES {
            let (Some(li), Some(ri)) = (left.first_alive_index(), right.first_alive_index()) else {
                break;
            };

            let left_first = Self::left_first(&left.combatants[li], &right.combatants[ri], rng);

            turn += 1;
            let first = if left_first {
                strike(left, li, right, ri, turn, rng)
            } else {
                strike(right, ri, left, li, turn, rng)
            };
            let defeated = first.defender_defeated;
            if logs.len() < max_log_turns {
                logs.push(first);
            }
            if defeated {
                continue;
            }

            turn += 1;
            let second = if left_first {
                strike(right, ri, left, li, turn, rng)
            } else {
                strike(left, li, right, ri, turn, rng)
            };
            if logs.len() < max_log_turns {
                logs.push(second);
            }
        }

        let winner_id = match (left.has_living(), right.has_living()) {
            (true, false) => left.user_id,
            (false, true) => right.user_id,
            // Strike cap reached (or both empty): more remaining HP wins, left on ties
            _ => {
                if right.remaining_hp() > left.remaining_hp() {
                    right.user_id
                } else {
                    left.user_id
                }
            }
        };

        CombatReport { winner_id, logs }
    }
}
