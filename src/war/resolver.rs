//! One gauntlet duel: build both fighters, fight, capture HP

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};

use crate::combat::adapter::CombatConverter;
use crate::combat::fighter::Fighter;
use crate::combat::gateway::PlayerGateway;
use crate::combat::oracle::CombatOracle;
use crate::core::types::Side;
use crate::war::duel::{DuelLog, DuelReason, DuelResult, NewDuel};
use crate::war::signup::{HpSnapshot, Signup};

/// A fought duel, not yet applied to the signups
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDuel {
    pub winner: Side,
    pub duel: NewDuel,
    pub left_hp: HpSnapshot,
    pub right_hp: HpSnapshot,
}

impl ResolvedDuel {
    pub fn hp(&self, side: Side) -> &HpSnapshot {
        match side {
            Side::Left => &self.left_hp,
            Side::Right => &self.right_hp,
        }
    }
}

pub struct DuelResolver<'a> {
    players: &'a dyn PlayerGateway,
    converter: &'a dyn CombatConverter,
    oracle: &'a dyn CombatOracle,
    max_log_turns: usize,
}

impl<'a> DuelResolver<'a> {
    pub fn new(
        players: &'a dyn PlayerGateway,
        converter: &'a dyn CombatConverter,
        oracle: &'a dyn CombatOracle,
        max_log_turns: usize,
    ) -> Self {
        Self {
            players,
            converter,
            oracle,
            max_log_turns,
        }
    }

    /// Build the fighter a signup sends in, with its carried-over HP
    pub fn fighter_for(&self, signup: &Signup) -> Fighter {
        let Some(profile) = self.players.player(signup.user_id) else {
            return Fighter::empty(signup.user_id);
        };
        let team = self.players.active_team(signup.user_id);
        let mut fighter = Fighter::new(
            signup.user_id,
            profile.level,
            profile.display_name(),
            self.converter.to_combatants(&team),
        );
        if let Some(hp) = &signup.hp_state {
            hp.apply_to(&mut fighter);
        }
        fighter
    }

    /// Left is the attacker, right the defender
    pub fn resolve(
        &self,
        left: &Signup,
        right: &Signup,
        rng: &mut dyn RngCore,
        now: DateTime<Utc>,
    ) -> ResolvedDuel {
        let mut left_fighter = self.fighter_for(left);
        let mut right_fighter = self.fighter_for(right);

        let (winner, log) = match (left_fighter.has_living(), right_fighter.has_living()) {
            (false, false) => {
                let winner = if rng.gen_bool(0.5) { Side::Left } else { Side::Right };
                (winner, Self::forfeit(DuelReason::BothSidesEmpty))
            }
            (true, false) => (Side::Left, Self::forfeit(DuelReason::OpponentEmpty)),
            (false, true) => (Side::Right, Self::forfeit(DuelReason::OpponentEmpty)),
            (true, true) => {
                let report =
                    self.oracle
                        .run_duel(&mut left_fighter, &mut right_fighter, self.max_log_turns, rng);
                let winner = if report.winner_id == left_fighter.user_id {
                    Side::Left
                } else {
                    Side::Right
                };
                (
                    winner,
                    DuelLog {
                        logs: report.logs,
                        reason: None,
                    },
                )
            }
        };

        let result = match winner {
            Side::Left => DuelResult::AttackerWon,
            Side::Right => DuelResult::DefenderWon,
        };

        ResolvedDuel {
            winner,
            duel: NewDuel {
                attacker_signup_id: left.id,
                defender_signup_id: right.id,
                result,
                log,
                created_at: now,
            },
            left_hp: HpSnapshot::capture(&left_fighter),
            right_hp: HpSnapshot::capture(&right_fighter),
        }
    }

    fn forfeit(reason: DuelReason) -> DuelLog {
        DuelLog {
            logs: Vec::new(),
            reason: Some(reason),
        }
    }
}
