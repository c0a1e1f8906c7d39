//! Round state machine for a battle
//!
//! Each side's signups queue up by `(signup_order, id)`. The next available
//! signup from each side duels; the winner keeps its HP and stays
//! available, the loser is eliminated for the rest of the battle. A round
//! ends once either side has nobody available, and the battle ends once
//! either side has nobody left alive.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Outcome, Rejection, Result};
use crate::core::types::{BattleId, Side};
use crate::war::battle::{Battle, NewRound, Round};
use crate::war::registration::Registration;
use crate::war::resolver::DuelResolver;
use crate::war::signup::{Signup, SignupStatus};
use crate::war::store::{Change, ChangeSet, WarStore};
use crate::war::view::{DuelSummary, RoundSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleVerdict {
    LeftWins,
    RightWins,
    MutualWipe,
}

impl BattleVerdict {
    /// `None` while both sides still have someone alive
    pub fn from_alive(left_alive: u32, right_alive: u32) -> Option<Self> {
        if left_alive > 0 && right_alive > 0 {
            return None;
        }
        Some(match left_alive.cmp(&right_alive) {
            std::cmp::Ordering::Greater => BattleVerdict::LeftWins,
            std::cmp::Ordering::Less => BattleVerdict::RightWins,
            std::cmp::Ordering::Equal => BattleVerdict::MutualWipe,
        })
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            BattleVerdict::LeftWins => Some(Side::Left),
            BattleVerdict::RightWins => Some(Side::Right),
            BattleVerdict::MutualWipe => None,
        }
    }
}

/// One side of a battle as loaded for an advance
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub registration: Registration,
    pub signups: Vec<Signup>,
}

impl Roster {
    fn from_battle(registration: Registration, signups: &[Signup]) -> Self {
        let signups = signups
            .iter()
            .filter(|s| s.registration_id == registration.id)
            .cloned()
            .collect();
        Self { registration, signups }
    }

    fn next_available(&self) -> Option<usize> {
        self.signups
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status.is_available())
            .min_by_key(|(_, s)| (s.signup_order, s.id))
            .map(|(i, _)| i)
    }

    pub fn alive(&self) -> u32 {
        self.signups.iter().filter(|s| !s.is_eliminated()).count() as u32
    }
}

/// Everything an advance will write, plus what happened
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancePlan {
    pub changes: ChangeSet,
    /// Battle as it will be after the commit
    pub battle: Battle,
    pub left: Registration,
    pub right: Registration,
    pub summary: RoundSummary,
    pub verdict: Option<BattleVerdict>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GauntletEngine;

impl GauntletEngine {
    pub fn plan_advance<S: WarStore + ?Sized>(
        &self,
        store: &S,
        battle_id: BattleId,
        resolver: &DuelResolver<'_>,
        rng: &mut dyn RngCore,
        now: DateTime<Utc>,
    ) -> Result<Outcome<AdvancePlan>> {
        let Some(battle) = store.battle(battle_id)? else {
            return Ok(Err(Rejection::BattleNotFound { battle: battle_id }));
        };
        if battle.is_finished() {
            return Ok(Err(Rejection::BattleFinished { battle: battle_id }));
        }
        let Some(round) = store
            .rounds_by_battle(battle_id)?
            .into_iter()
            .find(Round::is_active)
        else {
            return Ok(Err(Rejection::NoActiveRound { battle: battle_id }));
        };

        let left_id = battle.left_registration_id;
        let Some(left_registration) = store.registration(left_id)? else {
            return Ok(Err(Rejection::RegistrationMissing { registration: left_id }));
        };
        let right_id = battle.right_registration_id;
        let Some(right_registration) = store.registration(right_id)? else {
            return Ok(Err(Rejection::RegistrationMissing { registration: right_id }));
        };

        let signups = store.signups_by_battle(battle_id)?;
        let mut left = Roster::from_battle(left_registration, &signups);
        let mut right = Roster::from_battle(right_registration, &signups);

        let mut duels = Vec::new();
        let mut summaries = Vec::new();
        while let (Some(li), Some(ri)) = (left.next_available(), right.next_available()) {
            left.signups[li].set_status(SignupStatus::Engaged)?;
            right.signups[ri].set_status(SignupStatus::Engaged)?;

            let resolved = resolver.resolve(&left.signups[li], &right.signups[ri], rng, now);
            for (roster, index, side) in [(&mut left, li, Side::Left), (&mut right, ri, Side::Right)] {
                let signup = &mut roster.signups[index];
                signup.hp_state = Some(resolved.hp(side).clone());
                signup.set_status(if side == resolved.winner {
                    SignupStatus::Advanced
                } else {
                    SignupStatus::Eliminated
                })?;
            }

            debug!(
                battle = %battle_id,
                round = round.round_no,
                attacker = %left.signups[li].user_id,
                defender = %right.signups[ri].user_id,
                result = ?resolved.duel.result,
                "duel resolved"
            );
            summaries.push(DuelSummary {
                attacker_signup_id: left.signups[li].id,
                defender_signup_id: right.signups[ri].id,
                attacker_user_id: left.signups[li].user_id,
                defender_user_id: right.signups[ri].user_id,
                result: resolved.duel.result,
                reason: resolved.duel.log.reason,
            });
            duels.push(resolved.duel);
        }

        let (left_alive, right_alive) = (left.alive(), right.alive());
        let summary = RoundSummary {
            round_no: round.round_no,
            left_alive,
            right_alive,
            duel_count: duels.len(),
            duels: summaries,
        };
        debug!(
            battle = %battle_id,
            round = round.round_no,
            left_alive,
            right_alive,
            duels = duels.len(),
            "round closed"
        );

        let mut changes = ChangeSet::new();
        if !duels.is_empty() {
            changes.push(Change::AppendDuels {
                round_id: round.id,
                duels,
            });
        }
        changes.push(Change::SaveRound(round.clone().closed(left_alive, right_alive, now)));

        let verdict = BattleVerdict::from_alive(left_alive, right_alive);
        let battle = battle.started(now);
        let battle = match verdict {
            Some(_) => battle.finished(now)?,
            None => {
                for roster in [&mut left, &mut right] {
                    for signup in roster.signups.iter_mut() {
                        if signup.status == SignupStatus::Advanced {
                            signup.set_status(SignupStatus::Ready)?;
                        }
                    }
                }
                changes.push(Change::CreateRound {
                    battle_id,
                    round: NewRound {
                        round_no: round.round_no + 1,
                        left_alive,
                        right_alive,
                        started_at: now,
                    },
                });
                battle.at_round(round.round_no + 1)
            }
        };
        changes.push(Change::SaveSignups(
            left.signups.into_iter().chain(right.signups).collect(),
        ));
        changes.push(Change::SaveBattle(battle.clone()));

        Ok(Ok(AdvancePlan {
            changes,
            battle,
            left: left.registration,
            right: right.registration,
            summary,
            verdict,
        }))
    }
}
