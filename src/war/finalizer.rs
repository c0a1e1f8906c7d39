//! Battle settlement and land occupation

use chrono::{DateTime, Utc};

use crate::core::calendar::WarWindow;
use crate::core::config::WarConfig;
use crate::core::error::Result;
use crate::core::types::{AllianceId, BattleId, LandId};
use crate::war::gauntlet::BattleVerdict;
use crate::war::registration::{Registration, RegistrationStatus};
use crate::war::store::{Change, ChangeSet, LandOccupation, WarRecord, WarResult, WarStore};

/// Where a land stands once a battle on it is over
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// More than one contender left, or none at all
    Contested,
    /// The sole survivor already holds the land under the same registration
    AlreadyHeld(AllianceId),
    /// Hand the land to its sole survivor
    Occupy {
        alliance_id: AllianceId,
        changes: ChangeSet,
    },
}

impl Settlement {
    pub fn holder(&self) -> Option<AllianceId> {
        match self {
            Settlement::Contested => None,
            Settlement::AlreadyHeld(alliance_id) | Settlement::Occupy { alliance_id, .. } => Some(*alliance_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Finalizer {
    config: WarConfig,
}

impl Finalizer {
    pub fn new(config: WarConfig) -> Self {
        Self { config }
    }

    /// Registration statuses, war history and honor for a finished battle
    ///
    /// Returns the two registrations as they will be saved.
    pub fn conclude(
        &self,
        battle_id: BattleId,
        left: &Registration,
        right: &Registration,
        verdict: BattleVerdict,
        now: DateTime<Utc>,
    ) -> (ChangeSet, [Registration; 2]) {
        let mut changes = ChangeSet::new();
        let (left_status, right_status) = match verdict {
            BattleVerdict::LeftWins => (RegistrationStatus::Victor, RegistrationStatus::Eliminated),
            BattleVerdict::RightWins => (RegistrationStatus::Eliminated, RegistrationStatus::Victor),
            BattleVerdict::MutualWipe => (RegistrationStatus::Eliminated, RegistrationStatus::Eliminated),
        };
        let left = left.clone().with_status(left_status);
        let right = right.clone().with_status(right_status);
        changes.push(Change::SaveRegistration(left.clone()));
        changes.push(Change::SaveRegistration(right.clone()));

        let pairing = match verdict {
            BattleVerdict::LeftWins => Some((&left, &right)),
            BattleVerdict::RightWins => Some((&right, &left)),
            BattleVerdict::MutualWipe => None,
        };
        if let Some((winner, loser)) = pairing {
            let window = WarWindow::at(now);
            let record = |alliance: &Registration, opponent: &Registration, result, honor_gained| {
                Change::RecordWar(WarRecord {
                    alliance_id: alliance.alliance_id,
                    opponent_alliance_id: opponent.alliance_id,
                    land_id: winner.land_id,
                    army: winner.army.clone(),
                    war_phase: window.phase,
                    war_date: window.date,
                    result,
                    honor_gained,
                    battle_id,
                })
            };
            changes.push(record(winner, loser, WarResult::Win, self.config.honor_per_win));
            changes.push(record(loser, winner, WarResult::Lose, 0));
            changes.push(Change::GrantHonor {
                alliance_id: winner.alliance_id,
                amount: u64::from(self.config.honor_per_win),
            });
        }

        (changes, [left, right])
    }

    /// Occupy the land if exactly one contender is left on it
    ///
    /// `pending` holds registrations that are about to be saved and take
    /// precedence over the stored copies.
    pub fn settle<S: WarStore + ?Sized>(
        &self,
        store: &S,
        land_id: LandId,
        pending: &[Registration],
        now: DateTime<Utc>,
    ) -> Result<Settlement> {
        let registrations: Vec<Registration> = store
            .registrations_by_land(land_id, None)?
            .into_iter()
            .map(|stored| {
                pending
                    .iter()
                    .find(|p| p.id == stored.id)
                    .cloned()
                    .unwrap_or(stored)
            })
            .collect();

        let mut contenders = registrations.iter().filter(|r| r.status.is_contender());
        let (Some(survivor), None) = (contenders.next(), contenders.next()) else {
            return Ok(Settlement::Contested);
        };

        if let Some(held) = store.land_occupation(land_id)? {
            if held.registration_id == survivor.id && held.alliance_id == survivor.alliance_id {
                return Ok(Settlement::AlreadyHeld(survivor.alliance_id));
            }
        }

        let window = WarWindow::at(now);
        let occupation = LandOccupation {
            land_id,
            alliance_id: survivor.alliance_id,
            registration_id: survivor.id,
            war_phase: window.phase,
            war_date: window.date,
        };

        let mut changes = ChangeSet::new();
        changes.push(Change::AddSeasonScore {
            alliance_id: survivor.alliance_id,
            season_key: window.season_key,
            delta: i64::from(self.config.season_score_per_occupation),
        });
        changes.push(Change::OccupyLand(occupation));

        Ok(Settlement::Occupy {
            alliance_id: survivor.alliance_id,
            changes,
        })
    }
}
