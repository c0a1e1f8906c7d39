//! Randomized bracket pairing with a fairness-weighted bye
//!
//! Pairing is planned against store snapshots and returned as a
//! [`ChangeSet`]; nothing is written here.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Outcome, Rejection, Result, WarError};
use crate::core::types::LandId;
use crate::war::battle::{NewBattle, NewRound};
use crate::war::registration::{Registration, RegistrationStatus};
use crate::war::roster::RosterBuilder;
use crate::war::store::{Change, ChangeSet, WarStore};
use crate::war::view::{ByeAllocation, ByeEntry};

/// One planned battle
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub left: Registration,
    pub right: Registration,
    pub left_signups: usize,
    pub right_signups: usize,
}

/// Everything a pairing call will write, plus what it decided
#[derive(Debug, Clone, PartialEq)]
pub struct PairingPlan {
    pub changes: ChangeSet,
    /// In the same order as the `CreateBattle` changes
    pub matchups: Vec<Matchup>,
    pub bye: Option<ByeAllocation>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PairingScheduler {
    roster: RosterBuilder,
}

impl PairingScheduler {
    pub fn new(roster: RosterBuilder) -> Self {
        Self { roster }
    }

    pub fn plan<S: WarStore + ?Sized>(
        &self,
        store: &S,
        land_id: LandId,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Outcome<PairingPlan>> {
        self.plan_pool(store, land_id, seed, now, false)
    }

    /// Like [`plan`](Self::plan), but victors of finished battles rejoin the
    /// pool as registered
    ///
    /// A victor's status only changes as part of the returned plan, so a
    /// rejected pairing leaves every victor in place.
    pub fn plan_with_victors<S: WarStore + ?Sized>(
        &self,
        store: &S,
        land_id: LandId,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Outcome<PairingPlan>> {
        self.plan_pool(store, land_id, seed, now, true)
    }

    fn plan_pool<S: WarStore + ?Sized>(
        &self,
        store: &S,
        land_id: LandId,
        seed: u64,
        now: DateTime<Utc>,
        with_victors: bool,
    ) -> Result<Outcome<PairingPlan>> {
        let all = store.registrations_by_land(land_id, None)?;
        let (waiting, ready): (Vec<_>, Vec<_>) = all
            .iter()
            .filter(|r| {
                r.status.is_pairable() || (with_victors && r.status == RegistrationStatus::Victor)
            })
            .map(|r| match r.status {
                RegistrationStatus::Victor => r.clone().with_status(RegistrationStatus::Registered),
                _ => r.clone(),
            })
            .partition(|r| r.bye_waiting_round.is_some());

        if waiting.len() + ready.len() < 2 {
            return Ok(Err(Rejection::InsufficientRegistrations {
                bye_registrations: ByeEntry::waiting(&all),
            }));
        }

        let mut pool: Vec<Registration> = ready
            .into_iter()
            .chain(waiting.into_iter().map(Registration::reactivated))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        pool.shuffle(&mut rng);

        let mut changes = ChangeSet::new();
        let bye = if pool.len() % 2 == 1 {
            let (index, round) = Self::pick_bye(&pool, &all, &mut rng);
            let holder = pool.remove(index).with_bye(round);
            let allocation = ByeAllocation {
                registration_id: holder.id,
                alliance_id: holder.alliance_id,
                bye_round: round,
            };
            changes.push(Change::SaveRegistration(holder));
            Some(allocation)
        } else {
            None
        };

        let mut matchups = Vec::with_capacity(pool.len() / 2);
        for pair in pool.chunks_exact(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let left_roster = self.roster.build(store, left, now)?;
            let right_roster = self.roster.build(store, right, now)?;
            for (registration, roster) in [(left, &left_roster), (right, &right_roster)] {
                if roster.is_empty() {
                    return Err(WarError::EmptyRoster {
                        alliance: registration.alliance_id,
                        army: registration.army.clone(),
                    });
                }
            }

            matchups.push(Matchup {
                left: left.clone(),
                right: right.clone(),
                left_signups: left_roster.len(),
                right_signups: right_roster.len(),
            });
            changes.push(Change::CreateBattle {
                battle: NewBattle {
                    land_id,
                    left_registration_id: left.id,
                    right_registration_id: right.id,
                },
                first_round: NewRound {
                    round_no: 1,
                    left_alive: left_roster.len() as u32,
                    right_alive: right_roster.len() as u32,
                    started_at: now,
                },
                signups: left_roster.into_iter().chain(right_roster).collect(),
            });
            changes.push(Change::SaveRegistration(
                left.clone().with_status(RegistrationStatus::InBattle),
            ));
            changes.push(Change::SaveRegistration(
                right.clone().with_status(RegistrationStatus::InBattle),
            ));
        }

        Ok(Ok(PairingPlan {
            changes,
            matchups,
            bye,
        }))
    }

    /// Choose who sits out, returning their pool index and bye number
    ///
    /// Prefers registrations whose last bye is older than the newest bye
    /// handed out on this land, counting registrations outside the pool.
    fn pick_bye(pool: &[Registration], all: &[Registration], rng: &mut ChaCha8Rng) -> (usize, u32) {
        let max_last = all.iter().map(Registration::last_bye).max().unwrap_or(0);
        let mut candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, r)| r.last_bye() < max_last)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            candidates = (0..pool.len()).collect();
        }
        let index = candidates[rng.gen_range(0..candidates.len())];
        (index, max_last + 1)
    }
}
