//! In-memory [`WarStore`]
//!
//! Commits clone the tables, apply the change set to the clone, and swap it
//! in only if every change applied.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;

use crate::core::types::{AllianceId, BattleId, DuelId, LandId, RegistrationId, RoundId, SignupId, UserId};
use crate::war::battle::{Battle, Round};
use crate::war::duel::Duel;
use crate::war::registration::{NewRegistration, Registration, RegistrationStatus};
use crate::war::signup::Signup;
use crate::war::store::{
    ArmyAssignment, Change, ChangeSet, CheckinKey, CommitReceipt, Honor, LandOccupation, StoreError,
    StoreResult, WarRecord, WarStore,
};

#[derive(Debug, Clone, Default)]
struct IdCounters {
    registration: u64,
    battle: u64,
    round: u64,
    signup: u64,
    duel: u64,
}

fn bump(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default)]
struct Tables {
    ids: IdCounters,
    registrations: BTreeMap<RegistrationId, Registration>,
    battles: BTreeMap<BattleId, Battle>,
    rounds: BTreeMap<RoundId, Round>,
    signups: BTreeMap<SignupId, Signup>,
    duels: BTreeMap<DuelId, Duel>,
    assignments: Vec<ArmyAssignment>,
    checkins: AHashSet<CheckinKey>,
    occupations: AHashMap<LandId, LandOccupation>,
    honor: AHashMap<AllianceId, Honor>,
    season_scores: AHashMap<(AllianceId, String), i64>,
    war_records: Vec<WarRecord>,
}

fn missing(kind: &'static str, id: u64) -> StoreError {
    StoreError::MissingRecord { kind, id }
}

impl Tables {
    fn apply(&mut self, change: Change, receipt: &mut CommitReceipt) -> StoreResult<()> {
        match change {
            Change::SaveRegistration(registration) => {
                let slot = self
                    .registrations
                    .get_mut(&registration.id)
                    .ok_or_else(|| missing("registration", registration.id.0))?;
                *slot = registration;
            }
            Change::CreateBattle {
                battle,
                first_round,
                signups,
            } => {
                let battle_id = BattleId(bump(&mut self.ids.battle));
                self.battles.insert(battle_id, battle.into_battle(battle_id));
                receipt.battles.push(battle_id);

                let round_id = RoundId(bump(&mut self.ids.round));
                self.rounds.insert(round_id, first_round.into_round(round_id, battle_id));
                receipt.rounds.push(round_id);

                for signup in signups {
                    let signup_id = SignupId(bump(&mut self.ids.signup));
                    self.signups.insert(signup_id, signup.into_signup(signup_id, battle_id));
                    receipt.signups.push(signup_id);
                }
            }
            Change::SaveBattle(battle) => {
                let slot = self
                    .battles
                    .get_mut(&battle.id)
                    .ok_or_else(|| missing("battle", battle.id.0))?;
                *slot = battle;
            }
            Change::SaveRound(round) => {
                let slot = self
                    .rounds
                    .get_mut(&round.id)
                    .ok_or_else(|| missing("round", round.id.0))?;
                *slot = round;
            }
            Change::CreateRound { battle_id, round } => {
                if !self.battles.contains_key(&battle_id) {
                    return Err(missing("battle", battle_id.0));
                }
                let round_id = RoundId(bump(&mut self.ids.round));
                self.rounds.insert(round_id, round.into_round(round_id, battle_id));
                receipt.rounds.push(round_id);
            }
            Change::SaveSignups(signups) => {
                for signup in signups {
                    let slot = self
                        .signups
                        .get_mut(&signup.id)
                        .ok_or_else(|| missing("signup", signup.id.0))?;
                    *slot = signup;
                }
            }
            Change::AppendDuels { round_id, duels } => {
                if !self.rounds.contains_key(&round_id) {
                    return Err(missing("round", round_id.0));
                }
                for duel in duels {
                    let duel_id = DuelId(bump(&mut self.ids.duel));
                    self.duels.insert(duel_id, duel.into_duel(duel_id, round_id));
                    receipt.duels.push(duel_id);
                }
            }
            Change::RecordWar(record) => self.war_records.push(record),
            Change::GrantHonor { alliance_id, amount } => {
                let honor = self.honor.entry(alliance_id).or_default();
                honor.current += amount;
                honor.lifetime += amount;
            }
            Change::AddSeasonScore {
                alliance_id,
                season_key,
                delta,
            } => {
                *self.season_scores.entry((alliance_id, season_key)).or_insert(0) += delta;
            }
            Change::OccupyLand(occupation) => {
                self.occupations.insert(occupation.land_id, occupation);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWarStore {
    tables: RwLock<Tables>,
}

impl InMemoryWarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, refusing a second live one for the same alliance and land
    pub fn register(&self, registration: NewRegistration) -> StoreResult<RegistrationId> {
        let mut tables = self.tables.write();
        let duplicate = tables.registrations.values().any(|r| {
            r.alliance_id == registration.alliance_id
                && r.land_id == registration.land_id
                && r.status != RegistrationStatus::Cancelled
        });
        if duplicate && registration.status != RegistrationStatus::Cancelled {
            return Err(StoreError::Conflict(format!(
                "alliance {} is already registered for land {}",
                registration.alliance_id, registration.land_id
            )));
        }
        let id = RegistrationId(bump(&mut tables.ids.registration));
        tables.registrations.insert(id, registration.into_registration(id));
        Ok(id)
    }

    pub fn assign_army(&self, alliance_id: AllianceId, user_id: UserId, army: impl Into<String>) {
        self.tables.write().assignments.push(ArmyAssignment {
            alliance_id,
            user_id,
            army: army.into(),
        });
    }

    pub fn record_checkin(&self, key: CheckinKey) {
        self.tables.write().checkins.insert(key);
    }

    /// Every signup in the store, for inspection
    pub fn all_signups(&self) -> Vec<Signup> {
        self.tables.read().signups.values().cloned().collect()
    }
}

impl WarStore for InMemoryWarStore {
    fn registration(&self, id: RegistrationId) -> StoreResult<Option<Registration>> {
        Ok(self.tables.read().registrations.get(&id).cloned())
    }

    fn registrations_by_land(
        &self,
        land_id: LandId,
        statuses: Option<&[RegistrationStatus]>,
    ) -> StoreResult<Vec<Registration>> {
        Ok(self
            .tables
            .read()
            .registrations
            .values()
            .filter(|r| r.land_id == land_id)
            .filter(|r| statuses.map_or(true, |s| s.contains(&r.status)))
            .cloned()
            .collect())
    }

    fn battle(&self, id: BattleId) -> StoreResult<Option<Battle>> {
        Ok(self.tables.read().battles.get(&id).cloned())
    }

    fn active_battle_by_land(&self, land_id: LandId) -> StoreResult<Option<Battle>> {
        Ok(self
            .tables
            .read()
            .battles
            .values()
            .rev()
            .find(|b| b.land_id == land_id && !b.is_finished())
            .cloned())
    }

    fn battles_by_land(&self, land_id: LandId) -> StoreResult<Vec<Battle>> {
        Ok(self
            .tables
            .read()
            .battles
            .values()
            .filter(|b| b.land_id == land_id)
            .cloned()
            .collect())
    }

    fn rounds_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Round>> {
        let mut rounds: Vec<Round> = self
            .tables
            .read()
            .rounds
            .values()
            .filter(|r| r.battle_id == battle_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| (r.round_no, r.id));
        Ok(rounds)
    }

    fn round(&self, id: RoundId) -> StoreResult<Option<Round>> {
        Ok(self.tables.read().rounds.get(&id).cloned())
    }

    fn signups_by_registration(&self, registration_id: RegistrationId) -> StoreResult<Vec<Signup>> {
        Ok(self
            .tables
            .read()
            .signups
            .values()
            .filter(|s| s.registration_id == registration_id)
            .cloned()
            .collect())
    }

    fn signups_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Signup>> {
        Ok(self
            .tables
            .read()
            .signups
            .values()
            .filter(|s| s.battle_id == battle_id)
            .cloned()
            .collect())
    }

    fn duels_by_round(&self, round_id: RoundId) -> StoreResult<Vec<Duel>> {
        Ok(self
            .tables
            .read()
            .duels
            .values()
            .filter(|d| d.round_id == round_id)
            .cloned()
            .collect())
    }

    fn army_assignments(&self, alliance_id: AllianceId) -> StoreResult<Vec<ArmyAssignment>> {
        Ok(self
            .tables
            .read()
            .assignments
            .iter()
            .filter(|a| a.alliance_id == alliance_id)
            .cloned()
            .collect())
    }

    fn has_war_checkin(&self, key: &CheckinKey) -> StoreResult<bool> {
        Ok(self.tables.read().checkins.contains(key))
    }

    fn land_occupation(&self, land_id: LandId) -> StoreResult<Option<LandOccupation>> {
        Ok(self.tables.read().occupations.get(&land_id).cloned())
    }

    fn alliance_honor(&self, alliance_id: AllianceId) -> StoreResult<Honor> {
        Ok(self.tables.read().honor.get(&alliance_id).copied().unwrap_or_default())
    }

    fn season_score(&self, alliance_id: AllianceId, season_key: &str) -> StoreResult<i64> {
        Ok(self
            .tables
            .read()
            .season_scores
            .get(&(alliance_id, season_key.to_string()))
            .copied()
            .unwrap_or(0))
    }

    fn war_records(&self, alliance_id: AllianceId) -> StoreResult<Vec<WarRecord>> {
        Ok(self
            .tables
            .read()
            .war_records
            .iter()
            .filter(|r| r.alliance_id == alliance_id)
            .cloned()
            .collect())
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        let mut tables = self.tables.write();
        let mut next = tables.clone();
        let mut receipt = CommitReceipt::default();
        for change in changes.into_changes() {
            next.apply(change, &mut receipt)?;
        }
        *tables = next;
        Ok(receipt)
    }
}
