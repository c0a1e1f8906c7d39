//! Persistence gateway for the land-war engine
//!
//! Reads hand back owned snapshots. Every write goes through
//! [`WarStore::commit`], which applies a whole [`ChangeSet`] or nothing, so
//! a pairing or a round advance is saved in one step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::calendar::WarPhase;
use crate::core::types::{AllianceId, BattleId, DuelId, LandId, RegistrationId, RoundId, SignupId, UserId};
use crate::war::battle::{Battle, NewBattle, NewRound, Round};
use crate::war::duel::{Duel, NewDuel};
use crate::war::registration::{Registration, RegistrationStatus};
use crate::war::signup::{NewSignup, Signup};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {id} does not exist")]
    MissingRecord { kind: &'static str, id: u64 },

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarResult {
    Win,
    Lose,
}

/// One alliance's side of a finished battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarRecord {
    pub alliance_id: AllianceId,
    pub opponent_alliance_id: AllianceId,
    pub land_id: LandId,
    pub army: String,
    pub war_phase: WarPhase,
    pub war_date: NaiveDate,
    pub result: WarResult,
    pub honor_gained: u32,
    pub battle_id: BattleId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandOccupation {
    pub land_id: LandId,
    pub alliance_id: AllianceId,
    /// The registration that won the land
    pub registration_id: RegistrationId,
    pub war_phase: WarPhase,
    pub war_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Honor {
    /// Spendable
    pub current: u64,
    pub lifetime: u64,
}

/// A member's placement in one of their alliance's armies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyAssignment {
    pub alliance_id: AllianceId,
    pub user_id: UserId,
    pub army: String,
}

/// Lookup key for a member's war check-in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckinKey {
    pub alliance_id: AllianceId,
    pub user_id: UserId,
    pub war_phase: WarPhase,
    pub weekday: u32,
    pub war_date: NaiveDate,
}

/// A single state mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    SaveRegistration(Registration),
    /// New battle with its first round and its full signup set
    CreateBattle {
        battle: NewBattle,
        first_round: NewRound,
        signups: Vec<NewSignup>,
    },
    SaveBattle(Battle),
    SaveRound(Round),
    CreateRound {
        battle_id: BattleId,
        round: NewRound,
    },
    SaveSignups(Vec<Signup>),
    AppendDuels {
        round_id: RoundId,
        duels: Vec<NewDuel>,
    },
    RecordWar(WarRecord),
    GrantHonor {
        alliance_id: AllianceId,
        amount: u64,
    },
    AddSeasonScore {
        alliance_id: AllianceId,
        season_key: String,
        delta: i64,
    },
    OccupyLand(LandOccupation),
}

/// Ordered changes applied together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn append(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Ids allocated by a commit, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub battles: Vec<BattleId>,
    pub rounds: Vec<RoundId>,
    pub signups: Vec<SignupId>,
    pub duels: Vec<DuelId>,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait WarStore: Send + Sync {
    fn registration(&self, id: RegistrationId) -> StoreResult<Option<Registration>>;

    /// Registrations for a land in id order, optionally limited to some statuses
    fn registrations_by_land(
        &self,
        land_id: LandId,
        statuses: Option<&[RegistrationStatus]>,
    ) -> StoreResult<Vec<Registration>>;

    fn battle(&self, id: BattleId) -> StoreResult<Option<Battle>>;

    /// Most recent battle on the land that has not finished
    fn active_battle_by_land(&self, land_id: LandId) -> StoreResult<Option<Battle>>;

    fn battles_by_land(&self, land_id: LandId) -> StoreResult<Vec<Battle>>;

    /// Rounds ordered by round number
    fn rounds_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Round>>;

    fn round(&self, id: RoundId) -> StoreResult<Option<Round>>;

    /// Every battle the registration fought, oldest first
    fn signups_by_registration(&self, registration_id: RegistrationId) -> StoreResult<Vec<Signup>>;

    /// Both rosters of one battle in id order
    fn signups_by_battle(&self, battle_id: BattleId) -> StoreResult<Vec<Signup>>;

    /// Duels in the order they were fought
    fn duels_by_round(&self, round_id: RoundId) -> StoreResult<Vec<Duel>>;

    /// Army assignments for an alliance in a stable order
    fn army_assignments(&self, alliance_id: AllianceId) -> StoreResult<Vec<ArmyAssignment>>;

    fn has_war_checkin(&self, key: &CheckinKey) -> StoreResult<bool>;

    fn land_occupation(&self, land_id: LandId) -> StoreResult<Option<LandOccupation>>;

    fn alliance_honor(&self, alliance_id: AllianceId) -> StoreResult<Honor>;

    fn season_score(&self, alliance_id: AllianceId, season_key: &str) -> StoreResult<i64>;

    fn war_records(&self, alliance_id: AllianceId) -> StoreResult<Vec<WarRecord>>;

    /// Apply every change or none of them
    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt>;
}
