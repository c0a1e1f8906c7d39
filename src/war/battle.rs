//! Battles and their rounds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WarError};
use crate::core::types::{BattleId, LandId, RegistrationId, RoundId, Side};

/// Battle lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    Active,
    /// Held for a transitional "about to start" state; nothing enters it today
    Reserved,
    Finished,
}

impl BattlePhase {
    pub fn can_transition_to(self, next: BattlePhase) -> bool {
        match (self, next) {
            (BattlePhase::Active, BattlePhase::Finished) => true,
            (BattlePhase::Reserved, BattlePhase::Active) => true,
            (BattlePhase::Reserved, BattlePhase::Finished) => true,
            (BattlePhase::Active, _) | (BattlePhase::Reserved, _) => false,
            (BattlePhase::Finished, _) => false,
        }
    }
}

/// A paired contest between two registrations for a land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    pub land_id: LandId,
    pub left_registration_id: RegistrationId,
    pub right_registration_id: RegistrationId,
    pub phase: BattlePhase,
    pub current_round: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Battle {
    pub fn registration(&self, side: Side) -> RegistrationId {
        match side {
            Side::Left => self.left_registration_id,
            Side::Right => self.right_registration_id,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    /// Stamp the start time the first time a round is fought
    pub fn started(mut self, now: DateTime<Utc>) -> Self {
        self.started_at.get_or_insert(now);
        self
    }

    pub fn finished(mut self, now: DateTime<Utc>) -> Result<Self> {
        if !self.phase.can_transition_to(BattlePhase::Finished) {
            return Err(WarError::InvalidBattleTransition {
                battle: self.id,
                from: self.phase,
                to: BattlePhase::Finished,
            });
        }
        self.phase = BattlePhase::Finished;
        self.finished_at = Some(now);
        Ok(self)
    }

    pub fn at_round(mut self, round_no: u32) -> Self {
        self.current_round = round_no;
        self
    }
}

/// A battle before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBattle {
    pub land_id: LandId,
    pub left_registration_id: RegistrationId,
    pub right_registration_id: RegistrationId,
}

impl NewBattle {
    pub fn into_battle(self, id: BattleId) -> Battle {
        Battle {
            id,
            land_id: self.land_id,
            left_registration_id: self.left_registration_id,
            right_registration_id: self.right_registration_id,
            phase: BattlePhase::Active,
            current_round: 1,
            started_at: None,
            finished_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Active,
    Finished,
}

/// One bounded batch of duels within a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub battle_id: BattleId,
    pub round_no: u32,
    pub left_alive: u32,
    pub right_alive: u32,
    pub status: RoundStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    /// Close the round with the final alive counts
    pub fn closed(mut self, left_alive: u32, right_alive: u32, now: DateTime<Utc>) -> Self {
        self.left_alive = left_alive;
        self.right_alive = right_alive;
        self.status = RoundStatus::Finished;
        self.finished_at = Some(now);
        self
    }
}

/// A round before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRound {
    pub round_no: u32,
    pub left_alive: u32,
    pub right_alive: u32,
    pub started_at: DateTime<Utc>,
}

impl NewRound {
    pub fn into_round(self, id: RoundId, battle_id: BattleId) -> Round {
        Round {
            id,
            battle_id,
            round_no: self.round_no,
            left_alive: self.left_alive,
            right_alive: self.right_alive,
            status: RoundStatus::Active,
            started_at: Some(self.started_at),
            finished_at: None,
        }
    }
}
