//! Write-once duel records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combat::oracle::AttackLog;
use crate::core::types::{DuelId, RoundId, SignupId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelResult {
    AttackerWon,
    DefenderWon,
}

/// Why a duel was decided without combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelReason {
    BothSidesEmpty,
    OpponentEmpty,
}

impl DuelReason {
    pub fn message(self) -> &'static str {
        match self {
            DuelReason::BothSidesEmpty => "both sides fielded no fighters",
            DuelReason::OpponentEmpty => "opponent fielded no fighters",
        }
    }
}

impl std::fmt::Display for DuelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelLog {
    pub logs: Vec<AttackLog>,
    pub reason: Option<DuelReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duel {
    pub id: DuelId,
    pub round_id: RoundId,
    pub attacker_signup_id: SignupId,
    pub defender_signup_id: SignupId,
    pub result: DuelResult,
    pub log: DuelLog,
    pub created_at: DateTime<Utc>,
}

/// A resolved duel; the round id is attached when it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDuel {
    pub attacker_signup_id: SignupId,
    pub defender_signup_id: SignupId,
    pub result: DuelResult,
    pub log: DuelLog,
    pub created_at: DateTime<Utc>,
}

impl NewDuel {
    pub fn into_duel(self, id: DuelId, round_id: RoundId) -> Duel {
        Duel {
            id,
            round_id,
            attacker_signup_id: self.attacker_signup_id,
            defender_signup_id: self.defender_signup_id,
            result: self.result,
            log: self.log,
            created_at: self.created_at,
        }
    }
}
