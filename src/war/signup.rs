//! Roster members' participation in a battle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combat::fighter::Fighter;
use crate::core::error::{Result, WarError};
use crate::core::types::{AllianceId, BattleId, CombatantId, RegistrationId, SignupId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    Ready,
    Engaged,
    Eliminated,
    Advanced,
}

impl SignupStatus {
    pub fn can_transition_to(self, next: SignupStatus) -> bool {
        use SignupStatus::*;
        match (self, next) {
            (Ready, Engaged) | (Advanced, Engaged) => true,
            (Engaged, Advanced) | (Engaged, Eliminated) => true,
            (Advanced, Ready) => true,
            (Eliminated, _) => false,
            (Ready, _) | (Engaged, _) | (Advanced, _) => false,
        }
    }

    /// Can be pulled into the next duel
    pub fn is_available(self) -> bool {
        matches!(self, SignupStatus::Ready | SignupStatus::Advanced)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantHp {
    pub id: CombatantId,
    pub hp: u32,
}

/// Remaining HP per combatant after a signup's latest duel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpSnapshot {
    pub combatants: Vec<CombatantHp>,
}

impl HpSnapshot {
    pub fn capture(fighter: &Fighter) -> Self {
        Self {
            combatants: fighter
                .combatants
                .iter()
                .map(|c| CombatantHp {
                    id: c.id,
                    hp: c.hp_current,
                })
                .collect(),
        }
    }

    pub fn hp_of(&self, id: CombatantId) -> Option<u32> {
        self.combatants.iter().find(|c| c.id == id).map(|c| c.hp)
    }

    /// Re-apply stored HP onto freshly built combatants
    ///
    /// Combatants missing from the snapshot keep full HP.
    pub fn apply_to(&self, fighter: &mut Fighter) {
        for combatant in &mut fighter.combatants {
            if let Some(hp) = self.hp_of(combatant.id) {
                combatant.restore_hp(hp);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub id: SignupId,
    /// Attached by the store when the battle is created
    pub battle_id: BattleId,
    pub registration_id: RegistrationId,
    pub alliance_id: AllianceId,
    pub army: String,
    pub user_id: UserId,
    /// Fixed turn priority within the roster, starting at 1
    pub signup_order: u32,
    pub hp_state: Option<HpSnapshot>,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
}

impl Signup {
    pub fn set_status(&mut self, to: SignupStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(WarError::InvalidSignupTransition {
                signup: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn is_eliminated(&self) -> bool {
        self.status == SignupStatus::Eliminated
    }
}

/// A signup before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignup {
    pub registration_id: RegistrationId,
    pub alliance_id: AllianceId,
    pub army: String,
    pub user_id: UserId,
    pub signup_order: u32,
    pub created_at: DateTime<Utc>,
}

impl NewSignup {
    pub fn into_signup(self, id: SignupId, battle_id: BattleId) -> Signup {
        Signup {
            id,
            battle_id,
            registration_id: self.registration_id,
            alliance_id: self.alliance_id,
            army: self.army,
            user_id: self.user_id,
            signup_order: self.signup_order,
            hp_state: None,
            status: SignupStatus::Ready,
            created_at: self.created_at,
        }
    }
}
