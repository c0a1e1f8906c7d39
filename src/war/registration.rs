//! Alliance registrations for a land

use serde::{Deserialize, Serialize};

use crate::core::types::{AllianceId, LandId, RegistrationId};

/// Where a registration is in the war lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Cancelled,
    Registered,
    Pending,
    Confirmed,
    InBattle,
    Eliminated,
    Victor,
}

impl RegistrationStatus {
    /// Still in the running for the land
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Registered
                | RegistrationStatus::Pending
                | RegistrationStatus::Confirmed
                | RegistrationStatus::InBattle
        )
    }

    /// Can be put into the next pairing batch
    pub fn is_pairable(self) -> bool {
        matches!(self, RegistrationStatus::Registered | RegistrationStatus::Confirmed)
    }

    /// Counts towards "is anyone else still fighting for this land"
    pub fn is_contender(self) -> bool {
        self.is_active() || self == RegistrationStatus::Victor
    }

    pub fn has_completed_battle(self) -> bool {
        matches!(self, RegistrationStatus::Eliminated | RegistrationStatus::Victor)
    }
}

/// An alliance's claim on a land for the current war window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub alliance_id: AllianceId,
    pub land_id: LandId,
    /// Which of the alliance's armies fights for this land
    pub army: String,
    pub status: RegistrationStatus,
    /// Set while the registration sits out a pairing batch on a bye
    pub bye_waiting_round: Option<u32>,
    /// Bye counter value the last time this registration received a bye
    pub last_bye_round: Option<u32>,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn last_bye(&self) -> u32 {
        self.last_bye_round.unwrap_or(0)
    }

    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.status = status;
        self
    }

    /// Leave the bye queue and rejoin pairing
    pub fn reactivated(mut self) -> Self {
        self.bye_waiting_round = None;
        self
    }

    /// Sit out this batch with bye number `round`
    pub fn with_bye(mut self, round: u32) -> Self {
        self.bye_waiting_round = Some(round);
        self.last_bye_round = Some(round);
        self
    }
}

/// A registration before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub alliance_id: AllianceId,
    pub land_id: LandId,
    pub army: String,
    pub status: RegistrationStatus,
    pub bye_waiting_round: Option<u32>,
    pub last_bye_round: Option<u32>,
}

impl NewRegistration {
    pub fn new(alliance_id: AllianceId, land_id: LandId, army: impl Into<String>) -> Self {
        Self {
            alliance_id,
            land_id,
            army: army.into(),
            status: RegistrationStatus::Registered,
            bye_waiting_round: None,
            last_bye_round: None,
        }
    }

    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_last_bye(mut self, round: u32) -> Self {
        self.last_bye_round = Some(round);
        self
    }

    pub fn into_registration(self, id: RegistrationId) -> Registration {
        Registration {
            id,
            alliance_id: self.alliance_id,
            land_id: self.land_id,
            army: self.army,
            status: self.status,
            bye_waiting_round: self.bye_waiting_round,
            last_bye_round: self.last_bye_round,
        }
    }
}
