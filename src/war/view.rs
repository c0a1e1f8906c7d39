//! Serializable reports and read projections

use serde::Serialize;

use crate::core::error::{Outcome, Rejection};
use crate::core::types::{AllianceId, BattleId, LandId, RegistrationId, RoundId, SignupId, UserId};
use crate::war::battle::{Battle, Round};
use crate::war::duel::{Duel, DuelReason, DuelResult};
use crate::war::gauntlet::BattleVerdict;
use crate::war::registration::Registration;

/// A registration that holds, or has held, a bye
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByeEntry {
    pub registration_id: RegistrationId,
    pub alliance_id: AllianceId,
    pub bye_waiting_round: Option<u32>,
    pub last_bye_round: Option<u32>,
}

impl From<&Registration> for ByeEntry {
    fn from(registration: &Registration) -> Self {
        Self {
            registration_id: registration.id,
            alliance_id: registration.alliance_id,
            bye_waiting_round: registration.bye_waiting_round,
            last_bye_round: registration.last_bye_round,
        }
    }
}

impl ByeEntry {
    /// Registrations currently waiting out a bye
    pub fn waiting(registrations: &[Registration]) -> Vec<ByeEntry> {
        registrations
            .iter()
            .filter(|r| r.bye_waiting_round.is_some())
            .map(ByeEntry::from)
            .collect()
    }

    /// Registrations that have ever received a bye
    pub fn any_bye(registrations: &[Registration]) -> Vec<ByeEntry> {
        registrations
            .iter()
            .filter(|r| r.bye_waiting_round.is_some() || r.last_bye_round.is_some())
            .map(ByeEntry::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByeAllocation {
    pub registration_id: RegistrationId,
    pub alliance_id: AllianceId,
    pub bye_round: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingSummary {
    pub battle_id: BattleId,
    pub round_id: RoundId,
    pub left_registration_id: RegistrationId,
    pub right_registration_id: RegistrationId,
    pub left_alliance_id: AllianceId,
    pub right_alliance_id: AllianceId,
    pub left_signups: usize,
    pub right_signups: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingReport {
    pub land_id: LandId,
    pub seed: u64,
    pub battles: Vec<PairingSummary>,
    pub bye: Option<ByeAllocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuelSummary {
    pub attacker_signup_id: SignupId,
    pub defender_signup_id: SignupId,
    pub attacker_user_id: UserId,
    pub defender_user_id: UserId,
    pub result: DuelResult,
    pub reason: Option<DuelReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round_no: u32,
    pub left_alive: u32,
    pub right_alive: u32,
    pub duel_count: usize,
    pub duels: Vec<DuelSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceReport {
    pub battle_id: BattleId,
    pub battle_finished: bool,
    pub verdict: Option<BattleVerdict>,
    pub round_summary: RoundSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleOverview {
    pub battle: Battle,
    pub rounds: Vec<Round>,
    pub left_alive: u32,
    pub right_alive: u32,
    pub bye_registrations: Vec<ByeEntry>,
}

/// How a caller names a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSelector {
    Id(RoundId),
    Number { battle: BattleId, round_no: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundDuels {
    pub round: Round,
    pub duels: Vec<Duel>,
}

/// One battle fought by the land orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleRun {
    pub battle_id: BattleId,
    pub left_alliance_id: AllianceId,
    pub right_alliance_id: AllianceId,
    pub rounds: u32,
    /// `None` if the battle stalled without reaching a verdict
    pub verdict: Option<BattleVerdict>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandWarReport {
    pub land_id: LandId,
    pub seed: u64,
    pub cycles: u32,
    pub pairings: Vec<PairingReport>,
    pub battles: Vec<BattleRun>,
    pub occupier: Option<AllianceId>,
    /// Why the last cycle could not pair, if it could not
    pub stopped: Option<Rejection>,
}

/// `{ok: true, ...}` / `{ok: false, error, reason, ...}` envelope for outer layers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response<T: Serialize> {
    Success {
        ok: bool,
        #[serde(flatten)]
        data: T,
    },
    Failure {
        ok: bool,
        error: String,
        #[serde(flatten)]
        rejection: Rejection,
    },
}

impl<T: Serialize> From<Outcome<T>> for Response<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(data) => Response::Success { ok: true, data },
            Err(rejection) => Response::Failure {
                ok: false,
                error: rejection.to_string(),
                rejection,
            },
        }
    }
}
