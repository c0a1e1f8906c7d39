use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{AllianceId, BattleId, LandId, RegistrationId, RoundId, SignupId};
use crate::war::battle::BattlePhase;
use crate::war::signup::SignupStatus;
use crate::war::store::StoreError;
use crate::war::view::ByeEntry;

/// Hard failures: setup/data-integrity problems and infrastructure errors.
///
/// These indicate a bug upstream (or a broken store) and are never shown to
/// players as a normal game message.
#[derive(Error, Debug)]
pub enum WarError {
    #[error("alliance {alliance} army '{army}' has no checked-in members and cannot fight")]
    EmptyRoster { alliance: AllianceId, army: String },

    #[error("signup {signup} cannot move from {from:?} to {to:?}")]
    InvalidSignupTransition {
        signup: SignupId,
        from: SignupStatus,
        to: SignupStatus,
    },

    #[error("battle {battle} cannot move from {from:?} to {to:?}")]
    InvalidBattleTransition {
        battle: BattleId,
        from: BattlePhase,
        to: BattlePhase,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WarError>;

/// Expected business rejections, surfaced to players as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("at least two alliances must be registered before pairing")]
    InsufficientRegistrations { bye_registrations: Vec<ByeEntry> },

    #[error("battle {battle} not found")]
    BattleNotFound { battle: BattleId },

    #[error("battle {battle} has already finished")]
    BattleFinished { battle: BattleId },

    #[error("battle {battle} has no round in progress")]
    NoActiveRound { battle: BattleId },

    #[error("registration {registration} is missing, battle cannot advance")]
    RegistrationMissing { registration: RegistrationId },

    #[error("round {round} does not exist")]
    RoundNotFound { round: RoundId },

    #[error("round {round_no} does not exist in battle {battle}")]
    RoundNumberNotFound { battle: BattleId, round_no: u32 },

    #[error("land {land} has no battle in progress")]
    NoActiveBattle { land: LandId },

    #[error("land wars are only fought Wednesday and Saturday 20:00-22:00 UTC")]
    OutsideBattleHours { at: DateTime<Utc> },
}

/// Result of an operation that may be turned down for business reasons.
pub type Outcome<T> = std::result::Result<T, Rejection>;
