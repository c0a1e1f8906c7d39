//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            Display, From,
        )]
        #[display(fmt = "{}", _0)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

record_id!(
    /// A contested map location
    LandId
);
record_id!(
    /// An alliance competing for lands
    AllianceId
);
record_id!(
    /// An alliance's entry into a land's bracket
    RegistrationId
);
record_id!(
    /// A paired contest between two registrations
    BattleId
);
record_id!(
    /// One round of duels inside a battle
    RoundId
);
record_id!(
    /// One roster member's participation in a battle
    SignupId
);
record_id!(
    /// One resolved 1v1 encounter
    DuelId
);
record_id!(
    /// A player account
    UserId
);
record_id!(
    /// A single creature on a player's combat team
    CombatantId
);

/// Which half of a battle a registration or signup fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
