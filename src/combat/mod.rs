//! Combat collaborators
//!
//! Everything the land-war engine needs to turn a signup into a fighter and
//! a pair of fighters into a winner.

pub mod adapter;
pub mod fighter;
pub mod gateway;
pub mod oracle;

pub use adapter::{CombatConverter, LevelScaledConverter};
pub use fighter::{Combatant, Fighter};
pub use gateway::{PlayerDirectory, PlayerGateway, PlayerProfile, TeamMember};
pub use oracle::{AttackLog, CombatOracle, CombatReport, StrikeOracle};
