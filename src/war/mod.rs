//! Land-battle tournament engine
//!
//! Pairing puts a land's registrations into 1v1 battles. Each battle is
//! fought as a gauntlet of duels between the two checked-in rosters, and the
//! last alliance standing on a land occupies it.

pub mod battle;
pub mod duel;
pub mod finalizer;
pub mod gauntlet;
pub mod locks;
pub mod memory;
pub mod pairing;
pub mod registration;
pub mod resolver;
pub mod roster;
pub mod service;
pub mod signup;
pub mod store;
pub mod view;

pub use battle::{Battle, BattlePhase, Round, RoundStatus};
pub use duel::{Duel, DuelReason, DuelResult};
pub use finalizer::{Finalizer, Settlement};
pub use gauntlet::{BattleVerdict, GauntletEngine};
pub use locks::KeyedLocks;
pub use memory::InMemoryWarStore;
pub use pairing::PairingScheduler;
pub use registration::{NewRegistration, Registration, RegistrationStatus};
pub use resolver::DuelResolver;
pub use roster::RosterBuilder;
pub use service::LandWarService;
pub use signup::{HpSnapshot, Signup, SignupStatus};
pub use store::{ChangeSet, StoreError, WarStore};
pub use view::{
    AdvanceReport, BattleOverview, LandWarReport, PairingReport, Response, RoundDuels, RoundSelector,
};
