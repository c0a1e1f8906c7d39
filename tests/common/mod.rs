//! Shared fixtures for land-war integration tests

#![allow(dead_code)]

use std::sync::Arc;

use alliance_war::combat::{PlayerDirectory, PlayerProfile, TeamMember};
use alliance_war::core::calendar::{FixedClock, WarWindow};
use alliance_war::core::config::WarConfig;
use alliance_war::core::types::{AllianceId, CombatantId, LandId, RegistrationId, UserId};
use alliance_war::war::registration::NewRegistration;
use alliance_war::war::store::{CheckinKey, WarStore};
use alliance_war::war::{InMemoryWarStore, LandWarService};
use chrono::{DateTime, TimeZone, Utc};

pub const LAND: LandId = LandId(7);

/// Wednesday evening, first war of the week
pub fn war_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 20, 0, 0).unwrap()
}

/// One combatant's base stats
#[derive(Debug, Clone, Copy)]
pub struct Beast {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl Beast {
    pub fn new(hp: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            hp,
            attack,
            defense,
            speed,
        }
    }

    pub fn titan() -> Self {
        Self::new(5_000, 500, 100, 50)
    }

    pub fn runt() -> Self {
        Self::new(20, 1, 0, 1)
    }
}

pub struct Fixture {
    pub store: InMemoryWarStore,
    pub players: PlayerDirectory,
    pub clock: Arc<FixedClock>,
    pub config: WarConfig,
    next_combatant: u64,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: InMemoryWarStore::new(),
            players: PlayerDirectory::new(),
            clock: Arc::new(FixedClock::new(war_time())),
            config: WarConfig::default(),
            next_combatant: 1,
        }
    }

    /// Register `alliance` for `land` with one checked-in member per roster entry
    ///
    /// Member user ids are `alliance * 100 + position`. Each member fields
    /// the listed beasts; an empty list is a member with no active team.
    pub fn register(&mut self, alliance: u64, land: LandId, roster: &[&[Beast]]) -> RegistrationId {
        self.register_with(NewRegistration::new(AllianceId(alliance), land, "main"), roster)
    }

    pub fn register_with(&mut self, registration: NewRegistration, roster: &[&[Beast]]) -> RegistrationId {
        let alliance = registration.alliance_id;
        let window = WarWindow::at(self.clock_now());
        for (position, beasts) in roster.iter().enumerate() {
            let user_id = UserId(alliance.0 * 100 + position as u64 + 1);
            let team = beasts
                .iter()
                .map(|b| {
                    let id = CombatantId(self.next_combatant);
                    self.next_combatant += 1;
                    TeamMember {
                        id,
                        name: format!("beast{}", id),
                        level: 1,
                        hp: b.hp,
                        attack: b.attack,
                        defense: b.defense,
                        speed: b.speed,
                    }
                })
                .collect();
            self.players.insert(
                PlayerProfile {
                    user_id,
                    level: 1,
                    nickname: Some(format!("member{}", user_id)),
                },
                team,
            );
            self.store.assign_army(alliance, user_id, registration.army.clone());
            self.store.record_checkin(CheckinKey {
                alliance_id: alliance,
                user_id,
                war_phase: window.phase,
                weekday: window.weekday,
                war_date: window.date,
            });
        }
        self.store.register(registration).unwrap()
    }

    fn clock_now(&self) -> DateTime<Utc> {
        use alliance_war::core::calendar::Clock;
        self.clock.now()
    }

    pub fn service(self) -> LandWarService<InMemoryWarStore> {
        self.service_over(|store| store)
    }

    /// Build the service over a wrapper around the seeded store
    pub fn service_over<S: WarStore>(self, wrap: impl FnOnce(InMemoryWarStore) -> S) -> LandWarService<S> {
        LandWarService::new(wrap(self.store), self.players)
            .with_config(self.config)
            .with_clock(self.clock)
    }
}
