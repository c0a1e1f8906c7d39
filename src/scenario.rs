//! TOML scenarios for the headless runner
//!
//! A scenario describes players and their teams, alliances with their army
//! assignments and check-ins, and the land registrations to fight over. It
//! loads into an [`InMemoryWarStore`] and a [`PlayerDirectory`].

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::combat::gateway::{PlayerDirectory, PlayerProfile, TeamMember};
use crate::core::calendar::{Clock, FixedClock, SystemClock, WarWindow};
use crate::core::config::WarConfig;
use crate::core::error::{Result, WarError};
use crate::core::types::{AllianceId, LandId, UserId};
use crate::war::memory::InMemoryWarStore;
use crate::war::registration::{NewRegistration, RegistrationStatus};
use crate::war::service::LandWarService;
use crate::war::store::CheckinKey;

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSpec {
    pub user_id: UserId,
    #[serde(default = "default_level")]
    pub level: u32,
    pub nickname: Option<String>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
}

fn default_level() -> u32 {
    1
}

fn default_checked_in() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberSpec {
    pub user_id: UserId,
    pub army: String,
    #[serde(default = "default_checked_in")]
    pub checked_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllianceSpec {
    pub id: AllianceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationSpec {
    pub alliance: AllianceId,
    pub land: LandId,
    pub army: String,
    pub status: Option<RegistrationStatus>,
    pub last_bye_round: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Pins the war clock; RFC 3339, e.g. "2026-10-14T20:00:00Z"
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config: WarConfig,
    #[serde(default)]
    pub players: Vec<PlayerSpec>,
    #[serde(default)]
    pub alliances: Vec<AllianceSpec>,
    #[serde(default)]
    pub registrations: Vec<RegistrationSpec>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Every land with at least one registration, in id order
    pub fn lands(&self) -> Vec<LandId> {
        self.registrations
            .iter()
            .map(|r| r.land)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.now {
            Some(now) => Arc::new(FixedClock::new(now)),
            None => Arc::new(SystemClock),
        }
    }

    pub fn player_directory(&self) -> PlayerDirectory {
        let mut directory = PlayerDirectory::new();
        for player in &self.players {
            directory.insert(
                PlayerProfile {
                    user_id: player.user_id,
                    level: player.level,
                    nickname: player.nickname.clone(),
                },
                player.team.clone(),
            );
        }
        directory
    }

    /// Seed a store with assignments and check-ins for the war window at `now`
    pub fn seed_store(&self, now: DateTime<Utc>) -> Result<InMemoryWarStore> {
        let store = InMemoryWarStore::new();
        let window = WarWindow::at(now);

        for alliance in &self.alliances {
            for member in &alliance.members {
                store.assign_army(alliance.id, member.user_id, member.army.clone());
                if member.checked_in {
                    store.record_checkin(CheckinKey {
                        alliance_id: alliance.id,
                        user_id: member.user_id,
                        war_phase: window.phase,
                        weekday: window.weekday,
                        war_date: window.date,
                    });
                }
            }
        }

        for spec in &self.registrations {
            if !self.alliances.iter().any(|a| a.id == spec.alliance) {
                return Err(WarError::Scenario(format!(
                    "registration for land {} names unknown alliance {}",
                    spec.land, spec.alliance
                )));
            }
            let mut registration = NewRegistration::new(spec.alliance, spec.land, spec.army.clone());
            if let Some(status) = spec.status {
                registration = registration.with_status(status);
            }
            if let Some(round) = spec.last_bye_round {
                registration = registration.with_last_bye(round);
            }
            store.register(registration)?;
        }

        Ok(store)
    }

    /// A ready-to-run service over a freshly seeded store
    pub fn into_service(self) -> Result<LandWarService<InMemoryWarStore>> {
        let clock = self.clock();
        let store = self.seed_store(clock.now())?;
        Ok(LandWarService::new(store, self.player_directory())
            .with_config(self.config)
            .with_clock(clock))
    }
}
