//! Player lookups the duel resolver depends on
//!
//! Players, their teams and their creatures live in other subsystems. The
//! land-war engine only needs to resolve a player and read the team they
//! have marked active for combat.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{CombatantId, UserId};

/// The slice of a player profile a duel needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub level: u32,
    pub nickname: Option<String>,
}

impl PlayerProfile {
    pub fn display_name(&self) -> String {
        self.nickname
            .clone()
            .unwrap_or_else(|| format!("player {}", self.user_id))
    }
}

/// A team member as stored, before combat bonuses are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: CombatantId,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

fn default_level() -> u32 {
    1
}

/// Resolves players and their active combat team
pub trait PlayerGateway: Send + Sync {
    fn player(&self, user_id: UserId) -> Option<PlayerProfile>;

    /// The team the player has marked for combat, in fighting order
    fn active_team(&self, user_id: UserId) -> Vec<TeamMember>;
}

/// In-memory player registry
#[derive(Debug, Default, Clone)]
pub struct PlayerDirectory {
    profiles: AHashMap<UserId, PlayerProfile>,
    teams: AHashMap<UserId, Vec<TeamMember>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: PlayerProfile, team: Vec<TeamMember>) {
        self.teams.insert(profile.user_id, team);
        self.profiles.insert(profile.user_id, profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl PlayerGateway for PlayerDirectory {
    fn player(&self, user_id: UserId) -> Option<PlayerProfile> {
        self.profiles.get(&user_id).cloned()
    }

    fn active_team(&self, user_id: UserId) -> Vec<TeamMember> {
        self.teams.get(&user_id).cloned().unwrap_or_default()
    }
}
