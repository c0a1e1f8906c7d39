//! War configuration with documented constants
//!
//! Every tunable the land-war engine reads is collected here. Values can be
//! overridden from a TOML file; anything left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Configuration for pairing, gauntlet and settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    /// Maximum number of attack entries kept in one duel's combat log
    ///
    /// The combat oracle stops recording (but keeps fighting) once this
    /// many entries exist, so a long duel does not bloat the duel table.
    pub max_log_turns: usize,

    /// How many pair-then-fight cycles the land orchestrator runs before
    /// giving up on finding a single survivor
    ///
    /// Each cycle at least halves the contender pool (rounded up), so ten
    /// cycles cover brackets of up to 1024 registrations.
    pub max_bracket_cycles: u32,

    /// Honor granted to the winning alliance of every battle
    ///
    /// Added to both the spendable and the lifetime honor counters.
    pub honor_per_win: u32,

    /// Seasonal ranking score granted when an alliance occupies a land
    pub season_score_per_occupation: u32,

    /// Let the land orchestrator run outside battle hours
    ///
    /// Battles normally start only on Wednesday and Saturday between 20:00
    /// and 22:00 UTC. Turn this on for test servers and replays.
    pub allow_time_bypass: bool,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            max_log_turns: 50,
            max_bracket_cycles: 10,
            honor_per_win: 1,
            season_score_per_occupation: 1,
            allow_time_bypass: false,
        }
    }
}

impl WarConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
