//! War calendar
//!
//! Alliance wars run twice a week. Everything that needs "now" goes through
//! a [`Clock`] so that battles can be replayed with a pinned time.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Which of the two weekly wars is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarPhase {
    /// Monday through Wednesday
    First,
    /// Thursday through Sunday
    Second,
}

impl WarPhase {
    pub fn from_weekday_index(weekday: u32) -> Self {
        if weekday <= 2 {
            WarPhase::First
        } else {
            WarPhase::Second
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WarPhase::First => "first",
            WarPhase::Second => "second",
        }
    }
}

/// Weekdays battles start on, Monday = 0
pub const BATTLE_WEEKDAYS: [u32; 2] = [2, 5];
/// First hour of battle time
pub const BATTLE_START_HOUR: u32 = 20;
/// Hour battle time ends, exclusive
pub const BATTLE_END_HOUR: u32 = 22;

/// The war window a moment falls into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarWindow {
    pub phase: WarPhase,
    /// Monday = 0
    pub weekday: u32,
    pub date: NaiveDate,
    /// `YYYY-MM`, the key seasonal scores are filed under
    pub season_key: String,
}

impl WarWindow {
    pub fn at(now: DateTime<Utc>) -> Self {
        let weekday = now.weekday().num_days_from_monday();
        Self {
            phase: WarPhase::from_weekday_index(weekday),
            weekday,
            date: now.date_naive(),
            season_key: now.format("%Y-%m").to_string(),
        }
    }

    /// Wednesday or Saturday, 20:00 up to 22:00
    pub fn is_battle_time(now: DateTime<Utc>) -> bool {
        BATTLE_WEEKDAYS.contains(&now.weekday().num_days_from_monday())
            && (BATTLE_START_HOUR..BATTLE_END_HOUR).contains(&now.hour())
    }
}
