//! Resolves the checked-in army roster a registration fights with

use ahash::AHashSet;
use chrono::{DateTime, Utc};

use crate::core::calendar::WarWindow;
use crate::core::error::Result;
use crate::war::registration::Registration;
use crate::war::signup::NewSignup;
use crate::war::store::{CheckinKey, WarStore};

/// Builds the ordered signups for one side of a battle
#[derive(Debug, Default, Clone, Copy)]
pub struct RosterBuilder;

impl RosterBuilder {
    /// Members of the registration's army who checked in for this war window
    ///
    /// Order follows the alliance's army assignment list and is the
    /// gauntlet turn order; `signup_order` starts at 1.
    pub fn build<S: WarStore + ?Sized>(
        &self,
        store: &S,
        registration: &Registration,
        now: DateTime<Utc>,
    ) -> Result<Vec<NewSignup>> {
        let window = WarWindow::at(now);
        let mut seen = AHashSet::new();
        let mut roster = Vec::new();

        for assignment in store.army_assignments(registration.alliance_id)? {
            if assignment.army != registration.army || !seen.insert(assignment.user_id) {
                continue;
            }
            let key = CheckinKey {
                alliance_id: registration.alliance_id,
                user_id: assignment.user_id,
                war_phase: window.phase,
                weekday: window.weekday,
                war_date: window.date,
            };
            if !store.has_war_checkin(&key)? {
                continue;
            }
            roster.push(NewSignup {
                registration_id: registration.id,
                alliance_id: registration.alliance_id,
                army: registration.army.clone(),
                user_id: assignment.user_id,
                signup_order: roster.len() as u32 + 1,
                created_at: now,
            });
        }

        Ok(roster)
    }
}
