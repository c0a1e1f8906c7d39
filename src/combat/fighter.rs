//! Combat-ready fighters
//!
//! A [`Fighter`] is one player's side of a duel: the player plus the ordered
//! team of [`Combatant`]s they send in. Combatants fight one at a time and
//! carry their remaining HP from one duel to the next.

use serde::{Deserialize, Serialize};

use crate::core::types::{CombatantId, UserId};

/// One creature on a team, with final (all bonuses applied) stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub hp_max: u32,
    pub hp_current: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub is_dead: bool,
}

impl Combatant {
    pub fn new(id: CombatantId, name: impl Into<String>, hp: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            id,
            name: name.into(),
            hp_max: hp,
            hp_current: hp,
            attack,
            defense,
            speed,
            is_dead: hp == 0,
        }
    }

    pub fn alive(&self) -> bool {
        !self.is_dead && self.hp_current > 0
    }

    /// Apply damage, returning the HP actually removed
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp_current);
        self.hp_current -= dealt;
        if self.hp_current == 0 {
            self.is_dead = true;
        }
        dealt
    }

    /// Re-apply HP carried over from an earlier duel
    pub fn restore_hp(&mut self, stored: u32) {
        self.hp_current = stored.min(self.hp_max);
        if self.hp_current == 0 {
            self.is_dead = true;
        }
    }
}

/// A player and the combatants they field in a duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub user_id: UserId,
    pub level: u32,
    pub name: String,
    pub combatants: Vec<Combatant>,
}

impl Fighter {
    pub fn new(user_id: UserId, level: u32, name: impl Into<String>, combatants: Vec<Combatant>) -> Self {
        Self {
            user_id,
            level,
            name: name.into(),
            combatants,
        }
    }

    /// A fighter with nobody to send in
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, 1, format!("player {}", user_id), Vec::new())
    }

    pub fn first_alive_index(&self) -> Option<usize> {
        self.combatants.iter().position(Combatant::alive)
    }

    pub fn has_living(&self) -> bool {
        self.first_alive_index().is_some()
    }

    pub fn remaining_hp(&self) -> u64 {
        self.combatants
            .iter()
            .filter(|c| c.alive())
            .map(|c| c.hp_current as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wolf(hp: u32) -> Combatant {
        Combatant::new(CombatantId(1), "wolf", hp, 10, 5, 7)
    }

    #[test]
    fn damage_is_capped_at_remaining_hp() {
        let mut c = wolf(20);
        assert_eq!(c.take_damage(50), 20);
        assert_eq!(c.hp_current, 0);
        assert!(!c.alive());
    }

    #[test]
    fn restore_clamps_to_max_and_marks_dead_at_zero() {
        let mut c = wolf(20);
        c.restore_hp(999);
        assert_eq!(c.hp_current, 20);
        c.restore_hp(0);
        assert!(c.is_dead);
    }

    #[test]
    fn first_alive_skips_the_fallen() {
        let mut first = wolf(10);
        first.restore_hp(0);
        let fighter = Fighter::new(UserId(1), 3, "ana", vec![first, wolf(10)]);
        assert_eq!(fighter.first_alive_index(), Some(1));
        assert_eq!(fighter.remaining_hp(), 10);
        assert!(!Fighter::empty(UserId(2)).has_living());
    }
}
