//! Combat adapter - turns stored team members into combat-ready combatants

use crate::combat::fighter::Combatant;
use crate::combat::gateway::TeamMember;

/// Percentage added to hp/attack/defense for every level above 1
pub const LEVEL_BONUS_PERCENT: u32 = 2;

/// Converts a raw team into combatants the oracle can fight with
pub trait CombatConverter: Send + Sync {
    fn to_combatants(&self, team: &[TeamMember]) -> Vec<Combatant>;
}

/// Applies the flat per-level stat bonus and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LevelScaledConverter;

impl LevelScaledConverter {
    fn scale(value: u32, level: u32) -> u32 {
        let bonus = level.saturating_sub(1) * LEVEL_BONUS_PERCENT;
        value.saturating_mul(100 + bonus) / 100
    }
}

impl CombatConverter for LevelScaledConverter {
    fn to_combatants(&self, team: &[TeamMember]) -> Vec<Combatant> {
        team.iter()
            .map(|member| {
                Combatant::new(
                    member.id,
                    member.name.clone(),
                    Self::scale(member.hp, member.level),
                    Self::scale(member.attack, member.level),
                    Self::scale(member.defense, member.level),
                    member.speed,
                )
            })
            .collect()
    }
}
