//! Power-up bonuses
//!
//! Bonuses are rolled once per round, tick down one turn per round, and feed
//! a damage modifier back into the battle. Multiplier changes go through
//! [`MultiplierControl`] so the engine stays the owner of its meters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::MultiplierControl;

/// Power-up identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    DoubleDamage,
    SteamHealing,
    MechanicalShield,
    MultiSpin,
    ComboBoost,
}

impl PowerUpKind {
    /// All kinds in roll order
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::DoubleDamage,
        PowerUpKind::SteamHealing,
        PowerUpKind::MechanicalShield,
        PowerUpKind::MultiSpin,
        PowerUpKind::ComboBoost,
    ];

    /// Catalog entry for this kind
    pub fn power_up(self) -> PowerUp {
        match self {
            PowerUpKind::DoubleDamage => PowerUp {
                kind: self,
                name: "Double Damage",
                effect: "Next attack deals 2x damage",
                duration: 3,
                chance: 0.05,
            },
            PowerUpKind::SteamHealing => PowerUp {
                kind: self,
                name: "Steam Healing",
                effect: "Instantly restore 30 health points",
                duration: 0,
                chance: 0.05,
            },
            PowerUpKind::MechanicalShield => PowerUp {
                kind: self,
                name: "Mechanical Shield",
                effect: "Block next 2 enemy attacks",
                duration: 2,
                chance: 0.05,
            },
            PowerUpKind::MultiSpin => PowerUp {
                kind: self,
                name: "Multi-Spin",
                effect: "Receive 3 free spins",
                duration: 0,
                chance: 0.05,
            },
            PowerUpKind::ComboBoost => PowerUp {
                kind: self,
                name: "Combo Boost",
                effect: "Increase combo multiplier by 1",
                duration: 5,
                chance: 0.05,
            },
        }
    }
}

/// Static power-up definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub name: &'static str,
    pub effect: &'static str,
    /// Turns the bonus stays active; 0 means instant
    pub duration: u32,
    /// Per-round activation probability
    pub chance: f64,
}

impl PowerUp {
    pub fn is_instant(&self) -> bool {
        self.duration == 0
    }
}

/// Activation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBonus {
    pub id: u64,
    pub kind: PowerUpKind,
    pub name: String,
    pub effect: String,
    pub duration: u32,
    pub remaining_turns: u32,
    pub activated_at: DateTime<Utc>,
}

/// Active bonuses plus activation history
#[derive(Debug, Clone, Default)]
pub struct BonusSystem {
    next_id: u64,
    active: BTreeMap<u64, ActiveBonus>,
    history: Vec<ActiveBonus>,
}

impl BonusSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll every catalog entry independently and activate the hits
    pub fn check_activation<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<ActiveBonus> {
        PowerUpKind::ALL
            .into_iter()
            .filter(|kind| rng.random::<f64>() < kind.power_up().chance)
            .map(|kind| self.activate(kind))
            .collect()
    }

    /// Activate a power-up unconditionally
    pub fn activate(&mut self, kind: PowerUpKind) -> ActiveBonus {
        let power_up = kind.power_up();
        self.next_id += 1;

        let bonus = ActiveBonus {
            id: self.next_id,
            kind,
            name: power_up.name.to_string(),
            effect: power_up.effect.to_string(),
            duration: power_up.duration,
            remaining_turns: power_up.duration,
            activated_at: Utc::now(),
        };

        if !power_up.is_instant() {
            self.active.insert(bonus.id, bonus.clone());
        }
        self.history.push(bonus.clone());
        log::debug!("Power-up activated: {}", bonus.name);
        bonus
    }

    /// Advance one turn; returns ids of bonuses that expired
    pub fn tick(&mut self) -> Vec<u64> {
        let mut expired = Vec::new();
        for (id, bonus) in self.active.iter_mut() {
            bonus.remaining_turns = bonus.remaining_turns.saturating_sub(1);
            if bonus.remaining_turns == 0 {
                expired.push(*id);
            }
        }
        for id in &expired {
            self.active.remove(id);
        }
        expired
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.values().any(|b| b.kind == kind)
    }

    /// Active bonuses in activation order
    pub fn active_bonuses(&self) -> impl Iterator<Item = &ActiveBonus> {
        self.active.values()
    }

    /// Every activation so far, including instant ones
    pub fn history(&self) -> &[ActiveBonus] {
        &self.history
    }

    /// Apply active modifiers to a damage value.
    ///
    /// Combo Boost raises the engine multiplier by one step per call while it
    /// is active.
    pub fn apply_effects<M: MultiplierControl + ?Sized>(&self, base_damage: u32, control: &mut M) -> u32 {
        let mut damage = base_damage as f64;
        if self.is_active(PowerUpKind::DoubleDamage) {
            damage *= 2.0;
        }
        if self.is_active(PowerUpKind::ComboBoost) {
            control.adjust_multiplier(1.0);
        }
        damage.floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FixedMultiplier(f64);

    impl MultiplierControl for FixedMultiplier {
        fn multiplier(&self) -> f64 {
            self.0
        }

        fn adjust_multiplier(&mut self, delta: f64) -> f64 {
            self.0 += delta;
            self.0
        }
    }

    #[test]
    fn test_instant_power_ups_only_go_to_history() {
        let mut bonuses = BonusSystem::new();
        bonuses.activate(PowerUpKind::SteamHealing);
        bonuses.activate(PowerUpKind::MultiSpin);

        assert_eq!(bonuses.active_bonuses().count(), 0);
        assert_eq!(bonuses.history().len(), 2);
    }

    #[test]
    fn test_tick_expires_after_duration() {
        let mut bonuses = BonusSystem::new();
        let shield = bonuses.activate(PowerUpKind::MechanicalShield);
        let boost = bonuses.activate(PowerUpKind::ComboBoost);
        assert_ne!(shield.id, boost.id);

        assert!(bonuses.tick().is_empty());
        assert!(bonuses.is_active(PowerUpKind::MechanicalShield));

        assert_eq!(bonuses.tick(), vec![shield.id]);
        assert!(!bonuses.is_active(PowerUpKind::MechanicalShield));
        assert!(bonuses.is_active(PowerUpKind::ComboBoost));

        for _ in 0..3 {
            bonuses.tick();
        }
        assert_eq!(bonuses.active_bonuses().count(), 0);
    }

    #[test]
    fn test_apply_effects() {
        let mut bonuses = BonusSystem::new();
        let mut control = FixedMultiplier(1.5);

        assert_eq!(bonuses.apply_effects(21, &mut control), 21);
        assert_eq!(control.multiplier(), 1.5);

        bonuses.activate(PowerUpKind::DoubleDamage);
        bonuses.activate(PowerUpKind::ComboBoost);
        assert_eq!(bonuses.apply_effects(21, &mut control), 42);
        assert_eq!(control.multiplier(), 2.5);
    }

    #[test]
    fn test_activation_rate() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut bonuses = BonusSystem::new();
        let rounds = 20_000;
        for _ in 0..rounds {
            bonuses.check_activation(&mut rng);
        }
        // Five independent 5% rolls per round
        let per_round = bonuses.history().len() as f64 / rounds as f64;
        assert!((per_round - 0.25).abs() < 0.02, "per_round = {per_round}");
    }
}
