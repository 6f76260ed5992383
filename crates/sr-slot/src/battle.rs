//! Boss-battle session
//!
//! Wraps a [`SlotEngine`] with the wallet, player health, power-ups and the
//! world/boss progression. Each [`BattleSession::play_round`] is one paid (or
//! free) spin followed by the boss's counterattack.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bonus::{ActiveBonus, BonusSystem, PowerUpKind};
use crate::engine::SlotEngine;
use crate::error::{SlotError, SlotResult};
use crate::grid::Grid;
use crate::spin::SpinResult;

pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_SCORE: u64 = 100;
pub const DEFAULT_BET: u64 = 10;
pub const MIN_BET: u64 = 1;
pub const MAX_BET: u64 = 100;

/// Score per point of damage dealt
pub const SCORE_PER_DAMAGE: u64 = 10;
pub const JACKPOT_SCORE: u64 = 5000;
pub const JACKPOT_FREE_SPINS: u32 = 10;
pub const BOSS_DEFEAT_SCORE: u64 = 1000;
pub const BOSS_DEFEAT_FREE_SPINS: u32 = 5;
pub const HEALING_AMOUNT: u32 = 30;
pub const MULTI_SPIN_FREE_SPINS: u32 = 3;

/// Boss stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boss {
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
}

impl Boss {
    pub fn new(name: impl Into<String>, health: u32, attack: u32) -> Self {
        Self {
            name: name.into(),
            health,
            max_health: health,
            attack,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// World with its guardian boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    pub boss: Boss,
}

impl World {
    /// Shipped world progression
    pub fn campaign() -> Vec<World> {
        vec![
            World {
                name: "Mechanical Foundry".to_string(),
                boss: Boss::new("Mechanical Spider", 100, 15),
            },
            World {
                name: "Steam Gardens".to_string(),
                boss: Boss::new("Steam Golem", 150, 20),
            },
            World {
                name: "Sky Fortress".to_string(),
                boss: Boss::new("Airship Captain", 200, 25),
            },
        ]
    }
}

/// Session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    InProgress,
    Victory,
    Defeat,
}

/// What the boss did at the end of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAttack {
    Hit { damage: u32 },
    Blocked,
}

/// Everything that happened in one round
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub spin: SpinResult,
    pub used_free_spin: bool,
    /// Damage after power-up modifiers
    pub damage_dealt: u32,
    pub score_gained: u64,
    pub jackpot: bool,
    pub power_ups: Vec<ActiveBonus>,
    pub expired_bonuses: Vec<u64>,
    /// Name of the boss defeated this round
    pub boss_defeated: Option<String>,
    pub boss_attack: Option<BossAttack>,
    pub status: BattleStatus,
}

/// Player wallet, health and world progression around a slot engine
pub struct BattleSession {
    engine: SlotEngine,
    bonuses: BonusSystem,
    rng: StdRng,
    worlds: Vec<World>,
    current_world: usize,
    player_health: u32,
    max_health: u32,
    score: u64,
    bet: u64,
    free_spins: u32,
    status: BattleStatus,
}

impl BattleSession {
    /// New session on the standard engine and campaign
    pub fn new() -> Self {
        Self::with_engine(SlotEngine::new())
    }

    pub fn with_engine(engine: SlotEngine) -> Self {
        Self {
            engine,
            bonuses: BonusSystem::new(),
            rng: StdRng::from_os_rng(),
            worlds: World::campaign(),
            current_world: 0,
            player_health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            score: STARTING_SCORE,
            bet: DEFAULT_BET,
            free_spins: 0,
            status: BattleStatus::InProgress,
        }
    }

    /// Seed both the engine and the power-up rolls
    pub fn seed(&mut self, seed: u64) {
        self.engine.seed(seed);
        self.rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn engine(&self) -> &SlotEngine {
        &self.engine
    }

    pub fn bonuses(&self) -> &BonusSystem {
        &self.bonuses
    }

    pub fn current_world(&self) -> &World {
        &self.worlds[self.current_world]
    }

    /// Zero-based world index
    pub fn world_index(&self) -> usize {
        self.current_world
    }

    pub fn current_boss(&self) -> &Boss {
        &self.current_world().boss
    }

    pub fn player_health(&self) -> u32 {
        self.player_health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn free_spins(&self) -> u32 {
        self.free_spins
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    /// Set the bet, clamped to [`MIN_BET`, `MAX_BET`]
    pub fn set_bet(&mut self, bet: u64) -> u64 {
        self.bet = bet.clamp(MIN_BET, MAX_BET);
        self.bet
    }

    /// Whether the next round can be paid for
    pub fn can_spin(&self) -> bool {
        self.status == BattleStatus::InProgress && (self.free_spins > 0 || self.score >= self.bet)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUNDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play one round with a random spin
    pub fn play_round(&mut self) -> SlotResult<RoundReport> {
        self.run_round(None)
    }

    /// Play one round on a fixed grid
    pub fn play_round_forced(&mut self, grid: Grid) -> SlotResult<RoundReport> {
        self.run_round(Some(grid))
    }

    fn run_round(&mut self, grid: Option<Grid>) -> SlotResult<RoundReport> {
        if self.status != BattleStatus::InProgress {
            return Err(SlotError::BattleOver);
        }
        let used_free_spin = self.pay_for_spin()?;
        let score_before = self.score;

        let spin = match grid {
            Some(grid) => self.engine.spin_forced(grid),
            None => self.engine.spin(),
        };

        let mut damage_dealt = 0;
        let mut jackpot = false;
        let mut boss_defeated = None;

        if spin.is_win() {
            damage_dealt = self.bonuses.apply_effects(spin.total_damage, &mut self.engine);
            boss_defeated = self.damage_boss(damage_dealt);
            self.score += damage_dealt as u64 * SCORE_PER_DAMAGE;

            if spin.is_jackpot {
                jackpot = true;
                self.score += JACKPOT_SCORE;
                self.free_spins += JACKPOT_FREE_SPINS;
                self.engine.reset_jackpot();
                log::info!("Jackpot! +{JACKPOT_SCORE} score, +{JACKPOT_FREE_SPINS} free spins");
            }
        }

        let power_ups = self.bonuses.check_activation(&mut self.rng);
        for bonus in &power_ups {
            self.apply_power_up(bonus.kind);
        }
        let expired_bonuses = self.bonuses.tick();

        let boss_attack = if self.status == BattleStatus::InProgress && self.current_boss().is_alive() {
            Some(self.boss_attack())
        } else {
            None
        };

        Ok(RoundReport {
            spin,
            used_free_spin,
            damage_dealt,
            score_gained: self.score.saturating_sub(score_before),
            jackpot,
            power_ups,
            expired_bonuses,
            boss_defeated,
            boss_attack,
            status: self.status,
        })
    }

    fn pay_for_spin(&mut self) -> SlotResult<bool> {
        if self.free_spins > 0 {
            self.free_spins -= 1;
            return Ok(true);
        }
        if self.score < self.bet {
            return Err(SlotError::InsufficientFunds {
                bet: self.bet,
                score: self.score,
            });
        }
        self.score -= self.bet;
        Ok(false)
    }

    fn damage_boss(&mut self, damage: u32) -> Option<String> {
        let boss = &mut self.worlds[self.current_world].boss;
        if !boss.is_alive() {
            return None;
        }
        boss.health = boss.health.saturating_sub(damage);
        if boss.is_alive() {
            return None;
        }

        let name = boss.name.clone();
        self.score += BOSS_DEFEAT_SCORE;
        self.free_spins += BOSS_DEFEAT_FREE_SPINS;
        log::info!("{name} defeated");

        if self.current_world + 1 < self.worlds.len() {
            self.current_world += 1;
            let world = &mut self.worlds[self.current_world];
            world.boss.health = world.boss.max_health;
            log::info!("Entering {}", world.name);
        } else {
            self.status = BattleStatus::Victory;
            log::info!("All bosses defeated");
        }
        Some(name)
    }

    fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::SteamHealing => {
                self.player_health = (self.player_health + HEALING_AMOUNT).min(self.max_health);
            }
            PowerUpKind::MultiSpin => {
                self.free_spins += MULTI_SPIN_FREE_SPINS;
            }
            PowerUpKind::DoubleDamage | PowerUpKind::MechanicalShield | PowerUpKind::ComboBoost => {}
        }
    }

    fn boss_attack(&mut self) -> BossAttack {
        if self.bonuses.is_active(PowerUpKind::MechanicalShield) {
            return BossAttack::Blocked;
        }
        let damage = self.current_boss().attack;
        self.player_health = self.player_health.saturating_sub(damage);
        if self.player_health == 0 {
            self.status = BattleStatus::Defeat;
            log::info!("Player defeated by {}", self.current_boss().name);
        }
        BossAttack::Hit { damage }
    }
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Symbol, SymbolTable};

    fn sym(name: &str) -> Symbol {
        SymbolTable::standard().get(name).cloned().unwrap()
    }

    /// Single Gear run on row 3, 40 damage
    fn gear_grid() -> Grid {
        let [sh, a, c, p, po, b, g] = ["Shield", "Armor", "Crystal", "Pipe", "Potion", "Button", "Gear"].map(sym);
        Grid::from_rows([
            [sh.clone(), a.clone(), c.clone(), p.clone(), po.clone()],
            [c.clone(), p.clone(), po.clone(), b.clone(), sh.clone()],
            [po.clone(), b.clone(), sh.clone(), a, c.clone()],
            [g.clone(), g.clone(), g.clone(), g.clone(), g],
            [c, p, po, b, sh],
        ])
    }

    #[test]
    fn test_new_session() {
        let session = BattleSession::new();
        assert_eq!(session.score(), 100);
        assert_eq!(session.bet(), 10);
        assert_eq!(session.player_health(), 100);
        assert_eq!(session.current_boss().name, "Mechanical Spider");
        assert!(session.can_spin());
    }

    #[test]
    fn test_bet_is_clamped() {
        let mut session = BattleSession::new();
        assert_eq!(session.set_bet(0), 1);
        assert_eq!(session.set_bet(500), 100);
    }

    #[test]
    fn test_insufficient_funds() {
        let mut session = BattleSession::new();
        session.score = 5;
        assert!(matches!(
            session.play_round(),
            Err(SlotError::InsufficientFunds { bet: 10, score: 5 })
        ));

        session.free_spins = 1;
        let report = session.play_round().unwrap();
        assert!(report.used_free_spin);
    }

    #[test]
    fn test_winning_round_damages_boss() {
        let mut session = BattleSession::new();
        session.seed(3);
        let report = session.play_round_forced(gear_grid()).unwrap();

        assert_eq!(report.damage_dealt, 40);
        assert_eq!(session.worlds[0].boss.health, 60);
        assert!(report.jackpot);
        assert!(report.score_gained >= 400 + JACKPOT_SCORE);
        assert_eq!(session.engine().jackpot_progress(), 0);
    }

    #[test]
    fn test_boss_defeat_advances_world() {
        let mut session = BattleSession::new();
        session.seed(9);
        session.worlds[0].boss.health = 10;

        let report = session.play_round_forced(gear_grid()).unwrap();
        assert_eq!(report.boss_defeated.as_deref(), Some("Mechanical Spider"));
        assert_eq!(session.world_index(), 1);
        assert_eq!(session.current_boss().health, 150);
        assert!(session.free_spins() >= BOSS_DEFEAT_FREE_SPINS + JACKPOT_FREE_SPINS);
    }

    #[test]
    fn test_victory_ends_battle() {
        let mut session = BattleSession::new();
        session.current_world = 2;
        session.worlds[2].boss.health = 1;

        let report = session.play_round_forced(gear_grid()).unwrap();
        assert_eq!(report.status, BattleStatus::Victory);
        assert!(report.boss_attack.is_none());
        assert!(matches!(session.play_round(), Err(SlotError::BattleOver)));
    }

    #[test]
    fn test_defeat_when_health_runs_out() {
        let mut session = BattleSession::new();
        session.seed(21);
        session.player_health = 1;

        for _ in 0..1000 {
            if session.status() != BattleStatus::InProgress {
                break;
            }
            session.free_spins = 1;
            let report = session.play_round().unwrap();
            if report.status == BattleStatus::Defeat {
                assert!(matches!(report.boss_attack, Some(BossAttack::Hit { .. })));
            }
        }
        assert_ne!(session.status(), BattleStatus::InProgress);
        if session.status() == BattleStatus::Defeat {
            assert_eq!(session.player_health(), 0);
            assert!(matches!(session.play_round(), Err(SlotError::BattleOver)));
        }
    }
}
