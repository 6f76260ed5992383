//! Grid & payline engine: the single spin state transition

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::SlotResult;
use crate::grid::Grid;
use crate::paytable::{LineAnalysis, LineWin, Payline};
use crate::spin::{SpinResult, collect_winning_positions};
use crate::state::GameSnapshot;
use crate::symbols::Symbol;

/// Write access to the combo multiplier for collaborators.
///
/// The engine keeps ownership of the value and its bounds; callers only
/// request adjustments.
pub trait MultiplierControl {
    /// Current multiplier
    fn multiplier(&self) -> f64;

    /// Request a relative change; returns the multiplier actually applied
    fn adjust_multiplier(&mut self, delta: f64) -> f64;
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub winning_spins: u64,
    pub losing_spins: u64,
    pub total_damage: u64,
    pub jackpots_triggered: u64,
    pub best_combo: u32,
    pub best_spin_damage: u32,
}

impl SessionStats {
    /// Percentage of spins with at least one win
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.winning_spins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// 5×5 slot engine
///
/// Owns the grid, the last analysis pass, and the combo and jackpot meters.
/// All mutation goes through [`spin`](Self::spin), the explicit resets, and
/// [`load_game_state`](Self::load_game_state).
pub struct SlotEngine {
    /// Configuration
    config: SlotConfig,
    /// Random number generator
    rng: StdRng,
    /// Current grid (`None` before the first spin)
    grid: Option<Grid>,
    /// Wins found by the most recent analysis
    winning_combinations: Vec<LineWin>,
    /// Paylines that produced a win
    active_paylines: Vec<Payline>,
    /// Combo multiplier
    multiplier: f64,
    /// Consecutive winning spins
    combo_count: u32,
    /// Jackpot meter
    jackpot_progress: u32,
    /// Damage of the most recent spin
    total_damage: u32,
    /// Current session stats
    stats: SessionStats,
}

impl SlotEngine {
    /// Create a new engine with the standard config
    pub fn new() -> Self {
        Self::with_config(SlotConfig::standard())
    }

    /// Create with specific config
    pub fn with_config(config: SlotConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
            grid: None,
            winning_combinations: Vec::new(),
            active_paylines: Vec::new(),
            multiplier: 1.0,
            combo_count: 0,
            jackpot_progress: 0,
            total_damage: 0,
            stats: SessionStats::default(),
        }
    }

    /// Create with a validated config
    pub fn try_with_config(config: SlotConfig) -> SlotResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get current config
    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Get session stats
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn winning_combinations(&self) -> &[LineWin] {
        &self.winning_combinations
    }

    pub fn active_paylines(&self) -> &[Payline] {
        &self.active_paylines
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn jackpot_progress(&self) -> u32 {
        self.jackpot_progress
    }

    pub fn total_damage(&self) -> u32 {
        self.total_damage
    }

    /// Symbol at a row/column of the current grid
    pub fn symbol_at(&self, row: usize, col: usize) -> Option<&Symbol> {
        self.grid.as_ref()?.at(row, col)
    }

    /// Overwrite one cell of the current grid
    pub fn set_symbol_at(&mut self, row: usize, col: usize, symbol: Symbol) -> Option<Symbol> {
        self.grid.as_mut()?.set(row, col, symbol)
    }

    /// Unique winning cells of the most recent spin
    pub fn winning_positions(&self) -> Vec<usize> {
        collect_winning_positions(&self.winning_combinations)
    }

    /// Jackpot meter is full
    pub fn is_jackpot_triggered(&self) -> bool {
        self.jackpot_progress >= self.config.rules.jackpot_max
    }

    /// Empty the jackpot meter after payout
    pub fn reset_jackpot(&mut self) {
        self.jackpot_progress = 0;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN PIPELINE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Draw a fresh grid of independent symbols and store it
    pub fn generate_grid(&mut self) -> &Grid {
        let grid = Grid::random(&self.config.symbols, &mut self.rng);
        self.grid.insert(grid)
    }

    /// Run payline analysis on the current grid, replacing the previous pass
    pub fn analyze_paylines(&mut self) -> &[LineWin] {
        let analysis = match &self.grid {
            Some(grid) => self
                .config
                .paylines
                .evaluate(grid, self.config.rules.min_match_length),
            None => LineAnalysis::default(),
        };
        self.winning_combinations = analysis.wins;
        self.active_paylines = analysis.active_paylines;
        &self.winning_combinations
    }

    /// Advance or break the combo and recompute the multiplier
    pub fn update_combo(&mut self, has_win: bool) {
        if has_win {
            self.combo_count = self.combo_count.saturating_add(1);
            self.multiplier = self.config.rules.multiplier_for_combo(self.combo_count);
        } else {
            self.combo_count = 0;
            self.multiplier = 1.0;
        }
    }

    /// Accumulate jackpot progress from the grid and the current wins
    pub fn update_jackpot(&mut self) {
        let rules = &self.config.rules;

        if let Some(grid) = &self.grid {
            let gain: u32 = grid
                .iter()
                .map(|s| ((1.0 - s.rarity) * rules.jackpot_scale).floor().max(0.0) as u32)
                .fold(0u32, u32::saturating_add);
            self.jackpot_progress = self.jackpot_progress.saturating_add(gain);
        }

        let instant = self
            .winning_combinations
            .iter()
            .any(|w| w.symbol.name == rules.jackpot_symbol && w.length >= rules.min_match_length);
        if instant {
            self.jackpot_progress = rules.jackpot_max;
        }

        self.jackpot_progress = self.jackpot_progress.min(rules.jackpot_max);
    }

    /// Sum the current wins and apply the multiplier
    pub fn score_spin(&mut self) -> u32 {
        let base: u64 = self.winning_combinations.iter().map(|w| u64::from(w.damage)).sum();
        // Float-to-int casts saturate at u32::MAX
        self.total_damage = (base as f64 * self.multiplier).floor() as u32;
        self.total_damage
    }

    /// Execute a random spin
    pub fn spin(&mut self) -> SpinResult {
        let grid = Grid::random(&self.config.symbols, &mut self.rng);
        self.resolve_spin(grid)
    }

    /// Execute a spin on a caller-supplied grid.
    ///
    /// Identical to [`spin`](Self::spin) except that no symbols are drawn.
    pub fn spin_forced(&mut self, grid: Grid) -> SpinResult {
        self.resolve_spin(grid)
    }

    fn resolve_spin(&mut self, grid: Grid) -> SpinResult {
        self.grid = Some(grid.clone());
        let has_win = !self.analyze_paylines().is_empty();
        self.update_combo(has_win);
        self.update_jackpot();
        let total_damage = self.score_spin();

        let result = SpinResult {
            grid,
            wins: self.winning_combinations.clone(),
            active_paylines: self.active_paylines.clone(),
            total_damage,
            multiplier: self.multiplier,
            combo_count: self.combo_count,
            jackpot_progress: self.jackpot_progress,
            is_jackpot: self.is_jackpot_triggered(),
            winning_positions: self.winning_positions(),
        };

        self.update_stats(&result);
        if result.is_jackpot {
            log::debug!("Jackpot meter full ({})", self.jackpot_progress);
        }
        result
    }

    fn update_stats(&mut self, result: &SpinResult) {
        self.stats.total_spins += 1;
        self.stats.total_damage = self.stats.total_damage.saturating_add(u64::from(result.total_damage));

        if result.is_win() {
            self.stats.winning_spins += 1;
        } else {
            self.stats.losing_spins += 1;
        }
        if result.is_jackpot {
            self.stats.jackpots_triggered += 1;
        }
        self.stats.best_combo = self.stats.best_combo.max(result.combo_count);
        self.stats.best_spin_damage = self.stats.best_spin_damage.max(result.total_damage);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Snapshot the engine fields
    pub fn game_state(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.grid.clone().map(Vec::from),
            winning_combinations: self.winning_combinations.clone(),
            active_paylines: self.active_paylines.clone(),
            total_damage: self.total_damage,
            multiplier: self.multiplier,
            combo_count: self.combo_count,
            jackpot_progress: self.jackpot_progress,
        }
    }

    /// Restore engine fields from a snapshot.
    ///
    /// Out-of-range values are replaced by defaults or clamped; loading
    /// never fails.
    pub fn load_game_state(&mut self, snapshot: GameSnapshot) {
        let rules = &self.config.rules;

        self.grid = match snapshot.grid {
            Some(cells) => match Grid::from_cells(cells) {
                Ok(grid) => Some(grid),
                Err(e) => {
                    log::warn!("Discarding saved grid: {e}");
                    None
                }
            },
            None => None,
        };
        self.winning_combinations = snapshot.winning_combinations;
        self.active_paylines = snapshot.active_paylines;
        self.total_damage = snapshot.total_damage;

        if snapshot.multiplier.is_finite() && snapshot.multiplier > 0.0 {
            self.multiplier = rules.clamp_multiplier(snapshot.multiplier);
        } else {
            log::warn!("Invalid saved multiplier {}, using 1.0", snapshot.multiplier);
            self.multiplier = 1.0;
        }
        self.combo_count = snapshot.combo_count;
        self.jackpot_progress = snapshot.jackpot_progress.min(rules.jackpot_max);
    }
}

impl Default for SlotEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiplierControl for SlotEngine {
    fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn adjust_multiplier(&mut self, delta: f64) -> f64 {
        self.multiplier = self.config.rules.clamp_multiplier(self.multiplier + delta);
        self.multiplier
    }
}
