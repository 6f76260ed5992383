//! Monte Carlo spin simulation
//!
//! Spins are drawn in fixed-size batches spread over the rayon pool. Each
//! batch owns a `ChaCha8Rng` seeded from the base seed plus its batch index,
//! so a seeded run gives the same totals on any thread count.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sr_slot::{Grid, LINE_LENGTH, LineWin, PaylineSet, SlotConfig};

/// Spins per rayon task
pub const BATCH_SIZE: u64 = 4096;

/// Which lines the simulator scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationScope {
    /// Rows, columns and both diagonals (12 lines)
    #[default]
    Reduced,
    /// Every payline the live engine scores
    Live,
}

/// Aggregated simulation statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub total_spins: u64,
    /// Spins with at least one win
    pub total_wins: u64,
    pub win_rate: f64,
    /// Damage per spin
    pub average_damage: f64,
    pub average_damage_per_win: f64,
    /// Wins per spin, by symbol
    pub symbol_win_rates: BTreeMap<String, f64>,
    /// Wins of each run length per winning spin
    pub match_length_distribution: BTreeMap<usize, f64>,
}

/// One simulated spin
#[derive(Debug, Clone)]
pub struct SimulatedSpin {
    pub grid: Grid,
    pub wins: Vec<LineWin>,
    pub total_damage: u32,
}

impl SimulatedSpin {
    pub fn has_win(&self) -> bool {
        !self.wins.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct Tally {
    spins: u64,
    winning_spins: u64,
    total_damage: u64,
    symbol_wins: HashMap<String, u64>,
    length_counts: BTreeMap<usize, u64>,
}

impl Tally {
    fn record(&mut self, spin: &SimulatedSpin) {
        self.spins += 1;
        if !spin.has_win() {
            return;
        }
        self.winning_spins += 1;
        self.total_damage += spin.total_damage as u64;
        for win in &spin.wins {
            *self.symbol_wins.entry(win.symbol.name.clone()).or_default() += 1;
            *self.length_counts.entry(win.length).or_default() += 1;
        }
    }

    fn merge(mut self, other: Tally) -> Tally {
        self.spins += other.spins;
        self.winning_spins += other.winning_spins;
        self.total_damage += other.total_damage;
        for (name, count) in other.symbol_wins {
            *self.symbol_wins.entry(name).or_default() += count;
        }
        for (length, count) in other.length_counts {
            *self.length_counts.entry(length).or_default() += count;
        }
        self
    }
}

/// Batch spin simulator with a per-spin-count result cache
pub struct Simulator {
    config: SlotConfig,
    paylines: PaylineSet,
    scope: SimulationScope,
    seed: Option<u64>,
    cache: Mutex<HashMap<u64, Arc<SimulationResults>>>,
}

impl Simulator {
    /// Simulator over the reduced 12-line scope
    pub fn new(config: SlotConfig) -> Self {
        Self {
            config,
            paylines: PaylineSet::reduced(),
            scope: SimulationScope::Reduced,
            seed: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn standard() -> Self {
        Self::new(SlotConfig::standard())
    }

    /// Switch line scope; clears cached results
    pub fn with_scope(mut self, scope: SimulationScope) -> Self {
        self.paylines = match scope {
            SimulationScope::Reduced => PaylineSet::reduced(),
            SimulationScope::Live => self.config.paylines.clone(),
        };
        self.scope = scope;
        self.cache.get_mut().clear();
        self
    }

    /// Fix the base seed for reproducible runs; clears cached results
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.cache.get_mut().clear();
        self
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn scope(&self) -> SimulationScope {
        self.scope
    }

    pub fn paylines(&self) -> &PaylineSet {
        &self.paylines
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Drop every memoized result
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Draw and score one grid (base damage, no multiplier)
    pub fn simulate_single_spin<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulatedSpin {
        let grid = Grid::random(&self.config.symbols, rng);
        let analysis = self.paylines.evaluate(&grid, self.config.rules.min_match_length);
        let total_damage = analysis.base_damage();
        SimulatedSpin {
            grid,
            wins: analysis.wins,
            total_damage,
        }
    }

    /// Simulate `spins` independent spins, memoized by spin count
    pub fn simulate_spins(&self, spins: u64) -> Arc<SimulationResults> {
        if let Some(cached) = self.cache.lock().get(&spins) {
            return Arc::clone(cached);
        }

        let base_seed = self.base_seed();
        let batches = spins.div_ceil(BATCH_SIZE);
        log::debug!("Simulating {spins} spins in {batches} batches (scope {:?})", self.scope);

        let tally = (0..batches)
            .into_par_iter()
            .map(|batch| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(batch));
                let count = BATCH_SIZE.min(spins - batch * BATCH_SIZE);
                let mut tally = Tally::default();
                for _ in 0..count {
                    tally.record(&self.simulate_single_spin(&mut rng));
                }
                tally
            })
            .reduce(Tally::default, Tally::merge);

        let results = Arc::new(self.summarize(tally));
        self.cache.lock().insert(spins, Arc::clone(&results));
        results
    }

    /// Win/loss flags of `spins` sequential spins from one generator
    pub fn spin_outcomes(&self, spins: u64) -> Vec<bool> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed());
        (0..spins)
            .map(|_| self.simulate_single_spin(&mut rng).has_win())
            .collect()
    }

    fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }

    fn summarize(&self, tally: Tally) -> SimulationResults {
        let spins = tally.spins;
        let wins = tally.winning_spins;
        let per_spin = |count: u64| if spins > 0 { count as f64 / spins as f64 } else { 0.0 };
        let per_win = |count: u64| if wins > 0 { count as f64 / wins as f64 } else { 0.0 };

        let symbol_win_rates = self
            .config
            .symbols
            .iter()
            .map(|s| {
                let count = tally.symbol_wins.get(&s.name).copied().unwrap_or(0);
                (s.name.clone(), per_spin(count))
            })
            .collect();

        let match_length_distribution = (self.config.rules.min_match_length..=LINE_LENGTH)
            .map(|length| {
                let count = tally.length_counts.get(&length).copied().unwrap_or(0);
                (length, per_win(count))
            })
            .collect();

        SimulationResults {
            total_spins: spins,
            total_wins: wins,
            win_rate: per_spin(wins),
            average_damage: per_spin(tally.total_damage),
            average_damage_per_win: per_win(tally.total_damage),
            symbol_win_rates,
            match_length_distribution,
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_spins() {
        let sim = Simulator::standard().with_seed(1);
        let results = sim.simulate_spins(0);
        assert_eq!(results.total_spins, 0);
        assert_eq!(results.win_rate, 0.0);
        assert_eq!(results.average_damage, 0.0);
        assert_eq!(results.average_damage_per_win, 0.0);
        assert!(results.symbol_win_rates.values().all(|&r| r == 0.0));
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let a = Simulator::standard().with_seed(42).simulate_spins(10_000);
        let b = Simulator::standard().with_seed(42).simulate_spins(10_000);
        assert_eq!(a, b);
        assert_eq!(a.total_spins, 10_000);
    }

    #[test]
    fn test_results_are_memoized() {
        let sim = Simulator::standard();
        let first = sim.simulate_spins(2_000);
        let second = sim.simulate_spins(2_000);
        assert!(Arc::ptr_eq(&first, &second));

        sim.clear_cache();
        let third = sim.simulate_spins(2_000);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_scope_changes_line_count() {
        let reduced = Simulator::standard();
        assert_eq!(reduced.paylines().len(), 12);
        let live = Simulator::standard().with_scope(SimulationScope::Live);
        assert_eq!(live.paylines().len(), 20);
    }

    #[test]
    fn test_live_scope_wins_more_often() {
        let reduced = Simulator::standard().with_seed(8).simulate_spins(20_000);
        let live = Simulator::standard()
            .with_scope(SimulationScope::Live)
            .with_seed(8)
            .simulate_spins(20_000);
        // Same grids, strictly more lines
        assert!(live.total_wins >= reduced.total_wins);
        assert!(live.average_damage >= reduced.average_damage);
    }

    #[test]
    fn test_distribution_keys() {
        let results = Simulator::standard().with_seed(3).simulate_spins(5_000);
        assert_eq!(results.symbol_win_rates.len(), 8);
        assert_eq!(
            results.match_length_distribution.keys().copied().collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        assert!(results.win_rate > 0.0 && results.win_rate < 1.0);
    }
}
