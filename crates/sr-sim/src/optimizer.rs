//! Hill-climbing search for a target RTP

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sr_slot::SymbolTable;

use crate::probability::ProbabilityModel;

pub const DEFAULT_TARGET_RTP: f64 = 95.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Stop once RTP is within this many points of the target
pub const RTP_TOLERANCE: f64 = 1.0;

/// Largest per-step rarity nudge in either direction
pub const MAX_STEP: f64 = 0.01;
pub const MIN_RARITY: f64 = 0.01;
pub const MAX_RARITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_distribution: SymbolTable,
    pub achieved_rtp: f64,
    pub target_rtp: f64,
    pub iterations: u32,
}

impl OptimizationResult {
    pub fn converged(&self) -> bool {
        (self.achieved_rtp - self.target_rtp).abs() <= RTP_TOLERANCE
    }
}

/// Random-perturbation optimizer over symbol rarities
#[derive(Debug, Clone)]
pub struct RtpOptimizer {
    target_rtp: f64,
    max_iterations: u32,
    seed: Option<u64>,
}

impl RtpOptimizer {
    pub fn new(target_rtp: f64, max_iterations: u32) -> Self {
        Self {
            target_rtp,
            max_iterations,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Nudge every rarity, renormalize, and keep the candidate only when its
    /// RTP lands closer to the target.
    pub fn optimize(&self, model: &ProbabilityModel) -> OptimizationResult {
        let mut rng = match self.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut best = model.symbols().clone();
        let mut best_rtp = model.default_rtp();
        let mut iterations = 0;

        while (best_rtp - self.target_rtp).abs() > RTP_TOLERANCE && iterations < self.max_iterations {
            iterations += 1;

            let Some(candidate) = perturb(&best, &mut rng) else {
                continue;
            };
            let rtp = model.with_symbols(candidate.clone()).default_rtp();

            if (rtp - self.target_rtp).abs() < (best_rtp - self.target_rtp).abs() {
                best = candidate;
                best_rtp = rtp;
            }
        }

        log::info!(
            "RTP optimization: {:.2}% after {iterations} iterations (target {:.2}%)",
            best_rtp,
            self.target_rtp
        );

        OptimizationResult {
            optimized_distribution: best,
            achieved_rtp: best_rtp,
            target_rtp: self.target_rtp,
            iterations,
        }
    }
}

impl Default for RtpOptimizer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_RTP, DEFAULT_MAX_ITERATIONS)
    }
}

fn perturb<R: Rng + ?Sized>(table: &SymbolTable, rng: &mut R) -> Option<SymbolTable> {
    let nudged: Vec<f64> = table
        .iter()
        .map(|s| (s.rarity + (rng.random::<f64>() - 0.5) * 2.0 * MAX_STEP).clamp(MIN_RARITY, MAX_RARITY))
        .collect();
    let total: f64 = nudged.iter().sum();
    let normalized: Vec<f64> = nudged.iter().map(|r| r / total).collect();
    table.with_rarities(&normalized).ok()
}
