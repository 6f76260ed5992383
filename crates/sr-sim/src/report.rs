//! Full probability report

use serde::Serialize;
use sr_slot::{GRID_COLS, GRID_ROWS, GRID_SIZE};

use crate::probability::{JackpotOdds, ProbabilityModel, SymbolLineOdds};
use crate::simulation::{SimulationResults, Simulator};

/// Spins simulated for a report
pub const REPORT_SPINS: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
    pub total_positions: usize,
    pub min_match_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolProbability {
    pub symbol: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityReport {
    pub symbol_probabilities: Vec<SymbolProbability>,
    pub theoretical_win_rate: f64,
    pub simulated_win_rate: f64,
    pub expected_damage_per_spin: f64,
    pub simulated_average_damage: f64,
    pub rtp: f64,
    pub jackpot_probability: JackpotOdds,
    pub payline_probabilities: Vec<SymbolLineOdds>,
    pub simulation_results: SimulationResults,
    pub total_paylines: usize,
    pub grid_configuration: GridShape,
}

impl ProbabilityReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Assemble closed-form figures and a `spins`-spin simulation
pub fn generate_probability_report(model: &ProbabilityModel, simulator: &Simulator, spins: u64) -> ProbabilityReport {
    let simulation = simulator.simulate_spins(spins);

    ProbabilityReport {
        symbol_probabilities: model
            .symbols()
            .iter()
            .map(|s| SymbolProbability {
                symbol: s.name.clone(),
                probability: s.rarity,
            })
            .collect(),
        theoretical_win_rate: model.overall_win_probability(),
        simulated_win_rate: simulation.win_rate,
        expected_damage_per_spin: model.expected_damage(),
        simulated_average_damage: simulation.average_damage,
        rtp: model.default_rtp(),
        jackpot_probability: model.jackpot_probability(),
        payline_probabilities: model.payline_probabilities(),
        simulation_results: SimulationResults::clone(&simulation),
        total_paylines: model.payline_count(),
        grid_configuration: GridShape {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            total_positions: GRID_SIZE,
            min_match_length: model.min_match_length(),
        },
    }
}
