//! Cross-check the closed-form odds against simulation

use serde::{Deserialize, Serialize};

use crate::probability::ProbabilityModel;
use crate::simulation::Simulator;

/// Spins simulated for a validation run
pub const VALIDATION_SPINS: u64 = 50_000;

/// Default allowed gap between theoretical and simulated win rate
pub const DEFAULT_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub theoretical_win_rate: f64,
    pub simulated_win_rate: f64,
    pub difference: f64,
    pub tolerance: f64,
    pub message: String,
}

/// Compare the model's overall win probability with a simulated win rate
pub fn validate_calculations(model: &ProbabilityModel, simulator: &Simulator, tolerance: f64) -> ValidationReport {
    let simulated = simulator.simulate_spins(VALIDATION_SPINS).win_rate;
    let theoretical = model.overall_win_probability();
    let difference = (theoretical - simulated).abs();
    let is_valid = difference <= tolerance;

    let message = if is_valid {
        "Probability calculations are valid".to_string()
    } else {
        format!("Probability calculations may need adjustment (difference: {difference:.4})")
    };
    if !is_valid {
        log::warn!("{message}");
    }

    ValidationReport {
        is_valid,
        theoretical_win_rate: theoretical,
        simulated_win_rate: simulated,
        difference,
        tolerance,
        message,
    }
}
