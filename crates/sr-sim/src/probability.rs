//! Closed-form line odds
//!
//! Every cell of a line is treated as an independent draw, and every payline
//! as independent of the others. Both assumptions ignore shared cells and
//! overlapping runs, so the figures are balancing estimates rather than
//! exact combinatorics.

use serde::{Deserialize, Serialize};
use sr_slot::{LINE_LENGTH, MIN_MATCH_LENGTH, SlotConfig, SymbolTable, length_multiplier};

/// Per-symbol run odds on a single line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLineOdds {
    pub symbol: String,
    pub exactly3: f64,
    pub exactly4: f64,
    pub exactly5: f64,
    pub at_least3: f64,
}

/// Jackpot-symbol odds per spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JackpotOdds {
    pub per_spin: f64,
    /// Infinite when the symbol can never line up
    pub expected_spins_to_jackpot: f64,
}

/// Odds model over a symbol table and a payline count
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityModel {
    symbols: SymbolTable,
    payline_count: usize,
    min_match_length: usize,
    jackpot_symbol: String,
}

impl ProbabilityModel {
    pub fn new(symbols: SymbolTable, payline_count: usize) -> Self {
        Self {
            symbols,
            payline_count,
            min_match_length: MIN_MATCH_LENGTH,
            jackpot_symbol: "Crystal".to_string(),
        }
    }

    /// Shipped table over the 20 live paylines
    pub fn standard() -> Self {
        Self::from_config(&SlotConfig::standard())
    }

    pub fn from_config(config: &SlotConfig) -> Self {
        Self {
            symbols: config.symbols.clone(),
            payline_count: config.paylines.len(),
            min_match_length: config.rules.min_match_length,
            jackpot_symbol: config.rules.jackpot_symbol.clone(),
        }
    }

    /// Same paylines and rules over another table
    pub fn with_symbols(&self, symbols: SymbolTable) -> Self {
        Self {
            symbols,
            ..self.clone()
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn payline_count(&self) -> usize {
        self.payline_count
    }

    pub fn min_match_length(&self) -> usize {
        self.min_match_length
    }

    /// Rarity of a symbol, 0 if unknown
    pub fn symbol_probability(&self, name: &str) -> f64 {
        self.symbols.get(name).map_or(0.0, |s| s.rarity)
    }

    /// Probability of a run of exactly `length` on one line.
    ///
    /// A full-line run has no terminating mismatch, so it is `p^5`; shorter
    /// runs carry one `(1 - p)` factor.
    pub fn match_probability(&self, name: &str, length: usize) -> f64 {
        if length == 0 || length > LINE_LENGTH {
            return 0.0;
        }
        let p = self.symbol_probability(name);
        let run = p.powi(length as i32);
        if length == LINE_LENGTH { run } else { run * (1.0 - p) }
    }

    /// Sum of [`match_probability`](Self::match_probability) from `min_length` to a full line
    pub fn at_least_match_probability(&self, name: &str, min_length: usize) -> f64 {
        (min_length.max(1)..=LINE_LENGTH)
            .map(|length| self.match_probability(name, length))
            .sum()
    }

    /// Run odds for every symbol, in table order
    pub fn payline_probabilities(&self) -> Vec<SymbolLineOdds> {
        self.symbols
            .iter()
            .map(|s| SymbolLineOdds {
                symbol: s.name.clone(),
                exactly3: self.match_probability(&s.name, 3),
                exactly4: self.match_probability(&s.name, 4),
                exactly5: self.match_probability(&s.name, 5),
                at_least3: self.at_least_match_probability(&s.name, self.min_match_length),
            })
            .collect()
    }

    /// Chance that one line pays, summed over symbols
    pub fn single_payline_win_probability(&self) -> f64 {
        self.symbols
            .iter()
            .map(|s| self.at_least_match_probability(&s.name, self.min_match_length))
            .sum()
    }

    /// Chance that at least one payline pays
    pub fn overall_win_probability(&self) -> f64 {
        let single = self.single_payline_win_probability();
        1.0 - (1.0 - single).powi(self.payline_count as i32)
    }

    /// Expected base damage per spin across all paylines
    pub fn expected_damage(&self) -> f64 {
        let per_line: f64 = self
            .symbols
            .iter()
            .map(|s| {
                (self.min_match_length..=LINE_LENGTH)
                    .map(|length| {
                        self.match_probability(&s.name, length) * s.damage as f64 * length_multiplier(length)
                    })
                    .sum::<f64>()
            })
            .sum();
        per_line * self.payline_count as f64
    }

    /// Return-to-player percentage; 0 for a non-positive spin cost
    pub fn rtp(&self, spin_cost: f64, damage_to_points: f64) -> f64 {
        if spin_cost <= 0.0 {
            return 0.0;
        }
        self.expected_damage() * damage_to_points / spin_cost * 100.0
    }

    /// RTP at unit cost and unit damage value
    pub fn default_rtp(&self) -> f64 {
        self.rtp(1.0, 1.0)
    }

    /// Chance of a paying jackpot-symbol run on any payline
    pub fn jackpot_probability(&self) -> JackpotOdds {
        let line = self.at_least_match_probability(&self.jackpot_symbol, self.min_match_length);
        let per_spin = 1.0 - (1.0 - line).powi(self.payline_count as i32);
        let expected_spins_to_jackpot = if per_spin > 0.0 { 1.0 / per_spin } else { f64::INFINITY };
        JackpotOdds {
            per_spin,
            expected_spins_to_jackpot,
        }
    }
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_match_probability() {
        let model = ProbabilityModel::standard();
        // Crystal, p = 0.1
        assert_relative_eq!(model.match_probability("Crystal", 3), 0.0009, max_relative = 1e-9);
        assert_relative_eq!(model.match_probability("Crystal", 4), 0.00009, max_relative = 1e-9);
        assert_relative_eq!(model.match_probability("Crystal", 5), 0.00001, max_relative = 1e-9);
        assert_eq!(model.match_probability("Crystal", 6), 0.0);
        assert_eq!(model.match_probability("Ruby", 3), 0.0);
    }

    #[test]
    fn test_at_least_sums_lengths() {
        let model = ProbabilityModel::standard();
        let expected = 0.0009 + 0.00009 + 0.00001;
        assert_abs_diff_eq!(model.at_least_match_probability("Crystal", 3), expected, epsilon = 1e-12);

        let odds = model.payline_probabilities();
        assert_eq!(odds.len(), 8);
        assert_eq!(odds[0].symbol, "Crystal");
        assert_abs_diff_eq!(odds[0].at_least3, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_overall_win_probability_in_unit_interval() {
        let model = ProbabilityModel::standard();
        assert_eq!(model.payline_count(), 20);
        let p = model.overall_win_probability();
        assert!(p > 0.0 && p < 1.0, "p = {p}");
        assert!(p > model.single_payline_win_probability());
    }

    #[test]
    fn test_expected_damage_and_rtp() {
        let model = ProbabilityModel::standard();
        let one_line = ProbabilityModel::new(SymbolTable::standard(), 1);
        assert_relative_eq!(model.expected_damage(), one_line.expected_damage() * 20.0, max_relative = 1e-12);

        // Each symbol contributes p^3(1-p)d + p^4(1-p)1.5d + p^5 2d
        let half = ProbabilityModel::new(
            SymbolTable::new(vec![
                sr_slot::Symbol::new("A", 10, 0.5, sr_slot::SymbolKind::Magic),
                sr_slot::Symbol::new("B", 20, 0.5, sr_slot::SymbolKind::Attack),
            ])
            .unwrap(),
            1,
        );
        let weight = 0.0625 + 0.03125 * 1.5 + 0.03125 * 2.0;
        assert_relative_eq!(half.expected_damage(), weight * 30.0, max_relative = 1e-12);

        let expected = model.expected_damage();
        assert_relative_eq!(model.rtp(1.0, 1.0), expected * 100.0, max_relative = 1e-12);
        assert_relative_eq!(model.rtp(10.0, 2.0), expected * 20.0, max_relative = 1e-12);
        assert_eq!(model.rtp(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_jackpot_probability() {
        let model = ProbabilityModel::standard();
        let odds = model.jackpot_probability();
        let line = model.at_least_match_probability("Crystal", 3);
        assert_relative_eq!(odds.per_spin, 1.0 - (1.0 - line).powi(20), max_relative = 1e-12);
        assert_relative_eq!(odds.expected_spins_to_jackpot * odds.per_spin, 1.0, max_relative = 1e-12);
    }
}
