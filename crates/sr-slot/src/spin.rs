//! Spin result snapshot

use serde::{Deserialize, Serialize};

use crate::grid::{GRID_SIZE, Grid};
use crate::paytable::{LineWin, Payline};

/// Complete outcome of one spin, handed to renderers and UI layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResult {
    /// Final grid (row-major)
    pub grid: Grid,
    /// Every winning run, in payline evaluation order
    pub wins: Vec<LineWin>,
    /// Paylines with at least one win
    pub active_paylines: Vec<Payline>,
    /// Summed win damage scaled by the multiplier
    pub total_damage: u32,
    /// Multiplier applied to this spin
    pub multiplier: f64,
    /// Consecutive winning spins including this one
    pub combo_count: u32,
    /// Jackpot meter after this spin
    pub jackpot_progress: u32,
    /// Meter is full
    pub is_jackpot: bool,
    /// Unique winning cells, in first-seen order
    pub winning_positions: Vec<usize>,
}

impl SpinResult {
    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        !self.wins.is_empty()
    }

    /// Get win count
    pub fn win_count(&self) -> usize {
        self.wins.len()
    }

    /// Highest-damage win (first on ties)
    pub fn best_win(&self) -> Option<&LineWin> {
        self.wins
            .iter()
            .reduce(|best, w| if w.damage > best.damage { w } else { best })
    }
}

/// Unique cells across all wins, keeping first-seen order
pub fn collect_winning_positions(wins: &[LineWin]) -> Vec<usize> {
    let mut seen = [false; GRID_SIZE];
    let mut positions = Vec::new();
    for &pos in wins.iter().flat_map(|w| &w.positions) {
        if pos < GRID_SIZE && !seen[pos] {
            seen[pos] = true;
            positions.push(pos);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::{PaylineId, PaylineKind};
    use crate::symbols::SymbolTable;

    fn win(positions: Vec<usize>, damage: u32) -> LineWin {
        LineWin {
            line: PaylineId {
                kind: PaylineKind::Pattern,
                index: 0,
            },
            symbol: SymbolTable::standard().get("Gear").cloned().unwrap(),
            length: positions.len(),
            positions,
            damage,
        }
    }

    #[test]
    fn test_winning_positions_are_deduplicated() {
        let wins = vec![win(vec![10, 11, 12], 20), win(vec![2, 7, 12], 20), win(vec![12, 13, 14], 20)];
        assert_eq!(
            collect_winning_positions(&wins),
            vec![10, 11, 12, 2, 7, 13, 14]
        );
    }

    #[test]
    fn test_best_win() {
        let gear = SymbolTable::standard().get("Gear").cloned().unwrap();
        let result = SpinResult {
            grid: Grid::from_cells(vec![gear; GRID_SIZE]).unwrap(),
            wins: vec![win(vec![0, 1, 2], 20), win(vec![5, 6, 7, 8, 9], 40), win(vec![0, 5, 10], 40)],
            active_paylines: Vec::new(),
            total_damage: 100,
            multiplier: 1.0,
            combo_count: 1,
            jackpot_progress: 100,
            is_jackpot: true,
            winning_positions: Vec::new(),
        };
        assert_eq!(result.best_win().unwrap().positions, vec![5, 6, 7, 8, 9]);
        assert_eq!(result.win_count(), 3);
        assert!(result.is_win());
    }
}
