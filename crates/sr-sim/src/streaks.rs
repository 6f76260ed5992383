//! Win/loss streak analysis over sequential spins

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::simulation::Simulator;

/// Streak statistics.
///
/// A streak is counted once it is broken by the opposite outcome; the streak
/// still running at the end of the sequence is left out of the averages and
/// distributions, but does count towards the maxima.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakAnalysis {
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub average_win_streak: f64,
    pub average_loss_streak: f64,
    /// Streak length → share of completed win streaks, in percent
    pub win_streak_distribution: BTreeMap<u32, f64>,
    /// Streak length → share of completed loss streaks, in percent
    pub loss_streak_distribution: BTreeMap<u32, f64>,
}

impl StreakAnalysis {
    /// Analyze a sequence of win (`true`) / loss (`false`) outcomes
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        let mut analysis = Self::default();
        let mut win_streaks = Vec::new();
        let mut loss_streaks = Vec::new();
        let mut wins = 0u32;
        let mut losses = 0u32;

        for won in outcomes {
            if won {
                if losses > 0 {
                    loss_streaks.push(losses);
                    losses = 0;
                }
                wins += 1;
                analysis.max_consecutive_wins = analysis.max_consecutive_wins.max(wins);
            } else {
                if wins > 0 {
                    win_streaks.push(wins);
                    wins = 0;
                }
                losses += 1;
                analysis.max_consecutive_losses = analysis.max_consecutive_losses.max(losses);
            }
        }

        analysis.average_win_streak = average(&win_streaks);
        analysis.average_loss_streak = average(&loss_streaks);
        analysis.win_streak_distribution = distribution(&win_streaks);
        analysis.loss_streak_distribution = distribution(&loss_streaks);
        analysis
    }
}

/// Simulate `spins` sequential spins and analyze their streaks
pub fn analyze_win_frequency(simulator: &Simulator, spins: u64) -> StreakAnalysis {
    StreakAnalysis::from_outcomes(simulator.spin_outcomes(spins))
}

fn average(streaks: &[u32]) -> f64 {
    if streaks.is_empty() {
        return 0.0;
    }
    streaks.iter().map(|&s| s as f64).sum::<f64>() / streaks.len() as f64
}

fn distribution(streaks: &[u32]) -> BTreeMap<u32, f64> {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for &streak in streaks {
        *counts.entry(streak).or_default() += 1;
    }
    let total = streaks.len() as f64;
    counts
        .into_iter()
        .map(|(length, count)| (length, count as f64 / total * 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_known_sequence() {
        // W W L W L L L W W W
        let outcomes = [true, true, false, true, false, false, false, true, true, true];
        let analysis = StreakAnalysis::from_outcomes(outcomes);

        assert_eq!(analysis.max_consecutive_wins, 3);
        assert_eq!(analysis.max_consecutive_losses, 3);
        // Completed win streaks: 2, 1 (trailing 3 is still running)
        assert_abs_diff_eq!(analysis.average_win_streak, 1.5);
        assert_abs_diff_eq!(analysis.average_loss_streak, 2.0);
        assert_eq!(analysis.win_streak_distribution.get(&1), Some(&50.0));
        assert_eq!(analysis.win_streak_distribution.get(&2), Some(&50.0));
        assert!(analysis.win_streak_distribution.get(&3).is_none());
        assert_eq!(analysis.loss_streak_distribution.get(&1), Some(&50.0));
        assert_eq!(analysis.loss_streak_distribution.get(&3), Some(&50.0));
    }

    #[test]
    fn test_empty_sequence() {
        let analysis = StreakAnalysis::from_outcomes(std::iter::empty());
        assert_eq!(analysis, StreakAnalysis::default());
    }

    #[test]
    fn test_distribution_sums_to_hundred() {
        let sim = Simulator::standard().with_seed(12);
        let analysis = analyze_win_frequency(&sim, 5_000);
        for dist in [&analysis.win_streak_distribution, &analysis.loss_streak_distribution] {
            if !dist.is_empty() {
                assert_abs_diff_eq!(dist.values().sum::<f64>(), 100.0, epsilon = 1e-9);
            }
        }
        assert!(analysis.max_consecutive_wins + analysis.max_consecutive_losses > 0);
    }
}
