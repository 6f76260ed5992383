//! # sr-sim: balancing tools for the SteamReels grid
//!
//! Offline analysis over the same symbol table and paylines the live engine
//! uses:
//!
//! - **Closed-form odds**: per-line run probabilities, overall win rate,
//!   expected damage, RTP, jackpot odds
//! - **Monte Carlo**: batched parallel spins with memoized results
//! - **Validation**: theoretical vs simulated win rate
//! - **Streaks**: win/loss streak lengths over sequential spins
//! - **Optimizer**: hill-climbing over rarities towards a target RTP

pub mod optimizer;
pub mod probability;
pub mod report;
pub mod simulation;
pub mod streaks;
pub mod validation;

pub use optimizer::*;
pub use probability::*;
pub use report::*;
pub use simulation::*;
pub use streaks::*;
pub use validation::*;
