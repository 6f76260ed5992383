//! # sr-slot: SteamReels grid & payline engine
//!
//! A 5×5 slot grid of weighted steampunk symbols, scanned along 20 paylines
//! for runs of three or more. Wins drive a combo multiplier and a jackpot
//! meter; a boss-battle session and a power-up system sit on top.
//!
//! ## Architecture
//!
//! ```text
//! SlotConfig (SymbolTable + PaylineSet + GameRules)
//!     │
//!     v
//! SlotEngine ── generate_grid → analyze_paylines → update_combo
//!     │                         → update_jackpot → score_spin
//!     │
//!     ├── SpinResult (per-spin snapshot)
//!     ├── GameSnapshot (save / restore)
//!     └── MultiplierControl ◄── BonusSystem
//!                                   │
//!                              BattleSession (wallet, bosses, worlds)
//! ```

pub mod battle;
pub mod bonus;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod spin;
pub mod state;
pub mod symbols;

pub use battle::*;
pub use bonus::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use spin::*;
pub use state::*;
pub use symbols::*;
