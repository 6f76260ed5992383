//! Error types for configuration loading and the battle session

use thiserror::Error;

/// Slot engine error types
#[derive(Error, Debug)]
pub enum SlotError {
    /// Symbol table has no entries
    #[error("Symbol table is empty")]
    EmptySymbolTable,

    /// Two symbols share a name
    #[error("Duplicate symbol name: {name}")]
    DuplicateSymbol { name: String },

    /// Rarity weight outside (0, 1] or not finite
    #[error("Invalid rarity for {name}: {rarity} (expected 0 < rarity <= 1)")]
    InvalidRarity { name: String, rarity: f64 },

    /// Symbol that deals no damage
    #[error("Invalid damage for {name}: must be a positive integer")]
    ZeroDamage { name: String },

    /// Payline does not have exactly one cell per grid column
    #[error("Payline {index} has {got} cells, expected {expected}")]
    InvalidPaylineLength {
        index: usize,
        expected: usize,
        got: usize,
    },

    /// Payline references a cell outside the grid
    #[error("Payline {index} references cell {cell}, grid has {size} cells")]
    PaylineOutOfBounds {
        index: usize,
        cell: usize,
        size: usize,
    },

    /// Grid built from the wrong number of cells
    #[error("Invalid grid size: expected {expected} cells, got {got}")]
    InvalidGridSize { expected: usize, got: usize },

    /// Jackpot symbol missing from the symbol table
    #[error("Jackpot symbol not found in symbol table: {name}")]
    UnknownJackpotSymbol { name: String },

    /// Rule value out of range
    #[error("Invalid rule {rule}: {reason}")]
    InvalidRule { rule: &'static str, reason: String },

    /// Not enough score to cover the bet and no free spins left
    #[error("Insufficient funds: bet {bet}, score {score}")]
    InsufficientFunds { bet: u64, score: u64 },

    /// Battle already ended in defeat or victory
    #[error("Battle is over")]
    BattleOver,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result type for slot operations
pub type SlotResult<T> = Result<T, SlotError>;
