//! Symbol definitions and weighted drawing

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Allowed drift of the summed rarities away from 1.0
pub const RARITY_TOLERANCE: f64 = 0.001;

/// Descriptive symbol tag. Not used by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Magic,
    Attack,
    Defense,
    Mechanical,
    Steam,
    Healing,
    Utility,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol name (e.g., "Crystal", "Gear")
    pub name: String,
    /// Base damage for a 3-symbol run
    pub damage: u32,
    /// Probability weight, 0 < rarity <= 1
    pub rarity: f64,
    /// Descriptive tag
    #[serde(rename = "type")]
    pub kind: SymbolKind,
}

impl Symbol {
    /// Create a symbol
    pub fn new(name: impl Into<String>, damage: u32, rarity: f64, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            damage,
            rarity,
            kind,
        }
    }
}

/// Ordered, weighted symbol table.
///
/// Table order is part of the drawing contract: cumulative weights are walked
/// front to back and the last entry absorbs any rounding slack below 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Build a table, rejecting malformed entries.
    ///
    /// A rarity sum that drifts from 1.0 is only logged.
    pub fn new(symbols: Vec<Symbol>) -> SlotResult<Self> {
        if symbols.is_empty() {
            return Err(SlotError::EmptySymbolTable);
        }

        for (i, symbol) in symbols.iter().enumerate() {
            if !symbol.rarity.is_finite() || symbol.rarity <= 0.0 || symbol.rarity > 1.0 {
                return Err(SlotError::InvalidRarity {
                    name: symbol.name.clone(),
                    rarity: symbol.rarity,
                });
            }
            if symbol.damage == 0 {
                return Err(SlotError::ZeroDamage {
                    name: symbol.name.clone(),
                });
            }
            if symbols[..i].iter().any(|s| s.name == symbol.name) {
                return Err(SlotError::DuplicateSymbol {
                    name: symbol.name.clone(),
                });
            }
        }

        let table = Self { symbols };
        let total = table.total_rarity();
        if !table.is_normalized() {
            log::warn!("Symbol rarities sum to {total}, expected 1.0");
        }
        Ok(table)
    }

    /// The shipped eight-symbol table
    pub fn standard() -> Self {
        Self {
            symbols: vec![
                Symbol::new("Crystal", 35, 0.10, SymbolKind::Magic),
                Symbol::new("Sword", 30, 0.15, SymbolKind::Attack),
                Symbol::new("Shield", 25, 0.15, SymbolKind::Defense),
                Symbol::new("Armor", 22, 0.10, SymbolKind::Defense),
                Symbol::new("Gear", 20, 0.20, SymbolKind::Mechanical),
                Symbol::new("Pipe", 15, 0.15, SymbolKind::Steam),
                Symbol::new("Potion", 10, 0.10, SymbolKind::Healing),
                Symbol::new("Button", 5, 0.05, SymbolKind::Utility),
            ],
        }
    }

    /// Sum of all rarity weights
    pub fn total_rarity(&self) -> f64 {
        self.symbols.iter().map(|s| s.rarity).sum()
    }

    /// Rarities sum to 1.0 within [`RARITY_TOLERANCE`]
    pub fn is_normalized(&self) -> bool {
        (self.total_rarity() - 1.0).abs() <= RARITY_TOLERANCE
    }

    /// Get symbol by name
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Symbols in table order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Pick the first symbol whose cumulative weight reaches `u`.
    ///
    /// `u` is expected in [0, 1); anything past the accumulated total falls
    /// through to the last entry.
    pub fn pick(&self, u: f64) -> &Symbol {
        let mut cumulative = 0.0;
        for symbol in &self.symbols {
            cumulative += symbol.rarity;
            if u <= cumulative {
                return symbol;
            }
        }
        // Non-empty by construction
        &self.symbols[self.symbols.len() - 1]
    }

    /// Draw one symbol by cumulative-weight sampling
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        let u: f64 = rng.random();
        self.pick(u).clone()
    }

    /// Return a copy with every rarity replaced, in table order.
    ///
    /// Used by balancing tools; the weights are not re-validated beyond
    /// the usual construction checks.
    pub fn with_rarities(&self, rarities: &[f64]) -> SlotResult<Self> {
        let symbols = self
            .symbols
            .iter()
            .zip(rarities.iter().chain(std::iter::repeat(&f64::NAN)))
            .map(|(s, &rarity)| Symbol {
                rarity,
                ..s.clone()
            })
            .collect();
        Self::new(symbols)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Symbol>> for SymbolTable {
    type Error = SlotError;

    fn try_from(symbols: Vec<Symbol>) -> SlotResult<Self> {
        Self::new(symbols)
    }
}

impl From<SymbolTable> for Vec<Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
