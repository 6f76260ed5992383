//! Slot engine configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::paytable::{MIN_MATCH_LENGTH, PaylineSet};
use crate::symbols::SymbolTable;

/// Scoring and meter rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Shortest run that pays
    pub min_match_length: usize,
    /// Consecutive winning spins per multiplier step
    pub combo_step: u32,
    /// Multiplier gained per completed combo step
    pub multiplier_step: f64,
    /// Multiplier cap
    pub max_multiplier: f64,
    /// Symbol whose paying run fills the jackpot meter instantly
    pub jackpot_symbol: String,
    /// Jackpot meter capacity; reaching it triggers the jackpot
    pub jackpot_max: u32,
    /// Per-cell meter gain is `floor((1 - rarity) * jackpot_scale)`
    pub jackpot_scale: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_match_length: MIN_MATCH_LENGTH,
            combo_step: 3,
            multiplier_step: 0.5,
            max_multiplier: 5.0,
            jackpot_symbol: "Crystal".to_string(),
            jackpot_max: 100,
            jackpot_scale: 10.0,
        }
    }
}

impl GameRules {
    /// Multiplier for a combo count
    pub fn multiplier_for_combo(&self, combo_count: u32) -> f64 {
        let steps = (combo_count / self.combo_step.max(1)) as f64;
        (1.0 + steps * self.multiplier_step).min(self.max_multiplier)
    }

    /// Clamp a multiplier into [1.0, max_multiplier]
    pub fn clamp_multiplier(&self, multiplier: f64) -> f64 {
        if multiplier.is_finite() {
            multiplier.clamp(1.0, self.max_multiplier)
        } else {
            1.0
        }
    }

    fn validate(&self) -> SlotResult<()> {
        if self.min_match_length < 2 {
            return Err(SlotError::InvalidRule {
                rule: "min_match_length",
                reason: format!("must be at least 2, got {}", self.min_match_length),
            });
        }
        if self.combo_step == 0 {
            return Err(SlotError::InvalidRule {
                rule: "combo_step",
                reason: "must be positive".to_string(),
            });
        }
        if !self.max_multiplier.is_finite() || self.max_multiplier < 1.0 {
            return Err(SlotError::InvalidRule {
                rule: "max_multiplier",
                reason: format!("must be >= 1.0, got {}", self.max_multiplier),
            });
        }
        if !self.multiplier_step.is_finite() || self.multiplier_step < 0.0 {
            return Err(SlotError::InvalidRule {
                rule: "multiplier_step",
                reason: format!("must be >= 0.0, got {}", self.multiplier_step),
            });
        }
        if !self.jackpot_scale.is_finite() || self.jackpot_scale < 0.0 {
            return Err(SlotError::InvalidRule {
                rule: "jackpot_scale",
                reason: format!("must be >= 0.0, got {}", self.jackpot_scale),
            });
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Weighted symbol table
    #[serde(default)]
    pub symbols: SymbolTable,
    /// Paylines, evaluated in category order
    #[serde(default)]
    pub paylines: PaylineSet,
    /// Scoring rules
    #[serde(default)]
    pub rules: GameRules,
}

impl SlotConfig {
    /// Shipped symbol table, 20 paylines, default rules
    pub fn standard() -> Self {
        Self {
            symbols: SymbolTable::standard(),
            paylines: PaylineSet::standard(),
            rules: GameRules::default(),
        }
    }

    /// Check cross-references between the tables
    pub fn validate(&self) -> SlotResult<()> {
        self.rules.validate()?;
        if self.symbols.get(&self.rules.jackpot_symbol).is_none() {
            return Err(SlotError::UnknownJackpotSymbol {
                name: self.rules.jackpot_symbol.clone(),
            });
        }
        Ok(())
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text)?,
            _ => Self::from_json(&text)?,
        };
        log::info!(
            "Loaded config from {:?}: {} symbols, {} paylines",
            path,
            config.symbols.len(),
            config.paylines.len()
        );
        Ok(config)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::standard()
    }
}
