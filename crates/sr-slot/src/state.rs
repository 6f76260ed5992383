//! Save/restore snapshot of engine state
//!
//! Every field is optional on load: anything missing or malformed falls back
//! to its default instead of failing the whole restore.

use serde::{Deserialize, Serialize};

use crate::error::SlotResult;
use crate::paytable::{LineWin, Payline};
use crate::symbols::Symbol;

/// Plain snapshot of the engine fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Row-major grid; `None` before the first spin
    pub grid: Option<Vec<Symbol>>,
    /// Wins from the most recent spin
    pub winning_combinations: Vec<LineWin>,
    /// Paylines that won on the most recent spin
    pub active_paylines: Vec<Payline>,
    /// Damage of the most recent spin
    pub total_damage: u32,
    /// Combo multiplier
    pub multiplier: f64,
    /// Consecutive winning spins
    pub combo_count: u32,
    /// Jackpot meter
    pub jackpot_progress: u32,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            grid: None,
            winning_combinations: Vec::new(),
            active_paylines: Vec::new(),
            total_damage: 0,
            multiplier: 1.0,
            combo_count: 0,
            jackpot_progress: 0,
        }
    }
}

impl GameSnapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse JSON, substituting defaults field by field.
    ///
    /// Only input that is not a JSON object at all is an error.
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Build from an already-parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Self {
        let mut snapshot = Self::default();
        let serde_json::Value::Object(map) = value else {
            log::warn!("Saved state is not an object, using defaults");
            return snapshot;
        };

        fn field<T: serde::de::DeserializeOwned>(
            map: &serde_json::Map<String, serde_json::Value>,
            key: &str,
        ) -> Option<T> {
            let raw = map.get(key)?;
            if raw.is_null() {
                return None;
            }
            match serde_json::from_value(raw.clone()) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("Ignoring saved field {key}: {e}");
                    None
                }
            }
        }

        if let Some(grid) = field(&map, "grid") {
            snapshot.grid = Some(grid);
        }
        if let Some(wins) = field(&map, "winningCombinations") {
            snapshot.winning_combinations = wins;
        }
        if let Some(lines) = field(&map, "activePaylines") {
            snapshot.active_paylines = lines;
        }
        if let Some(damage) = field(&map, "totalDamage") {
            snapshot.total_damage = damage;
        }
        if let Some(multiplier) = field(&map, "multiplier") {
            snapshot.multiplier = multiplier;
        }
        if let Some(combo) = field(&map, "comboCount") {
            snapshot.combo_count = combo;
        }
        if let Some(progress) = field(&map, "jackpotProgress") {
            snapshot.jackpot_progress = progress;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let snapshot = GameSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, GameSnapshot::default());
        assert_eq!(snapshot.multiplier, 1.0);
    }

    #[test]
    fn test_bad_fields_fall_back_individually() {
        let json = r#"{
            "comboCount": "seven",
            "multiplier": 2.5,
            "jackpotProgress": -4,
            "grid": null
        }"#;
        let snapshot = GameSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.combo_count, 0);
        assert_eq!(snapshot.multiplier, 2.5);
        assert_eq!(snapshot.jackpot_progress, 0);
        assert!(snapshot.grid.is_none());
    }

    #[test]
    fn test_non_object_uses_defaults() {
        let snapshot = GameSnapshot::from_json("[1, 2, 3]").unwrap();
        assert_eq!(snapshot, GameSnapshot::default());
        assert!(GameSnapshot::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let snapshot = GameSnapshot {
            total_damage: 52,
            multiplier: 1.5,
            combo_count: 3,
            jackpot_progress: 100,
            ..Default::default()
        };
        let json = snapshot.to_json().unwrap();
        assert_eq!(GameSnapshot::from_json(&json).unwrap(), snapshot);
    }
}
