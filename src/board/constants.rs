//! Game constants announced by the engine at start-up.
//!
//! The engine sends one JSON object; only the keys the bot uses are kept,
//! every other key is ignored and missing keys fall back to the standard
//! Halite III values.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Constants {
    #[serde(rename = "SHIP_COST")]
    pub ship_cost: u32,
    #[serde(rename = "DROPOFF_COST")]
    pub dropoff_cost: u32,
    #[serde(rename = "MAX_HALITE")]
    pub max_halite: u32,
    #[serde(rename = "MAX_TURNS")]
    pub max_turns: u32,
    #[serde(rename = "MOVE_COST_RATIO")]
    pub move_cost_ratio: u32,
    #[serde(rename = "EXTRACT_RATIO")]
    pub extract_ratio: u32,
    #[serde(rename = "INSPIRATION_ENABLED")]
    pub inspiration_enabled: bool,
    #[serde(rename = "INSPIRATION_RADIUS")]
    pub inspiration_radius: u32,
    #[serde(rename = "INSPIRATION_SHIP_COUNT")]
    pub inspiration_ship_count: u32,
    #[serde(rename = "game_seed")]
    pub game_seed: u64,
}

impl Default for Constants {
    fn default() -> Self {
        Constants {
            ship_cost: 1000,
            dropoff_cost: 4000,
            max_halite: 1000,
            max_turns: 400,
            move_cost_ratio: 10,
            extract_ratio: 4,
            inspiration_enabled: true,
            inspiration_radius: 4,
            inspiration_ship_count: 2,
            game_seed: 0,
        }
    }
}

impl Constants {
    /// Parses the engine's constants line.
    pub fn from_json(json: &str) -> Result<Constants, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Halite a ship must pay to leave a cell holding `cell_halite`.
    pub fn move_cost(&self, cell_halite: u32) -> u32 {
        if self.move_cost_ratio == 0 {
            return 0;
        }
        cell_halite / self.move_cost_ratio
    }
}
