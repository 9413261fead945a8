//! Tunable parameters.
//!
//! Values are grouped by game bucket (player count, map size, halite
//! abundance). A built-in table covers every bucket; an optional JSON file
//! overrides individual values:
//!
//! ```json
//! { "entries": [
//!     { "players": 2, "map_size": 32, "abundance": 1,
//!       "values": { "enemy_conflict_probability": 0.9 } }
//! ] }
//! ```
//!
//! The selected `Tunables` is immutable for the rest of the game.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::board::GameState;

pub const ENEMY_CONFLICT_PROBABILITY: &str = "enemy_conflict_probability";
pub const EXPLORE_RADIUS: &str = "explore_radius";
pub const MINE_THRESHOLD: &str = "mine_threshold";
pub const RETURN_FRACTION: &str = "return_fraction";
pub const SPAWN_TURN_FRACTION: &str = "spawn_turn_fraction";
pub const MAX_DROPOFFS: &str = "max_dropoffs";
pub const DROPOFF_MIN_DISTANCE: &str = "dropoff_min_distance";
pub const DROPOFF_MIN_HALITE_NEARBY: &str = "dropoff_min_halite_nearby";
pub const RECALL_MARGIN: &str = "recall_margin";
pub const TURN_BUDGET_MS: &str = "turn_budget_ms";

pub const PLAYER_COUNTS: [u32; 2] = [2, 4];
pub const MAP_SIZES: [i32; 5] = [32, 40, 48, 56, 64];
/// Average halite per cell separating abundance buckets 0 | 1 | 2.
pub const ABUNDANCE_THRESHOLDS: [u32; 2] = [100, 200];

#[derive(Debug, Error)]
pub enum TunableError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tunables JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The game environment a set of tunables is chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket {
    pub players: u32,
    pub map_size: i32,
    pub abundance: u8,
}

impl Bucket {
    /// Snaps raw game parameters onto the known buckets.
    pub fn new(players: usize, map_size: i32, average_halite: u32) -> Self {
        let players = if players <= PLAYER_COUNTS[0] as usize {
            PLAYER_COUNTS[0]
        } else {
            PLAYER_COUNTS[1]
        };
        let map_size = MAP_SIZES
            .iter()
            .copied()
            .min_by_key(|s| (s - map_size).abs())
            .unwrap_or(MAP_SIZES[0]);
        let abundance = ABUNDANCE_THRESHOLDS
            .iter()
            .filter(|&&t| average_halite >= t)
            .count() as u8;
        Bucket {
            players,
            map_size,
            abundance,
        }
    }

    pub fn for_state(state: &GameState) -> Self {
        Bucket::new(
            state.players.len(),
            state.map.width.max(state.map.height),
            state.average_halite(),
        )
    }
}

/// Overrides for one bucket as stored in the JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct TunableEntry {
    pub players: u32,
    pub map_size: i32,
    pub abundance: u8,
    #[serde(default)]
    pub values: HashMap<String, f64>,
}

impl TunableEntry {
    fn matches(&self, bucket: Bucket) -> bool {
        self.players == bucket.players
            && self.map_size == bucket.map_size
            && self.abundance == bucket.abundance
    }
}

/// Every bucket's overrides. Buckets without an entry use the built-ins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TunableTable {
    #[serde(default)]
    pub entries: Vec<TunableEntry>,
}

impl TunableTable {
    /// Loads a table from a JSON file.
    pub fn load(path: &Path) -> Result<TunableTable, TunableError> {
        let data = fs::read_to_string(path).map_err(|source| TunableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<TunableTable, TunableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in values for the bucket with any matching overrides applied;
    /// later entries win.
    pub fn select(&self, bucket: Bucket) -> Tunables {
        let mut tunables = Tunables::defaults(bucket);
        for entry in self.entries.iter().filter(|e| e.matches(bucket)) {
            for (name, &value) in &entry.values {
                tunables.set(name, value);
            }
        }
        tunables
    }
}

/// The immutable parameter set used for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct Tunables {
    bucket: Bucket,
    values: HashMap<String, f64>,
}

impl Tunables {
    /// The built-in values for a bucket.
    pub fn defaults(bucket: Bucket) -> Self {
        let four_players = bucket.players == 4;
        let size_step = MAP_SIZES
            .iter()
            .position(|&s| s == bucket.map_size)
            .unwrap_or(0) as f64;

        let defaults = [
            (
                ENEMY_CONFLICT_PROBABILITY,
                if four_players { 0.98 } else { 0.92 },
            ),
            (EXPLORE_RADIUS, 4.0),
            (MINE_THRESHOLD, [0.05, 0.08, 0.1][bucket.abundance.min(2) as usize]),
            (RETURN_FRACTION, 0.9),
            (SPAWN_TURN_FRACTION, if four_players { 0.45 } else { 0.55 }),
            (MAX_DROPOFFS, 1.0 + size_step * 0.75),
            (DROPOFF_MIN_DISTANCE, (bucket.map_size / 4) as f64),
            (DROPOFF_MIN_HALITE_NEARBY, 4000.0 + 2000.0 * bucket.abundance as f64),
            (RECALL_MARGIN, 4.0),
            (TURN_BUDGET_MS, 1800.0),
        ];

        Tunables {
            bucket,
            values: defaults
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Looks up a value; unknown names read as `0.0`.
    pub fn lookup(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(v) => v,
            None => {
                warn!(name, "unknown tunable, using 0");
                0.0
            }
        }
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_snaps_players_size_and_abundance() {
        assert_eq!(
            Bucket::new(2, 32, 50),
            Bucket {
                players: 2,
                map_size: 32,
                abundance: 0
            }
        );
        assert_eq!(
            Bucket::new(4, 43, 150),
            Bucket {
                players: 4,
                map_size: 40,
                abundance: 1
            }
        );
        assert_eq!(
            Bucket::new(3, 80, 200),
            Bucket {
                players: 4,
                map_size: 64,
                abundance: 2
            }
        );
        assert_eq!(Bucket::new(1, 10, 0).map_size, 32);
    }

    #[test]
    fn defaults_depend_on_player_count() {
        let two = Tunables::defaults(Bucket::new(2, 32, 0));
        let four = Tunables::defaults(Bucket::new(4, 32, 0));
        assert_eq!(two.lookup(ENEMY_CONFLICT_PROBABILITY), 0.92);
        assert_eq!(four.lookup(ENEMY_CONFLICT_PROBABILITY), 0.98);
        assert_eq!(two.lookup(MAX_DROPOFFS), 1.0);
        assert_eq!(two.lookup(DROPOFF_MIN_DISTANCE), 8.0);
    }

    #[test]
    fn every_named_tunable_has_a_default() {
        let t = Tunables::defaults(Bucket::new(2, 64, 300));
        for name in [
            ENEMY_CONFLICT_PROBABILITY,
            EXPLORE_RADIUS,
            MINE_THRESHOLD,
            RETURN_FRACTION,
            SPAWN_TURN_FRACTION,
            MAX_DROPOFFS,
            DROPOFF_MIN_DISTANCE,
            DROPOFF_MIN_HALITE_NEARBY,
            RECALL_MARGIN,
            TURN_BUDGET_MS,
        ] {
            assert!(t.get(name).is_some(), "missing default for {name}");
        }
    }

    #[test]
    fn unknown_name_reads_zero() {
        let t = Tunables::defaults(Bucket::new(2, 32, 0));
        assert_eq!(t.get("no_such_knob"), None);
        assert_eq!(t.lookup("no_such_knob"), 0.0);
    }

    #[test]
    fn json_overrides_only_matching_bucket() {
        let json = r#"{ "entries": [
            { "players": 2, "map_size": 32, "abundance": 0,
              "values": { "enemy_conflict_probability": 0.5, "extra": 7 } },
            { "players": 4, "map_size": 32, "abundance": 0,
              "values": { "enemy_conflict_probability": 0.1 } }
        ] }"#;
        let table = TunableTable::from_json(json).unwrap();
        let t = table.select(Bucket::new(2, 32, 0));
        assert_eq!(t.lookup(ENEMY_CONFLICT_PROBABILITY), 0.5);
        assert_eq!(t.lookup("extra"), 7.0);
        assert_eq!(t.lookup(RETURN_FRACTION), 0.9);

        let other = table.select(Bucket::new(2, 40, 0));
        assert_eq!(other.lookup(ENEMY_CONFLICT_PROBABILITY), 0.92);
    }

    #[test]
    fn empty_table_is_all_defaults() {
        let bucket = Bucket::new(4, 56, 120);
        assert_eq!(
            TunableTable::default().select(bucket),
            Tunables::defaults(bucket)
        );
        assert!(TunableTable::from_json("{}").unwrap().entries.is_empty());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            TunableTable::from_json("{\"entries\": 3}"),
            Err(TunableError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TunableTable::load(Path::new("/nonexistent/drydock/tunables.json")).unwrap_err();
        assert!(matches!(err, TunableError::Io { .. }));
        assert!(err.to_string().contains("tunables.json"));
    }
}
