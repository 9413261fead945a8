//! Board representation and game-state types.
//!
//! Contains the core data structures for positions, directions, the
//! toroidal map, ships, structures, players and the overall game state.

pub mod constants;
pub mod map;
pub mod position;
pub mod state;
pub mod unit;

pub use constants::Constants;
pub use map::{GameMap, MapCell};
pub use position::{Direction, Position};
pub use state::GameState;
pub use unit::{Dropoff, Player, PlayerId, Ship, ShipId, ShipIdx, Structure, StructureKind};
