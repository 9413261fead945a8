//! Ships, structures and players.
//!
//! Ships live in a per-turn arena (`GameState::ships`) and are referred to
//! by `ShipIdx`; the game's own `ShipId` is only used on the wire and for
//! stable tie-breaks.

use super::position::Position;

/// Player identifier as sent by the game engine.
pub type PlayerId = u32;

/// Ship identifier as sent by the game engine. Stable across turns.
pub type ShipId = u32;

/// Index of a ship in the current turn's arena.
pub type ShipIdx = usize;

/// A ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ship {
    pub id: ShipId,
    pub owner: PlayerId,
    pub position: Position,
    pub halite: u32,
}

impl Ship {
    /// Returns true if the ship's cargo has reached `max_halite`.
    pub fn is_full(&self, max_halite: u32) -> bool {
        self.halite >= max_halite
    }
}

/// The kind of a player-owned structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Shipyard,
    Dropoff,
}

/// A shipyard or dropoff standing on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Structure {
    pub kind: StructureKind,
    pub owner: PlayerId,
}

/// A dropoff built by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dropoff {
    pub id: u32,
    pub position: Position,
}

/// A player and the entities it owns this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub shipyard: Position,
    pub halite: u32,
    /// Arena indices of this player's ships, ascending by ship id.
    pub ships: Vec<ShipIdx>,
    pub dropoffs: Vec<Dropoff>,
}

impl Player {
    pub fn new(id: PlayerId, shipyard: Position) -> Self {
        Player {
            id,
            shipyard,
            halite: 0,
            ships: Vec::new(),
            dropoffs: Vec::new(),
        }
    }

    /// Shipyard first, then dropoffs in the order the engine reported them.
    pub fn home_positions(&self) -> Vec<Position> {
        let mut homes = Vec::with_capacity(self.dropoffs.len() + 1);
        homes.push(self.shipyard);
        homes.extend(self.dropoffs.iter().map(|d| d.position));
        homes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ship_full_at_capacity() {
        let mut ship = Ship {
            id: 1,
            owner: 0,
            position: Position::new(0, 0),
            halite: 999,
        };
        assert!(!ship.is_full(1000));
        ship.halite = 1000;
        assert!(ship.is_full(1000));
    }

    #[test]
    fn home_positions_lists_shipyard_first() {
        let mut player = Player::new(0, Position::new(8, 8));
        player.dropoffs.push(Dropoff {
            id: 3,
            position: Position::new(2, 14),
        });
        assert_eq!(
            player.home_positions(),
            vec![Position::new(8, 8), Position::new(2, 14)]
        );
    }
}
