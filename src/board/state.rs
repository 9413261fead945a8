//! Game state representation.
//!
//! Holds the full snapshot of one turn: the map, every player, and the
//! ship arena the movement core indexes into. The protocol layer rebuilds
//! ships and structures every frame; halite on the map is patched
//! incrementally.

use super::constants::Constants;
use super::map::GameMap;
use super::position::Position;
use super::unit::{Dropoff, Player, PlayerId, Ship, ShipId, ShipIdx, Structure, StructureKind};

/// Complete game state at one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub constants: Constants,
    pub my_id: PlayerId,
    pub turn: u32,
    pub players: Vec<Player>,
    pub map: GameMap,
    /// Turn-scoped ship arena. Indices are only valid for this turn.
    pub ships: Vec<Ship>,
}

impl GameState {
    /// Creates a state with an empty `width x height` map and one player per
    /// `(id, shipyard)` pair. Shipyards are marked on the map.
    pub fn empty(
        constants: Constants,
        my_id: PlayerId,
        width: i32,
        height: i32,
        shipyards: &[(PlayerId, Position)],
    ) -> Self {
        let mut state = GameState {
            constants,
            my_id,
            turn: 0,
            players: Vec::with_capacity(shipyards.len()),
            map: GameMap::new(width, height),
            ships: Vec::new(),
        };
        for &(id, pos) in shipyards {
            let pos = state.map.normalize(pos);
            state.players.push(Player::new(id, pos));
            state.map.at_mut(pos).structure = Some(Structure {
                kind: StructureKind::Shipyard,
                owner: id,
            });
        }
        state
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// This agent's player. `None` only if the state was built inconsistently.
    pub fn me(&self) -> Option<&Player> {
        self.player(self.my_id)
    }

    pub fn ship(&self, idx: ShipIdx) -> Option<&Ship> {
        self.ships.get(idx)
    }

    pub fn is_mine(&self, idx: ShipIdx) -> bool {
        self.ships.get(idx).is_some_and(|s| s.owner == self.my_id)
    }

    /// Arena indices of this agent's ships, ascending by ship id.
    pub fn my_ships(&self) -> Vec<ShipIdx> {
        self.me().map(|p| p.ships.clone()).unwrap_or_default()
    }

    /// This agent's shipyard and dropoff cells.
    pub fn my_homes(&self) -> Vec<Position> {
        self.me().map(Player::home_positions).unwrap_or_default()
    }

    /// Turns left after the current one.
    pub fn turns_remaining(&self) -> u32 {
        self.constants.max_turns.saturating_sub(self.turn)
    }

    /// True if the ship can pay to leave its current cell.
    pub fn can_move(&self, idx: ShipIdx) -> bool {
        match self.ships.get(idx) {
            Some(ship) => {
                ship.halite >= self.constants.move_cost(self.map.halite(ship.position))
            }
            None => false,
        }
    }

    /// Drops every ship and dropoff ahead of a new frame. Shipyards stay.
    pub fn clear_entities(&mut self) {
        self.ships.clear();
        self.map.clear_ships();
        for player in &mut self.players {
            player.ships.clear();
            for dropoff in player.dropoffs.drain(..) {
                self.map.at_mut(dropoff.position).structure = None;
            }
        }
    }

    /// Places a ship and returns its arena index. Returns `None` if the
    /// owner is unknown or the cell already holds a ship.
    pub fn place_ship(
        &mut self,
        owner: PlayerId,
        id: ShipId,
        pos: Position,
        halite: u32,
    ) -> Option<ShipIdx> {
        let pos = self.map.normalize(pos);
        if self.map.at(pos).is_occupied() {
            return None;
        }
        let idx = self.ships.len();
        let player = self.players.iter_mut().find(|p| p.id == owner)?;
        let slot = player.ships.partition_point(|&s| self.ships[s].id < id);
        player.ships.insert(slot, idx);
        self.ships.push(Ship {
            id,
            owner,
            position: pos,
            halite,
        });
        self.map.at_mut(pos).ship = Some(idx);
        Some(idx)
    }

    /// Records a dropoff for `owner`. Returns false if the owner is unknown.
    pub fn place_dropoff(&mut self, owner: PlayerId, id: u32, pos: Position) -> bool {
        let pos = self.map.normalize(pos);
        let Some(player) = self.players.iter_mut().find(|p| p.id == owner) else {
            return false;
        };
        player.dropoffs.push(Dropoff { id, position: pos });
        self.map.at_mut(pos).structure = Some(Structure {
            kind: StructureKind::Dropoff,
            owner,
        });
        true
    }

    /// Average halite per cell, used to pick the abundance bucket.
    pub fn average_halite(&self) -> u32 {
        let cells = self.map.cell_count() as u64;
        if cells == 0 {
            return 0;
        }
        (self.map.total_halite() / cells) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_state() -> GameState {
        GameState::empty(
            Constants::default(),
            0,
            16,
            16,
            &[(0, Position::new(4, 4)), (1, Position::new(12, 12))],
        )
    }

    #[test]
    fn empty_state_marks_shipyards() {
        let state = two_player_state();
        let cell = state.map.at(Position::new(4, 4));
        assert_eq!(
            cell.structure,
            Some(Structure {
                kind: StructureKind::Shipyard,
                owner: 0
            })
        );
        assert_eq!(state.my_homes(), vec![Position::new(4, 4)]);
        assert!(state.ships.is_empty());
    }

    #[test]
    fn place_ship_indexes_cell_and_player() {
        let mut state = two_player_state();
        let idx = state.place_ship(0, 7, Position::new(5, 4), 100).unwrap();
        assert_eq!(state.map.ship_at(Position::new(5, 4)), Some(idx));
        assert_eq!(state.my_ships(), vec![idx]);
        assert!(state.is_mine(idx));
    }

    #[test]
    fn place_ship_rejects_duplicates_and_unknown_owner() {
        let mut state = two_player_state();
        assert!(state.place_ship(0, 1, Position::new(1, 1), 0).is_some());
        assert!(state.place_ship(1, 2, Position::new(1, 1), 0).is_none());
        assert!(state.place_ship(9, 3, Position::new(2, 2), 0).is_none());
    }

    #[test]
    fn player_ships_sorted_by_id() {
        let mut state = two_player_state();
        let a = state.place_ship(0, 9, Position::new(1, 1), 0).unwrap();
        let b = state.place_ship(0, 2, Position::new(2, 2), 0).unwrap();
        let c = state.place_ship(0, 5, Position::new(3, 3), 0).unwrap();
        assert_eq!(state.my_ships(), vec![b, c, a]);
    }

    #[test]
    fn can_move_requires_move_cost() {
        let mut state = two_player_state();
        state.map.at_mut(Position::new(1, 1)).halite = 500;
        let poor = state.place_ship(0, 1, Position::new(1, 1), 49).unwrap();
        assert!(!state.can_move(poor));
        state.ships[poor].halite = 50;
        assert!(state.can_move(poor));
        assert!(!state.can_move(99));
    }

    #[test]
    fn clear_entities_removes_dropoffs_but_not_shipyards() {
        let mut state = two_player_state();
        state.place_ship(0, 1, Position::new(1, 1), 0).unwrap();
        assert!(state.place_dropoff(0, 1, Position::new(8, 8)));
        state.clear_entities();
        assert!(state.ships.is_empty());
        assert!(state.map.at(Position::new(8, 8)).structure.is_none());
        assert!(state.map.at(Position::new(4, 4)).structure.is_some());
        assert!(state.map.ship_at(Position::new(1, 1)).is_none());
    }

    #[test]
    fn turns_remaining_saturates() {
        let mut state = two_player_state();
        state.turn = 10;
        assert_eq!(state.turns_remaining(), 390);
        state.turn = 1000;
        assert_eq!(state.turns_remaining(), 0);
    }
}
