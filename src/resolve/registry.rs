//! Per-turn intent registry.
//!
//! Every owned ship registers a ranked list of directions. The registry keeps
//! the remaining list per ship and a destination index mapping each cell to
//! the ships whose current (front-of-list) direction leads into it. A ship
//! whose current direction is `Still` is parked: it is listed at its own
//! cell and never advances again this turn.

use std::collections::VecDeque;

use thiserror::Error;

use crate::board::{Direction, GameState, Position, ShipId, ShipIdx};

/// Contract violations on registration. The registry has always applied a
/// safe fallback by the time one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("ship index {0} is not in this turn's arena")]
    UnknownShip(ShipIdx),

    #[error("ship {0} belongs to another player")]
    ForeignShip(ShipId),

    #[error("ship {0} registered an empty intent, holding still")]
    EmptyIntent(ShipId),

    #[error("ship {0} registered twice this turn, holding still")]
    AlreadyRegistered(ShipId),
}

#[derive(Debug, Clone)]
struct Intent {
    remaining: VecDeque<Direction>,
    ignore_enemies: bool,
}

impl Intent {
    fn current(&self) -> Direction {
        self.remaining.front().copied().unwrap_or(Direction::Still)
    }

    fn hold() -> Self {
        Intent {
            remaining: VecDeque::from([Direction::Still]),
            ignore_enemies: false,
        }
    }
}

/// Ranked intents and the destination index for one turn.
///
/// Borrows the turn's `GameState`, so it cannot outlive the ship arena it
/// indexes into.
pub struct IntentRegistry<'a> {
    state: &'a GameState,
    intents: Vec<Option<Intent>>,
    incoming: Vec<Vec<ShipIdx>>,
    order: Vec<ShipIdx>,
    touched: Vec<bool>,
}

impl<'a> IntentRegistry<'a> {
    pub fn new(state: &'a GameState) -> Self {
        IntentRegistry {
            state,
            intents: vec![None; state.ships.len()],
            incoming: vec![Vec::new(); state.map.cell_count()],
            order: Vec::new(),
            touched: vec![false; state.map.cell_count()],
        }
    }

    pub fn state(&self) -> &'a GameState {
        self.state
    }

    /// Registers `ship` with its ranked directions, most preferred first.
    ///
    /// A ship that cannot pay the move cost is registered as `[Still]`
    /// whatever it asked for. On `Err` the ship has been set to hold still
    /// (or, for unknown and foreign ships, ignored).
    pub fn register(
        &mut self,
        ship: ShipIdx,
        directions: &[Direction],
        ignore_enemies: bool,
    ) -> Result<(), IntentError> {
        let state = self.state;
        let Some(s) = state.ship(ship) else {
            return Err(IntentError::UnknownShip(ship));
        };
        if s.owner != state.my_id {
            return Err(IntentError::ForeignShip(s.id));
        }

        if self.intents[ship].is_some() {
            self.unlink(ship);
            self.intents[ship] = Some(Intent::hold());
            self.link(ship);
            return Err(IntentError::AlreadyRegistered(s.id));
        }

        let mut result = Ok(());
        let intent = if directions.is_empty() {
            result = Err(IntentError::EmptyIntent(s.id));
            Intent::hold()
        } else if !state.can_move(ship) {
            Intent::hold()
        } else {
            Intent {
                remaining: directions.iter().copied().collect(),
                ignore_enemies,
            }
        };

        self.intents[ship] = Some(intent);
        self.order.push(ship);
        self.link(ship);
        result
    }

    pub fn is_registered(&self, ship: ShipIdx) -> bool {
        matches!(self.intents.get(ship), Some(Some(_)))
    }

    /// Registered ships in registration order.
    pub fn registered(&self) -> &[ShipIdx] {
        &self.order
    }

    /// Front of the ship's remaining list, `Still` once exhausted or when
    /// the ship never registered.
    pub fn current_direction(&self, ship: ShipIdx) -> Direction {
        match self.intents.get(ship) {
            Some(Some(intent)) => intent.current(),
            _ => Direction::Still,
        }
    }

    pub fn is_parked(&self, ship: ShipIdx) -> bool {
        self.current_direction(ship).is_still()
    }

    pub fn ignores_enemies(&self, ship: ShipIdx) -> bool {
        matches!(self.intents.get(ship), Some(Some(i)) if i.ignore_enemies)
    }

    /// Entries left in the ship's list, including the current one.
    pub fn remaining(&self, ship: ShipIdx) -> usize {
        match self.intents.get(ship) {
            Some(Some(intent)) => intent.remaining.len(),
            _ => 0,
        }
    }

    /// The cell the ship's current direction leads into.
    pub fn destination(&self, ship: ShipIdx) -> Option<Position> {
        let s = self.state.ship(ship)?;
        Some(
            self.state
                .map
                .destination(s.position, self.current_direction(ship)),
        )
    }

    /// Cell index of the ship's current destination.
    pub fn destination_index(&self, ship: ShipIdx) -> Option<usize> {
        self.destination(ship).map(|p| self.state.map.cell_index(p))
    }

    /// Ships whose current direction leads into `pos`.
    pub fn incoming(&self, pos: Position) -> &[ShipIdx] {
        self.incoming_at(self.state.map.cell_index(pos))
    }

    pub fn incoming_at(&self, cell: usize) -> &[ShipIdx] {
        self.incoming.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every cell that has ever held an incoming ship this turn, ascending.
    pub fn touched_cells(&self) -> Vec<usize> {
        self.touched
            .iter()
            .enumerate()
            .filter_map(|(i, &t)| t.then_some(i))
            .collect()
    }

    /// Drops the ship's current direction and moves it to the bucket of the
    /// next one. Returns the new current direction. Parked ships stay put.
    pub fn advance(&mut self, ship: ShipIdx) -> Direction {
        if !self.is_registered(ship) || self.is_parked(ship) {
            return Direction::Still;
        }
        self.unlink(ship);
        if let Some(Some(intent)) = self.intents.get_mut(ship) {
            intent.remaining.pop_front();
        }
        self.link(ship);
        self.current_direction(ship)
    }

    fn link(&mut self, ship: ShipIdx) {
        if let Some(cell) = self.destination_index(ship) {
            self.incoming[cell].push(ship);
            self.touched[cell] = true;
        }
    }

    fn unlink(&mut self, ship: ShipIdx) {
        if let Some(cell) = self.destination_index(ship) {
            let bucket = &mut self.incoming[cell];
            if let Some(i) = bucket.iter().position(|&s| s == ship) {
                bucket.remove(i);
            }
        }
    }
}
