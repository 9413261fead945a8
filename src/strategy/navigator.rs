//! Per-ship direction ranking.
//!
//! The navigator turns a ship's status into the ranked direction list the
//! movement map resolves. It never looks at other ships' intents; collisions
//! are the resolver's problem.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Direction, GameState, Position, ShipIdx};
use crate::tunables::{Tunables, EXPLORE_RADIUS, MINE_THRESHOLD};

/// What a ship is currently trying to do. Persisted across turns by ship id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipStatus {
    /// Looking for halite and mining it.
    Exploring,
    /// Carrying cargo back to the nearest home cell.
    Returning,
    /// End of game: everyone heads home, enemies ignored.
    Recalling,
}

pub struct Navigator<'a> {
    state: &'a GameState,
    tunables: &'a Tunables,
}

impl<'a> Navigator<'a> {
    pub fn new(state: &'a GameState, tunables: &'a Tunables) -> Self {
        Navigator { state, tunables }
    }

    /// Closest own shipyard or dropoff and its distance. Ties go to the
    /// shipyard, then to the oldest dropoff.
    pub fn nearest_home(&self, pos: Position) -> Option<(Position, i32)> {
        let map = &self.state.map;
        let mut best: Option<(Position, i32)> = None;
        for home in self.state.my_homes() {
            let d = map.distance(pos, home);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((home, d));
            }
        }
        best
    }

    /// Halite within Manhattan `radius` of `pos`, the centre included.
    pub fn halite_nearby(&self, pos: Position, radius: i32) -> u64 {
        let map = &self.state.map;
        map.within_radius(pos, radius)
            .into_iter()
            .map(|p| map.halite(p) as u64)
            .sum()
    }

    /// Stay and mine a rich cell, otherwise head for the richest cell in
    /// range with every other cardinal as a fallback.
    pub fn explore(&self, ship: ShipIdx, rng: &mut impl Rng) -> Vec<Direction> {
        let Some(s) = self.state.ship(ship) else {
            return vec![Direction::Still];
        };
        let map = &self.state.map;
        let constants = &self.state.constants;

        let threshold =
            (self.tunables.lookup(MINE_THRESHOLD) * constants.max_halite as f64) as u32;
        if map.halite(s.position) >= threshold.max(1) && !s.is_full(constants.max_halite) {
            return vec![Direction::Still];
        }

        let radius = (self.tunables.lookup(EXPLORE_RADIUS) as i32).max(1);
        let mut target = s.position;
        let mut best = 0;
        for pos in map.within_radius(s.position, radius) {
            let halite = map.halite(pos);
            if pos != s.position && halite > best {
                best = halite;
                target = pos;
            }
        }

        let mut dirs = map.unsafe_moves(s.position, target);
        dirs.shuffle(rng);

        let mut rest: Vec<Direction> = Direction::CARDINALS
            .into_iter()
            .filter(|d| !dirs.contains(d))
            .collect();
        rest.sort_by_key(|&d| std::cmp::Reverse(map.halite(map.destination(s.position, d))));
        dirs.extend(rest);
        dirs.push(Direction::Still);
        dirs
    }

    /// Shortest way to the nearest home cell, or hold.
    pub fn return_home(&self, ship: ShipIdx, rng: &mut impl Rng) -> Vec<Direction> {
        let Some(s) = self.state.ship(ship) else {
            return vec![Direction::Still];
        };
        let mut dirs = match self.nearest_home(s.position) {
            Some((home, _)) => self.state.map.unsafe_moves(s.position, home),
            None => Vec::new(),
        };
        dirs.shuffle(rng);
        dirs.push(Direction::Still);
        dirs
    }

    /// End-of-game run home. Same ranking as `return_home`; the caller
    /// registers it with enemies ignored.
    pub fn recall(&self, ship: ShipIdx, rng: &mut impl Rng) -> Vec<Direction> {
        self.return_home(ship, rng)
    }
}
