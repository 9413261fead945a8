//! Engine state management.
//!
//! Holds everything that survives between turns: the tunables chosen at
//! start-up, the seeded RNG and each ship's status. `play_turn` runs the
//! per-turn pipeline: statuses, dropoff conversion, intent registration,
//! spawn decision, resolution and command read-out.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::board::{GameState, ShipId, ShipIdx};
use crate::protocol::command::Command;
use crate::resolve::{MovementMap, ResolverConfig};
use crate::strategy::{Navigator, ShipStatus};
use crate::tunables::{
    Tunables, DROPOFF_MIN_DISTANCE, DROPOFF_MIN_HALITE_NEARBY, ENEMY_CONFLICT_PROBABILITY,
    EXPLORE_RADIUS, MAX_DROPOFFS, RECALL_MARGIN, RETURN_FRACTION, SPAWN_TURN_FRACTION,
};

/// Name written back to the game engine after init.
pub const BOT_NAME: &str = "drydock";

/// Holds the mutable state of the bot between turns.
pub struct Engine {
    tunables: Tunables,
    statuses: HashMap<ShipId, ShipStatus>,
    rng: SmallRng,
}

impl Engine {
    /// Creates an engine. A fixed seed makes every turn reproducible;
    /// `None` seeds from entropy.
    pub fn new(tunables: Tunables, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Engine {
            tunables,
            statuses: HashMap::new(),
            rng,
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Current status of a ship, if it has been seen.
    pub fn status(&self, ship: ShipId) -> Option<ShipStatus> {
        self.statuses.get(&ship).copied()
    }

    /// Resolver settings for this turn. Home cells only absorb collisions
    /// while ships are recalling.
    pub fn resolver_config(&self, recalling: bool) -> ResolverConfig {
        ResolverConfig {
            enemy_conflict_probability: self
                .tunables
                .lookup(ENEMY_CONFLICT_PROBABILITY)
                .clamp(0.0, 1.0),
            home_exempt: recalling,
        }
    }

    /// Computes this turn's commands.
    pub fn play_turn(&mut self, state: &GameState) -> Vec<Command> {
        let nav = Navigator::new(state, &self.tunables);
        update_statuses(&mut self.statuses, state, &nav, &self.tunables);

        let recalling = self
            .statuses
            .values()
            .any(|&s| s == ShipStatus::Recalling);
        let mut movement = MovementMap::new(state, self.resolver_config(recalling));

        let mut bank = state.me().map_or(0, |p| p.halite);
        if !recalling {
            if let Some(ship) = self.pick_conversion(state, &nav, bank) {
                if movement.request_conversion(ship) {
                    let s = &state.ships[ship];
                    let credit = s.halite + state.map.halite(s.position);
                    bank = bank.saturating_sub(state.constants.dropoff_cost.saturating_sub(credit));
                    info!(turn = state.turn, ship = s.id, pos = %s.position, "converting to dropoff");
                }
            }
        }

        for ship in state.my_ships() {
            if movement.conversions().contains(&ship) {
                continue;
            }
            let s = &state.ships[ship];
            let status = self.statuses.get(&s.id).copied().unwrap_or(ShipStatus::Exploring);
            let (dirs, ignore_enemies) = match status {
                ShipStatus::Exploring => (nav.explore(ship, &mut self.rng), false),
                ShipStatus::Returning => (nav.return_home(ship, &mut self.rng), false),
                ShipStatus::Recalling => (nav.recall(ship, &mut self.rng), true),
            };
            movement.register_intent_with(ship, &dirs, ignore_enemies);
        }

        if !recalling && self.should_spawn(state, bank) {
            movement.request_spawn();
        }

        movement.resolve(&mut self.rng);
        let commands = movement.commands();
        debug!(turn = state.turn, commands = commands.len(), bank, "turn planned");
        commands
    }

    /// The last turn on which spawning or converting still pays off.
    fn spawn_cutoff(&self, state: &GameState) -> u32 {
        (self.tunables.lookup(SPAWN_TURN_FRACTION) * state.constants.max_turns as f64) as u32
    }

    fn should_spawn(&self, state: &GameState, bank: u32) -> bool {
        state.turn <= self.spawn_cutoff(state) && bank >= state.constants.ship_cost
    }

    /// Picks at most one exploring ship to turn into a dropoff: far enough
    /// from every home, sitting in a rich area, and affordable. The richest
    /// area wins; ties go to the lowest ship id.
    fn pick_conversion(&self, state: &GameState, nav: &Navigator<'_>, bank: u32) -> Option<ShipIdx> {
        let me = state.me()?;
        if me.dropoffs.len() as f64 >= self.tunables.lookup(MAX_DROPOFFS) {
            return None;
        }
        if state.turn > self.spawn_cutoff(state) {
            return None;
        }

        let min_distance = self.tunables.lookup(DROPOFF_MIN_DISTANCE) as i32;
        let min_nearby = self.tunables.lookup(DROPOFF_MIN_HALITE_NEARBY) as u64;
        let radius = (self.tunables.lookup(EXPLORE_RADIUS) as i32).max(1);

        let mut best: Option<(ShipIdx, u64)> = None;
        for ship in state.my_ships() {
            let s = &state.ships[ship];
            if self.status(s.id) != Some(ShipStatus::Exploring) {
                continue;
            }
            if state.map.at(s.position).has_structure() {
                continue;
            }
            let far_enough = nav
                .nearest_home(s.position)
                .map_or(true, |(_, d)| d >= min_distance);
            if !far_enough {
                continue;
            }
            let funds = bank as u64 + s.halite as u64 + state.map.halite(s.position) as u64;
            if funds < state.constants.dropoff_cost as u64 {
                continue;
            }
            let nearby = nav.halite_nearby(s.position, radius);
            if nearby < min_nearby {
                continue;
            }
            if best.map_or(true, |(_, n)| nearby > n) {
                best = Some((ship, nearby));
            }
        }
        best.map(|(ship, _)| ship)
    }
}

/// Drops statuses of vanished ships, then applies the transitions:
/// new ships explore, full ships return, ships back home explore again and
/// every ship recalls once the game is about to end. Recalling is final.
fn update_statuses(
    statuses: &mut HashMap<ShipId, ShipStatus>,
    state: &GameState,
    nav: &Navigator<'_>,
    tunables: &Tunables,
) {
    let mine = state.my_ships();
    statuses.retain(|id, _| mine.iter().any(|&i| state.ships[i].id == *id));

    let full = (tunables.lookup(RETURN_FRACTION) * state.constants.max_halite as f64) as u32;
    let margin = tunables.lookup(RECALL_MARGIN).max(0.0) as u32;
    let turns_left = state.turns_remaining();

    for ship in mine {
        let s = &state.ships[ship];
        let home_distance = nav
            .nearest_home(s.position)
            .map_or(0, |(_, d)| d.max(0) as u32);
        let status = statuses.entry(s.id).or_insert(ShipStatus::Exploring);

        let current = *status;
        let next = match current {
            ShipStatus::Recalling => ShipStatus::Recalling,
            _ if turns_left <= home_distance + margin => ShipStatus::Recalling,
            ShipStatus::Exploring if s.halite >= full => ShipStatus::Returning,
            ShipStatus::Returning if home_distance == 0 => ShipStatus::Exploring,
            other => other,
        };
        if next != current {
            debug!(ship = s.id, from = ?current, to = ?next, "status change");
            *status = next;
        }
    }
}
