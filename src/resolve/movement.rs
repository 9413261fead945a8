//! Turn-scoped movement map.
//!
//! The front door to the resolver for the strategy layer: ships register
//! their ranked directions, spawn and dropoff requests are recorded, one
//! resolution pass runs, and the resulting commands are read out.

use rand::Rng;
use tracing::{debug, warn};

use crate::board::{Direction, GameState, Position, ShipIdx};
use crate::protocol::command::Command;

use super::conflict::{ConflictRules, ResolverConfig};
use super::registry::IntentRegistry;
use super::resolver::{ConflictResolver, ResolveStats};

pub struct MovementMap<'a> {
    state: &'a GameState,
    registry: IntentRegistry<'a>,
    config: ResolverConfig,
    conversions: Vec<ShipIdx>,
    spawn_requested: bool,
    stats: Option<ResolveStats>,
}

impl<'a> MovementMap<'a> {
    pub fn new(state: &'a GameState, config: ResolverConfig) -> Self {
        MovementMap {
            state,
            registry: IntentRegistry::new(state),
            config,
            conversions: Vec::new(),
            spawn_requested: false,
            stats: None,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &IntentRegistry<'a> {
        &self.registry
    }

    /// Registers a ship's ranked directions. Returns false if the request
    /// was a contract violation; the ship then holds still or is ignored.
    pub fn register_intent(&mut self, ship: ShipIdx, directions: &[Direction]) -> bool {
        self.register_intent_with(ship, directions, false)
    }

    /// Like `register_intent`, optionally exempting the ship from the
    /// enemy-adjacency rule.
    pub fn register_intent_with(
        &mut self,
        ship: ShipIdx,
        directions: &[Direction],
        ignore_enemies: bool,
    ) -> bool {
        if self.stats.is_some() {
            warn!(ship, "intent registered after resolution, ignoring");
            return false;
        }
        if self.conversions.contains(&ship) {
            warn!(ship, "intent registered for a converting ship, ignoring");
            return false;
        }
        match self.registry.register(ship, directions, ignore_enemies) {
            Ok(()) => true,
            Err(e) => {
                warn!(ship, error = %e, "invalid intent");
                false
            }
        }
    }

    /// Asks for a new ship. It is only spawned if no own ship ends the turn
    /// on the shipyard.
    pub fn request_spawn(&mut self) {
        self.spawn_requested = true;
    }

    pub fn spawn_requested(&self) -> bool {
        self.spawn_requested
    }

    /// Turns a ship into a dropoff this turn. The ship takes no part in
    /// movement resolution.
    pub fn request_conversion(&mut self, ship: ShipIdx) -> bool {
        if !self.state.is_mine(ship) {
            warn!(ship, "conversion requested for a ship that is not ours");
            return false;
        }
        if self.registry.is_registered(ship) {
            warn!(ship, "conversion requested for a ship that already moved");
            return false;
        }
        if self.conversions.contains(&ship) {
            return false;
        }
        self.conversions.push(ship);
        true
    }

    pub fn conversions(&self) -> &[ShipIdx] {
        &self.conversions
    }

    /// Resolves all registered intents. Own ships that never registered (and
    /// are not converting) hold still. Only the first call does any work.
    pub fn resolve(&mut self, rng: &mut impl Rng) -> ResolveStats {
        if let Some(stats) = self.stats {
            return stats;
        }

        for ship in self.state.my_ships() {
            if self.registry.is_registered(ship) || self.conversions.contains(&ship) {
                continue;
            }
            if let Err(e) = self.registry.register(ship, &[Direction::Still], false) {
                warn!(ship, error = %e, "could not hold unregistered ship");
            }
        }

        let rules = ConflictRules::new(self.state, &self.config, rng);
        let stats = ConflictResolver::new().resolve(&mut self.registry, &rules);
        debug!(
            turn = self.state.turn,
            ships = self.registry.registered().len(),
            conflicts = stats.conflicts,
            redirects = stats.redirects,
            parked = stats.parked,
            "movement resolved"
        );
        self.stats = Some(stats);
        stats
    }

    pub fn is_resolved(&self) -> bool {
        self.stats.is_some()
    }

    pub fn stats(&self) -> Option<ResolveStats> {
        self.stats
    }

    /// The direction the ship will be ordered to take.
    pub fn final_direction(&self, ship: ShipIdx) -> Direction {
        self.registry.current_direction(ship)
    }

    /// Where the ship ends the turn if its move goes through.
    pub fn destination(&self, ship: ShipIdx) -> Option<Position> {
        self.registry.destination(ship)
    }

    /// No own ship is heading into (or staying on) `pos`.
    pub fn is_free(&self, pos: Position) -> bool {
        self.registry.incoming(pos).is_empty()
    }

    /// Constructs, then one move per registered ship in registration order,
    /// then the spawn if it is still possible.
    pub fn commands(&self) -> Vec<Command> {
        if self.stats.is_none() {
            warn!("reading commands from an unresolved movement map");
        }

        let mut commands = Vec::with_capacity(self.registry.registered().len() + 1);
        for &ship in &self.conversions {
            if let Some(s) = self.state.ship(ship) {
                commands.push(Command::Construct { ship: s.id });
            }
        }
        for &ship in self.registry.registered() {
            if let Some(s) = self.state.ship(ship) {
                commands.push(Command::Move {
                    ship: s.id,
                    dir: self.final_direction(ship),
                });
            }
        }
        if self.spawn_requested {
            match self.state.me() {
                Some(me) if self.is_free(me.shipyard) => commands.push(Command::Spawn),
                Some(_) => debug!("shipyard busy, skipping spawn"),
                None => warn!("no player entry for this agent, skipping spawn"),
            }
        }
        commands
    }
}
