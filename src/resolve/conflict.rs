//! Conflict detection and per-cell classification.
//!
//! Decides whether a destination cell is contested and, when it is, which
//! of the ships heading into it must give way. Enemy pressure is captured
//! once per turn in a `ThreatMap`; home cells can be made collision-exempt.

use std::cmp::Ordering;

use rand::Rng;

use crate::board::{GameState, Ship, ShipIdx};

use super::registry::IntentRegistry;

/// Knobs for one turn of conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Chance that a cell next to (or under) an enemy ship is treated as
    /// contested this turn.
    pub enemy_conflict_probability: f64,
    /// Allow any number of own ships to stack on the shipyard and dropoffs.
    pub home_exempt: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            enemy_conflict_probability: 0.95,
            home_exempt: false,
        }
    }
}

/// Cells an enemy ship could reach this turn, and the subset that won this
/// turn's dampening draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatMap {
    contestable: Vec<bool>,
    threatened: Vec<bool>,
}

impl ThreatMap {
    /// A map with no enemy pressure at all.
    pub fn none(cell_count: usize) -> Self {
        ThreatMap {
            contestable: vec![false; cell_count],
            threatened: vec![false; cell_count],
        }
    }

    /// Marks every enemy-occupied cell and its four neighbours as
    /// contestable, then draws once per contestable cell, in ascending cell
    /// order, whether it counts as threatened. Probabilities of 0 and 1 do
    /// not consume randomness.
    pub fn build(state: &GameState, probability: f64, rng: &mut impl Rng) -> Self {
        let map = &state.map;
        let mut threats = ThreatMap::none(map.cell_count());

        for ship in state.ships.iter().filter(|s| s.owner != state.my_id) {
            threats.contestable[map.cell_index(ship.position)] = true;
            for n in map.neighbours(ship.position) {
                threats.contestable[map.cell_index(n)] = true;
            }
        }

        let p = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        for (cell, &contestable) in threats.contestable.iter().enumerate() {
            if !contestable {
                continue;
            }
            threats.threatened[cell] = if p >= 1.0 {
                true
            } else if p <= 0.0 {
                false
            } else {
                rng.gen_bool(p)
            };
        }
        threats
    }

    pub fn is_contestable(&self, cell: usize) -> bool {
        self.contestable.get(cell).copied().unwrap_or(false)
    }

    pub fn is_threatened(&self, cell: usize) -> bool {
        self.threatened.get(cell).copied().unwrap_or(false)
    }
}

/// How a contested cell is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    /// Own shipyard or dropoff with stacking allowed.
    HomeExempt,
    /// Nobody stands here, but an enemy could arrive.
    EmptyThreatened,
    /// Nobody stands here and no enemy is near: most cargo wins.
    Crossfire,
    /// An own ship stands here and is moving out; `partner` is the own ship
    /// standing where it moves to, if any.
    OwnDeparting { partner: Option<ShipIdx> },
    /// An own ship stands here and stays.
    OwnStaying,
    /// An enemy ship stands here.
    Foreign,
}

/// Orders ships by cargo, then by lower ship id. `Greater` means `a` has
/// priority over `b`.
pub fn cargo_priority(a: &Ship, b: &Ship) -> Ordering {
    a.halite.cmp(&b.halite).then_with(|| b.id.cmp(&a.id))
}

/// The ship allowed through a crossfire: most cargo, lowest id on ties.
pub fn crossfire_winner(state: &GameState, ships: &[ShipIdx]) -> Option<ShipIdx> {
    ships
        .iter()
        .copied()
        .filter(|&s| state.ship(s).is_some())
        .max_by(|&a, &b| match (state.ship(a), state.ship(b)) {
            (Some(sa), Some(sb)) => cargo_priority(sa, sb),
            _ => Ordering::Equal,
        })
}

/// Turn-scoped rules: the threat map, the home cells and the config.
#[derive(Debug, Clone)]
pub struct ConflictRules {
    threats: ThreatMap,
    homes: Vec<bool>,
    home_exempt: bool,
}

impl ConflictRules {
    pub fn new(state: &GameState, config: &ResolverConfig, rng: &mut impl Rng) -> Self {
        let threats = ThreatMap::build(state, config.enemy_conflict_probability, rng);
        Self::with_threats(state, threats, config.home_exempt)
    }

    pub fn with_threats(state: &GameState, threats: ThreatMap, home_exempt: bool) -> Self {
        let mut homes = vec![false; state.map.cell_count()];
        for pos in state.my_homes() {
            homes[state.map.cell_index(pos)] = true;
        }
        ConflictRules {
            threats,
            homes,
            home_exempt,
        }
    }

    pub fn threats(&self) -> &ThreatMap {
        &self.threats
    }

    pub fn is_exempt(&self, cell: usize) -> bool {
        self.home_exempt && self.homes.get(cell).copied().unwrap_or(false)
    }

    /// A moving ship that respects enemies is heading into a threatened cell.
    fn threatened_for(&self, reg: &IntentRegistry<'_>, cell: usize, ship: ShipIdx) -> bool {
        self.threats.is_threatened(cell) && !reg.is_parked(ship) && !reg.ignores_enemies(ship)
    }

    /// Two or more ships are heading into the cell, or a ship is moving into
    /// a threatened cell. Exempt home cells are never conflicted.
    pub fn is_conflicted(&self, reg: &IntentRegistry<'_>, cell: usize) -> bool {
        if self.is_exempt(cell) {
            return false;
        }
        let incoming = reg.incoming_at(cell);
        incoming.len() >= 2
            || incoming
                .iter()
                .any(|&s| self.threatened_for(reg, cell, s))
    }

    pub fn classify(&self, reg: &IntentRegistry<'_>, cell: usize) -> CellClass {
        if self.is_exempt(cell) {
            return CellClass::HomeExempt;
        }
        let state = reg.state();
        let pos = state.map.position_of(cell);
        let Some(occupant) = state.map.ship_at(pos) else {
            return if self.threats.is_threatened(cell) {
                CellClass::EmptyThreatened
            } else {
                CellClass::Crossfire
            };
        };
        if !state.is_mine(occupant) {
            return CellClass::Foreign;
        }
        if reg.is_parked(occupant) {
            return CellClass::OwnStaying;
        }
        let partner = reg
            .destination(occupant)
            .and_then(|to| state.map.ship_at(to))
            .filter(|&s| state.is_mine(s));
        CellClass::OwnDeparting { partner }
    }

    /// The ships moving into `cell` that must be redirected, in bucket
    /// order. Parked ships are never returned: a ship is always allowed to
    /// keep the cell it stands on.
    pub fn losers(&self, reg: &IntentRegistry<'_>, cell: usize) -> Vec<ShipIdx> {
        self.losers_in(reg, cell, self.classify(reg, cell))
    }

    /// `losers` for a cell already classified as `class`.
    pub fn losers_in(
        &self,
        reg: &IntentRegistry<'_>,
        cell: usize,
        class: CellClass,
    ) -> Vec<ShipIdx> {
        let movers: Vec<ShipIdx> = reg
            .incoming_at(cell)
            .iter()
            .copied()
            .filter(|&s| !reg.is_parked(s))
            .collect();

        match class {
            CellClass::HomeExempt => Vec::new(),
            CellClass::Crossfire => all_but_winner(reg.state(), &movers),
            CellClass::EmptyThreatened => {
                let (bold, mut cautious): (Vec<ShipIdx>, Vec<ShipIdx>) =
                    movers.iter().partition(|&&s| reg.ignores_enemies(s));
                let winner = crossfire_winner(reg.state(), &bold);
                cautious.extend(bold.into_iter().filter(|&s| Some(s) != winner));
                keep_bucket_order(&movers, cautious)
            }
            CellClass::OwnDeparting { partner } => movers
                .into_iter()
                .filter(|&s| Some(s) != partner)
                .collect(),
            CellClass::OwnStaying | CellClass::Foreign => movers,
        }
    }
}

fn all_but_winner(state: &GameState, movers: &[ShipIdx]) -> Vec<ShipIdx> {
    let winner = crossfire_winner(state, movers);
    movers
        .iter()
        .copied()
        .filter(|&s| Some(s) != winner)
        .collect()
}

fn keep_bucket_order(movers: &[ShipIdx], chosen: Vec<ShipIdx>) -> Vec<ShipIdx> {
    movers
        .iter()
        .copied()
        .filter(|s| chosen.contains(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Constants, Direction, Position};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn state() -> GameState {
        GameState::empty(
            Constants::default(),
            0,
            8,
            8,
            &[(0, Position::new(0, 0)), (1, Position::new(6, 6))],
        )
    }

    #[test]
    fn cargo_priority_prefers_cargo_then_low_id() {
        let ship = |id, halite| Ship {
            id,
            owner: 0,
            position: Position::new(0, 0),
            halite,
        };
        assert_eq!(cargo_priority(&ship(1, 50), &ship(2, 10)), Ordering::Greater);
        assert_eq!(cargo_priority(&ship(1, 10), &ship(2, 10)), Ordering::Greater);
        assert_eq!(cargo_priority(&ship(3, 10), &ship(2, 10)), Ordering::Less);
    }

    #[test]
    fn crossfire_winner_is_total() {
        let mut state = state();
        let a = state.place_ship(0, 4, Position::new(1, 2), 30).unwrap();
        let b = state.place_ship(0, 2, Position::new(3, 2), 30).unwrap();
        let c = state.place_ship(0, 3, Position::new(2, 1), 10).unwrap();
        assert_eq!(crossfire_winner(&state, &[a, b, c]), Some(b));
        assert_eq!(crossfire_winner(&state, &[c, b, a]), Some(b));
        assert_eq!(crossfire_winner(&state, &[]), None);
    }

    #[test]
    fn threat_map_covers_enemy_and_neighbours() {
        let mut state = state();
        state.place_ship(1, 9, Position::new(0, 4), 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let threats = ThreatMap::build(&state, 1.0, &mut rng);
        let map = &state.map;
        for p in [
            Position::new(0, 4),
            Position::new(0, 3),
            Position::new(0, 5),
            Position::new(1, 4),
            Position::new(7, 4),
        ] {
            assert!(threats.is_threatened(map.cell_index(p)), "{p}");
        }
        assert!(!threats.is_contestable(map.cell_index(Position::new(2, 4))));
    }

    #[test]
    fn zero_probability_disables_threats() {
        let mut state = state();
        state.place_ship(1, 9, Position::new(3, 3), 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let threats = ThreatMap::build(&state, 0.0, &mut rng);
        let cell = state.map.cell_index(Position::new(3, 3));
        assert!(threats.is_contestable(cell));
        assert!(!threats.is_threatened(cell));
    }

    #[test]
    fn threat_draws_are_reproducible() {
        let mut state = state();
        state.place_ship(1, 9, Position::new(3, 3), 0).unwrap();
        state.place_ship(1, 10, Position::new(5, 1), 0).unwrap();
        let a = ThreatMap::build(&state, 0.5, &mut SmallRng::seed_from_u64(7));
        let b = ThreatMap::build(&state, 0.5, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn own_ships_raise_no_threat() {
        let mut state = state();
        state.place_ship(0, 1, Position::new(3, 3), 0).unwrap();
        let threats = ThreatMap::build(&state, 1.0, &mut SmallRng::seed_from_u64(1));
        assert!((0..state.map.cell_count()).all(|c| !threats.is_contestable(c)));
    }

    #[test]
    fn classify_cells() {
        let mut state = state();
        let stay = state.place_ship(0, 1, Position::new(2, 2), 0).unwrap();
        let leave = state.place_ship(0, 2, Position::new(4, 4), 0).unwrap();
        let partner = state.place_ship(0, 3, Position::new(4, 3), 0).unwrap();
        state.place_ship(1, 9, Position::new(6, 2), 0).unwrap();

        let mut reg = IntentRegistry::new(&state);
        reg.register(stay, &[Direction::Still], false).unwrap();
        reg.register(leave, &[Direction::North], false).unwrap();
        reg.register(partner, &[Direction::South], false).unwrap();

        let rules = ConflictRules::with_threats(
            &state,
            ThreatMap::build(&state, 1.0, &mut SmallRng::seed_from_u64(0)),
            true,
        );
        let map = &state.map;
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(0, 0))),
            CellClass::HomeExempt
        );
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(2, 2))),
            CellClass::OwnStaying
        );
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(4, 4))),
            CellClass::OwnDeparting {
                partner: Some(partner)
            }
        );
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(6, 2))),
            CellClass::Foreign
        );
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(5, 2))),
            CellClass::EmptyThreatened
        );
        assert_eq!(
            rules.classify(&reg, map.cell_index(Position::new(1, 5))),
            CellClass::Crossfire
        );
    }

    #[test]
    fn home_cell_never_conflicted_when_exempt() {
        let mut state = state();
        let a = state.place_ship(0, 1, Position::new(1, 0), 0).unwrap();
        let b = state.place_ship(0, 2, Position::new(0, 1), 0).unwrap();
        let mut reg = IntentRegistry::new(&state);
        reg.register(a, &[Direction::West], false).unwrap();
        reg.register(b, &[Direction::North], false).unwrap();
        let home = state.map.cell_index(Position::new(0, 0));

        let exempt = ConflictRules::with_threats(&state, ThreatMap::none(64), true);
        assert!(!exempt.is_conflicted(&reg, home));
        let strict = ConflictRules::with_threats(&state, ThreatMap::none(64), false);
        assert!(strict.is_conflicted(&reg, home));
    }

    #[test]
    fn threatened_cell_spares_enemy_ignoring_ship() {
        let mut state = state();
        let cautious = state.place_ship(0, 1, Position::new(3, 5), 0).unwrap();
        let bold = state.place_ship(0, 2, Position::new(3, 3), 0).unwrap();
        state.place_ship(1, 9, Position::new(4, 4), 0).unwrap();
        let mut reg = IntentRegistry::new(&state);
        reg.register(cautious, &[Direction::North], false).unwrap();
        reg.register(bold, &[Direction::South], true).unwrap();

        let threats = ThreatMap::build(&state, 1.0, &mut SmallRng::seed_from_u64(0));
        let rules = ConflictRules::with_threats(&state, threats, false);
        let cell = state.map.cell_index(Position::new(3, 4));
        assert!(rules.is_conflicted(&reg, cell));
        assert_eq!(rules.losers(&reg, cell), vec![cautious]);
    }

    #[test]
    fn parked_ship_never_loses_its_own_cell() {
        let mut state = state();
        let parked = state.place_ship(0, 1, Position::new(2, 2), 0).unwrap();
        let mover = state.place_ship(0, 2, Position::new(2, 3), 900).unwrap();
        let mut reg = IntentRegistry::new(&state);
        reg.register(parked, &[Direction::Still], false).unwrap();
        reg.register(mover, &[Direction::North], false).unwrap();
        let rules = ConflictRules::with_threats(&state, ThreatMap::none(64), false);
        let cell = state.map.cell_index(Position::new(2, 2));
        assert!(rules.is_conflicted(&reg, cell));
        assert_eq!(rules.losers(&reg, cell), vec![mover]);
    }

    #[test]
    fn losers_in_follows_the_given_class() {
        let mut state = state();
        let parked = state.place_ship(0, 1, Position::new(2, 2), 0).unwrap();
        let mover = state.place_ship(0, 2, Position::new(2, 3), 900).unwrap();
        let mut reg = IntentRegistry::new(&state);
        reg.register(parked, &[Direction::Still], false).unwrap();
        reg.register(mover, &[Direction::North], false).unwrap();
        let rules = ConflictRules::with_threats(&state, ThreatMap::none(64), false);
        let cell = state.map.cell_index(Position::new(2, 2));

        let class = rules.classify(&reg, cell);
        assert_eq!(class, CellClass::OwnStaying);
        assert_eq!(rules.losers_in(&reg, cell, class), rules.losers(&reg, cell));
        assert!(rules
            .losers_in(&reg, cell, CellClass::HomeExempt)
            .is_empty());
    }
}
