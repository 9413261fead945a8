//! Worklist-driven conflict resolution.
//!
//! Seeds a FIFO worklist with every contested destination, then settles one
//! cell at a time: the losers at that cell fall back to their next ranked
//! direction until they reach an uncontested cell or park. A ship that parks
//! on a contested cell pushes that cell back onto the worklist so it is
//! classified again with the parked ship as a stationary occupant.
//!
//! Every redirect consumes one entry of a finite list and every ship parks at
//! most once, so the loop always terminates.

use std::collections::VecDeque;

use tracing::trace;

use crate::board::ShipIdx;

use super::conflict::ConflictRules;
use super::registry::IntentRegistry;

/// Counters from one resolution pass, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Contested cells that were actually settled.
    pub conflicts: usize,
    /// Queue entries consumed across all ships.
    pub redirects: usize,
    /// Ships that ran out of moves and parked during resolution.
    pub parked: usize,
}

/// Reusable resolver. The worklist buffer survives between turns.
pub struct ConflictResolver {
    worklist: VecDeque<usize>,
    stats: ResolveStats,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictResolver {
    pub fn new() -> Self {
        ConflictResolver {
            worklist: VecDeque::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Drives the registry to a state with no contested destination.
    pub fn resolve(&mut self, reg: &mut IntentRegistry<'_>, rules: &ConflictRules) -> ResolveStats {
        self.worklist.clear();
        self.stats = ResolveStats::default();

        for cell in reg.touched_cells() {
            if rules.is_conflicted(reg, cell) {
                self.worklist.push_back(cell);
            }
        }

        while let Some(cell) = self.worklist.pop_front() {
            // Earlier redirects may already have settled this cell.
            if !rules.is_conflicted(reg, cell) {
                continue;
            }
            self.stats.conflicts += 1;

            let class = rules.classify(reg, cell);
            let losers = rules.losers_in(reg, cell, class);
            trace!(
                cell,
                ?class,
                losers = losers.len(),
                "settling conflict"
            );
            for ship in losers {
                self.redirect(reg, rules, ship);
            }
        }

        self.stats
    }

    /// Moves `ship` off its current choice, then keeps falling back while the
    /// new destination is still contested.
    fn redirect(&mut self, reg: &mut IntentRegistry<'_>, rules: &ConflictRules, ship: ShipIdx) {
        if reg.is_parked(ship) {
            return;
        }

        reg.advance(ship);
        self.stats.redirects += 1;
        while !reg.is_parked(ship) {
            match reg.destination_index(ship) {
                Some(cell) if rules.is_conflicted(reg, cell) => {
                    reg.advance(ship);
                    self.stats.redirects += 1;
                }
                _ => break,
            }
        }

        if reg.is_parked(ship) {
            self.stats.parked += 1;
            if let Some(own) = reg.destination_index(ship) {
                if rules.is_conflicted(reg, own) {
                    self.worklist.push_back(own);
                }
            }
        }
    }
}

/// Convenience wrapper: resolves `reg` once with a fresh resolver.
pub fn resolve_intents(reg: &mut IntentRegistry<'_>, rules: &ConflictRules) -> ResolveStats {
    ConflictResolver::new().resolve(reg, rules)
}
