//! Movement-intent resolution.
//!
//! Reconciles each ship's ranked directions into a collision-free set of
//! moves: the registry tracks intents and destinations, the conflict rules
//! decide who gives way at a contested cell, and the resolver drives the
//! board to a fixed point.

pub mod conflict;
pub mod movement;
pub mod registry;
pub mod resolver;

pub use conflict::{cargo_priority, crossfire_winner, CellClass, ConflictRules, ResolverConfig, ThreatMap};
pub use movement::MovementMap;
pub use registry::{IntentError, IntentRegistry};
pub use resolver::{resolve_intents, ConflictResolver, ResolveStats};
