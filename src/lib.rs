//! drydock, a Halite III bot library.
//!
//! Exposes the board representation, movement resolver, strategy, tunables
//! and protocol modules for use by integration tests and the binary entry
//! point.

pub mod board;
pub mod engine;
pub mod logging;
pub mod protocol;
pub mod resolve;
pub mod strategy;
pub mod tunables;
