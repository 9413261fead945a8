//! Ship behaviour.
//!
//! Decides what each ship wants this turn. The output is a ranked direction
//! list per ship; the resolve module makes the lists collision-free.

pub mod navigator;

pub use navigator::{Navigator, ShipStatus};
