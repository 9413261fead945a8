//! Turn commands and their wire encoding.
//!
//! The engine expects every command for a turn on a single line, separated
//! by spaces: `m <id> <dir>` to move, `c <id>` to build a dropoff and `g` to
//! spawn a ship at the shipyard.

use std::fmt;

use crate::board::{Direction, ShipId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move (or hold with `Direction::Still`): `m 12 n`
    Move { ship: ShipId, dir: Direction },

    /// Convert the ship into a dropoff: `c 12`
    Construct { ship: ShipId },

    /// Spawn a new ship at the shipyard: `g`
    Spawn,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { ship, dir } => write!(f, "m {} {}", ship, dir.wire_char()),
            Command::Construct { ship } => write!(f, "c {}", ship),
            Command::Spawn => write!(f, "g"),
        }
    }
}

/// Formats a full turn of commands as one line, without the newline.
pub fn format_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
