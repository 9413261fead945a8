//! Engine protocol handling.
//!
//! Parses the init and per-turn frame messages the game engine writes to
//! stdin, and formats the command line the bot answers with.

pub mod command;
pub mod parser;

pub use command::{format_commands, Command};
pub use parser::{InputReader, ProtocolError};
