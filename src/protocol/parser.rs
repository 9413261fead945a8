//! Game engine input parser.
//!
//! The engine speaks a line-oriented text protocol on stdin. Initialization
//! sends the constants as one JSON line, the player count and our id, one
//! shipyard line per player, the map size and then one row of halite per map
//! line. Every following frame carries the turn number, each player's ships,
//! dropoffs and bank, and the list of cells whose halite changed.

use std::io::BufRead;

use thiserror::Error;
use tracing::{trace, warn};

use crate::board::{Constants, GameState, PlayerId, Position};

/// Largest map side accepted in the init header.
pub const MAX_MAP_SIDE: i64 = 256;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected end of input")]
    Eof,

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected {expected} values, found {found}")]
    MissingToken {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    #[error("invalid constants: {0}")]
    Constants(#[from] serde_json::Error),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("position {x} {y} is outside the {width}x{height} map")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: i32,
        height: i32,
    },
}

/// Reads init and frame messages from a buffered stream, tracking line
/// numbers for error reports.
pub struct InputReader<R> {
    inner: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(inner: R) -> Self {
        InputReader {
            inner,
            line: String::new(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Reads the initialization message and builds the starting state.
    pub fn read_init(&mut self) -> Result<GameState, ProtocolError> {
        let constants = Constants::from_json(self.next_line()?.trim())?;

        let [num_players, my_id] = self.numbers::<2>()?;
        let num_players = self.to_u32(num_players)? as usize;
        let my_id = self.to_u32(my_id)?;

        let mut shipyards = Vec::with_capacity(num_players);
        for _ in 0..num_players {
            let [pid, x, y] = self.numbers::<3>()?;
            shipyards.push((self.to_u32(pid)?, (x, y)));
        }

        let [width, height] = self.numbers::<2>()?;
        if !(1..=MAX_MAP_SIDE).contains(&width) || !(1..=MAX_MAP_SIDE).contains(&height) {
            return Err(ProtocolError::InvalidNumber {
                line: self.line_no,
                token: format!("{width} {height}"),
            });
        }
        let (width, height) = (width as i32, height as i32);

        let shipyards = shipyards
            .into_iter()
            .map(|(pid, (x, y))| Ok((pid, bounded(x, y, width, height)?)))
            .collect::<Result<Vec<_>, ProtocolError>>()?;
        if !shipyards.iter().any(|&(pid, _)| pid == my_id) {
            return Err(ProtocolError::UnknownPlayer(my_id));
        }

        let mut state = GameState::empty(constants, my_id, width, height, &shipyards);
        for y in 0..height {
            let row = self.row(width as usize)?;
            for (x, halite) in row.into_iter().enumerate() {
                state.map.at_mut(Position::new(x as i32, y)).halite = halite;
            }
        }

        trace!(
            players = state.players.len(),
            my_id,
            width,
            height,
            "init read"
        );
        Ok(state)
    }

    /// Reads one frame and applies it to `state`. Ships and dropoffs are
    /// rebuilt from scratch; halite changes are patched in.
    pub fn read_frame(&mut self, state: &mut GameState) -> Result<(), ProtocolError> {
        let [turn] = self.numbers::<1>()?;
        state.turn = self.to_u32(turn)?;
        state.clear_entities();

        let (width, height) = (state.map.width, state.map.height);
        for _ in 0..state.players.len() {
            let [pid, num_ships, num_dropoffs, halite] = self.numbers::<4>()?;
            let pid = self.to_u32(pid)?;
            let halite = self.to_u32(halite)?;
            let player = state
                .player_mut(pid)
                .ok_or(ProtocolError::UnknownPlayer(pid))?;
            player.halite = halite;

            for _ in 0..num_ships {
                let [id, x, y, cargo] = self.numbers::<4>()?;
                let id = self.to_u32(id)?;
                let cargo = self.to_u32(cargo)?;
                let pos = bounded(x, y, width, height)?;
                if state.place_ship(pid, id, pos, cargo).is_none() {
                    warn!(player = pid, ship = id, %pos, "two ships reported on one cell, dropping");
                }
            }

            for _ in 0..num_dropoffs {
                let [id, x, y] = self.numbers::<3>()?;
                let id = self.to_u32(id)?;
                let pos = bounded(x, y, width, height)?;
                state.place_dropoff(pid, id, pos);
            }
        }

        let [updates] = self.numbers::<1>()?;
        for _ in 0..updates {
            let [x, y, halite] = self.numbers::<3>()?;
            let halite = self.to_u32(halite)?;
            let pos = bounded(x, y, width, height)?;
            state.map.at_mut(pos).halite = halite;
        }

        trace!(turn = state.turn, ships = state.ships.len(), updates, "frame read");
        Ok(())
    }

    fn next_line(&mut self) -> Result<&str, ProtocolError> {
        self.line.clear();
        if self.inner.read_line(&mut self.line)? == 0 {
            return Err(ProtocolError::Eof);
        }
        self.line_no += 1;
        Ok(&self.line)
    }

    /// Reads a line holding exactly `N` integers. Extra tokens are ignored.
    fn numbers<const N: usize>(&mut self) -> Result<[i64; N], ProtocolError> {
        let line_no = self.line_no + 1;
        let line = self.next_line()?;
        let mut values = [0i64; N];
        let mut found = 0;
        for (slot, token) in values.iter_mut().zip(line.split_whitespace()) {
            *slot = parse_int(line_no, token)?;
            found += 1;
        }
        if found < N {
            return Err(ProtocolError::MissingToken {
                line: line_no,
                expected: N,
                found,
            });
        }
        Ok(values)
    }

    /// Reads a line of `len` non-negative halite values.
    fn row(&mut self, len: usize) -> Result<Vec<u32>, ProtocolError> {
        let line_no = self.line_no + 1;
        let line = self.next_line()?;
        let row = line
            .split_whitespace()
            .take(len)
            .map(|token| {
                token.parse::<u32>().map_err(|_| ProtocolError::InvalidNumber {
                    line: line_no,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if row.len() < len {
            return Err(ProtocolError::MissingToken {
                line: line_no,
                expected: len,
                found: row.len(),
            });
        }
        Ok(row)
    }

    fn to_u32(&self, value: i64) -> Result<u32, ProtocolError> {
        u32::try_from(value).map_err(|_| ProtocolError::InvalidNumber {
            line: self.line_no,
            token: value.to_string(),
        })
    }
}

fn parse_int(line: usize, token: &str) -> Result<i64, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn bounded(x: i64, y: i64, width: i32, height: i32) -> Result<Position, ProtocolError> {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return Err(ProtocolError::OutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    Ok(Position::new(x as i32, y as i32))
}
