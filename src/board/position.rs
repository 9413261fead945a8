//! Grid coordinates and movement directions.
//!
//! `Position` is a plain `(x, y)` pair. Wrap-around is the map's job:
//! `directional_offset` may step off the grid and `GameMap::normalize`
//! brings the result back.

use std::fmt;
use std::ops::Add;

/// One of the five moves a ship can make in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Still,
}

impl Direction {
    /// The four directions that actually move a ship.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Returns the single-character wire abbreviation.
    pub const fn wire_char(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
            Direction::Still => 'o',
        }
    }

    /// Parses a direction from its wire abbreviation.
    pub fn from_wire_char(c: char) -> Option<Direction> {
        match c {
            'n' => Some(Direction::North),
            's' => Some(Direction::South),
            'e' => Some(Direction::East),
            'w' => Some(Direction::West),
            'o' => Some(Direction::Still),
            _ => None,
        }
    }

    /// Returns the `(dx, dy)` step for this direction. North is `y - 1`.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Still => (0, 0),
        }
    }

    pub const fn is_still(self) -> bool {
        matches!(self, Direction::Still)
    }
}

/// An unnormalized cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Steps one cell in `dir` without wrapping.
    pub fn directional_offset(self, dir: Direction) -> Position {
        let (dx, dy) = dir.offset();
        Position::new(self.x + dx, self.y + dy)
    }

    /// The four unwrapped neighbours in `Direction::CARDINALS` order.
    pub fn surrounding_cardinals(self) -> [Position; 4] {
        Direction::CARDINALS.map(|d| self.directional_offset(d))
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}
