//! The toroidal game map.
//!
//! `GameMap` is the single authority on wrap-around: every destination,
//! distance and neighbourhood query normalizes through it. Cells are stored
//! row-major and addressed by `cell_index` for O(1) lookup.

use super::position::{Direction, Position};
use super::unit::{ShipIdx, Structure};

/// One grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapCell {
    pub halite: u32,
    /// Arena index of the ship standing here this turn, if any.
    pub ship: Option<ShipIdx>,
    pub structure: Option<Structure>,
}

impl MapCell {
    pub fn is_occupied(&self) -> bool {
        self.ship.is_some()
    }

    pub fn has_structure(&self) -> bool {
        self.structure.is_some()
    }
}

/// Fixed-size wrap-around grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    cells: Vec<MapCell>,
}

impl GameMap {
    /// Creates a map with every cell empty and holding no halite.
    pub fn new(width: i32, height: i32) -> Self {
        let len = width.max(0) as usize * height.max(0) as usize;
        GameMap {
            width,
            height,
            cells: vec![MapCell::default(); len],
        }
    }

    /// Number of cells on the map.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Wraps a position onto the grid.
    pub fn normalize(&self, pos: Position) -> Position {
        Position::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    /// Row-major index of the (normalized) position.
    pub fn cell_index(&self, pos: Position) -> usize {
        let p = self.normalize(pos);
        (p.y * self.width + p.x) as usize
    }

    /// Inverse of `cell_index`.
    pub fn position_of(&self, index: usize) -> Position {
        let i = index as i32;
        Position::new(i % self.width, i / self.width)
    }

    pub fn at(&self, pos: Position) -> &MapCell {
        let idx = self.cell_index(pos);
        &self.cells[idx]
    }

    pub fn at_mut(&mut self, pos: Position) -> &mut MapCell {
        let idx = self.cell_index(pos);
        &mut self.cells[idx]
    }

    pub fn halite(&self, pos: Position) -> u32 {
        self.at(pos).halite
    }

    pub fn ship_at(&self, pos: Position) -> Option<ShipIdx> {
        self.at(pos).ship
    }

    /// Total halite on the map.
    pub fn total_halite(&self) -> u64 {
        self.cells.iter().map(|c| c.halite as u64).sum()
    }

    /// Clears every ship reference; called before a frame re-populates them.
    pub fn clear_ships(&mut self) {
        for cell in &mut self.cells {
            cell.ship = None;
        }
    }

    /// The normalized cell reached by stepping once from `pos` in `dir`.
    pub fn destination(&self, pos: Position, dir: Direction) -> Position {
        self.normalize(pos.directional_offset(dir))
    }

    /// The four normalized neighbours of `pos`.
    pub fn neighbours(&self, pos: Position) -> [Position; 4] {
        pos.surrounding_cardinals().map(|p| self.normalize(p))
    }

    /// Manhattan distance on the torus.
    pub fn distance(&self, a: Position, b: Position) -> i32 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }

    /// Directions that shorten the toroidal distance from `source` to
    /// `target`, ignoring any occupancy. Empty when they coincide.
    pub fn unsafe_moves(&self, source: Position, target: Position) -> Vec<Direction> {
        let source = self.normalize(source);
        let target = self.normalize(target);
        let mut moves = Vec::with_capacity(2);

        let dx = (source.x - target.x).abs();
        let dy = (source.y - target.y).abs();
        let wrapped_dx = self.width - dx;
        let wrapped_dy = self.height - dy;

        if source.x < target.x {
            moves.push(if dx > wrapped_dx { Direction::West } else { Direction::East });
        } else if source.x > target.x {
            moves.push(if dx < wrapped_dx { Direction::West } else { Direction::East });
        }

        if source.y < target.y {
            moves.push(if dy > wrapped_dy { Direction::North } else { Direction::South });
        } else if source.y > target.y {
            moves.push(if dy < wrapped_dy { Direction::North } else { Direction::South });
        }

        moves
    }

    /// Every normalized cell within Manhattan `radius` of `center`,
    /// including the centre itself, in ascending position order.
    pub fn within_radius(&self, center: Position, radius: i32) -> Vec<Position> {
        let mut cells = Vec::new();
        for dx in -radius..=radius {
            let span = radius - dx.abs();
            for dy in -span..=span {
                cells.push(self.normalize(center + Position::new(dx, dy)));
            }
        }
        cells.sort();
        cells.dedup();
        cells
    }
}
