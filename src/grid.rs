//! Grid addressing
//!
//! Cells of a square grid are stored row by row, so `(x, y)` lives at
//! `y * side + x`. The chain stores pixels with the same layout.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CANVAS_SIZE: u32 = 24;

pub const CANVAS_GRID: Grid = Grid::new(CANVAS_SIZE);

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid coordinate ({x}, {y})")]
    InvalidInput { x: i64, y: i64 },
    #[error("out of bounds: {0}")]
    OutOfBounds(OutOfBounds),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutOfBounds {
    Coord(Coord),
    Index(u32),
}

impl std::fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutOfBounds::Coord(c) => write!(f, "({}, {})", c.x, c.y),
            OutOfBounds::Index(i) => write!(f, "index {i}"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Coord {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Grid {
    side: u32,
}

impl Grid {
    pub const fn new(side: u32) -> Self {
        Self { side }
    }

    /// Number of cells
    pub const fn len(self) -> u32 {
        self.side * self.side
    }

    pub fn contains(self, coord: Coord) -> bool {
        coord.x < self.side && coord.y < self.side
    }

    pub fn to_index(self, x: u32, y: u32) -> Result<u32, GridError> {
        let coord = Coord { x, y };
        if !self.contains(coord) {
            return Err(GridError::OutOfBounds(OutOfBounds::Coord(coord)));
        }
        Ok(y * self.side + x)
    }

    pub fn coord_to_index(self, coord: Coord) -> Result<u32, GridError> {
        self.to_index(coord.x, coord.y)
    }

    pub fn from_index(self, index: u32) -> Result<Coord, GridError> {
        if index >= self.len() {
            return Err(GridError::OutOfBounds(OutOfBounds::Index(index)));
        }
        Ok(Coord {
            x: index % self.side,
            y: index / self.side,
        })
    }

    /// Validates coordinates that arrive as signed integers
    pub fn coord_from_signed(self, x: i64, y: i64) -> Result<Coord, GridError> {
        let (ux, uy) = match (u32::try_from(x), u32::try_from(y)) {
            (Ok(ux), Ok(uy)) => (ux, uy),
            _ if x < 0 || y < 0 => return Err(GridError::InvalidInput { x, y }),
            // positive but wider than u32: certainly outside any grid
            _ => (u32::MAX, u32::MAX),
        };
        let coord = Coord { x: ux, y: uy };
        if !self.contains(coord) {
            return Err(GridError::OutOfBounds(OutOfBounds::Coord(coord)));
        }
        Ok(coord)
    }
}

impl Default for Grid {
    fn default() -> Self {
        CANVAS_GRID
    }
}
