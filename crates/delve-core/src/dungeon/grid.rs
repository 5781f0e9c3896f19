//! Tile grid and grid coordinates

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: GridPosition) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Terrain of a single cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileType {
    #[default]
    Wall = 0,
    Floor = 1,
    Door = 2,
}

impl TileType {
    pub const fn is_passable(&self) -> bool {
        matches!(self, TileType::Floor | TileType::Door)
    }

    /// ASCII glyph used by debug rendering
    pub const fn glyph(&self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
            TileType::Door => '+',
        }
    }
}

/// Fixed-size tile grid, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
}

impl Grid {
    /// Create a grid filled with walls
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileType::Wall; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Whether the full 3x3 neighbourhood of `pos` lies inside the grid
    pub fn has_clearance(&self, pos: GridPosition) -> bool {
        self.in_bounds(pos.offset(-1, -1)) && self.in_bounds(pos.offset(1, 1))
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Tile at `pos`, or `None` outside the grid
    pub fn get(&self, pos: GridPosition) -> Option<TileType> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Set the tile at `pos`. Returns false when out of bounds.
    pub fn set(&mut self, pos: GridPosition, tile: TileType) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Reset every tile to wall
    pub fn clear(&mut self) {
        self.tiles.fill(TileType::Wall);
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Tiles of row `y`, left to right
    pub fn row(&self, y: usize) -> &[TileType] {
        let start = y * self.width;
        &self.tiles[start..start + self.width]
    }
}
