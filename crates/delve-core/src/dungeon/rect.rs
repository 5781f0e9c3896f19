//! Axis-aligned rectangles for partitions and room bounds

use serde::{Deserialize, Serialize};

use super::grid::GridPosition;

/// Side of a rectangle a boundary cell lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RectSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl RectSide {
    /// Top and bottom sides run horizontally
    pub fn is_horizontal(self) -> bool {
        matches!(self, RectSide::Top | RectSide::Bottom)
    }
}

/// A rectangle in grid cells. `x`/`y` is the top-left cell, extents are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        (self.width.max(0) * self.height.max(0)) as usize
    }

    pub fn center(&self) -> GridPosition {
        GridPosition::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= self.x && pos.x < self.right() && pos.y >= self.y && pos.y < self.bottom()
    }

    /// Check if this rectangle fully contains another
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Side of the outermost ring this cell lies on, if any.
    /// Corner cells report their top/bottom side.
    pub fn side_of(&self, pos: GridPosition) -> Option<RectSide> {
        if !self.contains(pos) {
            return None;
        }
        if pos.y == self.y {
            Some(RectSide::Top)
        } else if pos.y == self.bottom() - 1 {
            Some(RectSide::Bottom)
        } else if pos.x == self.x {
            Some(RectSide::Left)
        } else if pos.x == self.right() - 1 {
            Some(RectSide::Right)
        } else {
            None
        }
    }

    /// Whether the cell lies on the outermost ring of this rectangle
    pub fn on_boundary(&self, pos: GridPosition) -> bool {
        self.side_of(pos).is_some()
    }

    /// Midpoint cell of a side
    pub fn side_midpoint(&self, side: RectSide) -> GridPosition {
        let mid_x = self.x + (self.width - 1) / 2;
        let mid_y = self.y + (self.height - 1) / 2;
        match side {
            RectSide::Top => GridPosition::new(mid_x, self.y),
            RectSide::Bottom => GridPosition::new(mid_x, self.bottom() - 1),
            RectSide::Left => GridPosition::new(self.x, mid_y),
            RectSide::Right => GridPosition::new(self.right() - 1, mid_y),
        }
    }

    /// Euclidean distance from a cell to the outermost ring.
    /// Zero for boundary cells.
    pub fn distance_to_perimeter(&self, pos: GridPosition) -> f32 {
        let (left, top) = (self.x, self.y);
        let (right, bottom) = (self.right() - 1, self.bottom() - 1);
        if self.contains(pos) {
            let inset = (pos.x - left)
                .min(right - pos.x)
                .min(pos.y - top)
                .min(bottom - pos.y);
            return inset as f32;
        }
        let dx = (left - pos.x).max(0).max(pos.x - right);
        let dy = (top - pos.y).max(0).max(pos.y - bottom);
        ((dx * dx + dy * dy) as f32).sqrt()
    }
}
