//! Room carving inside partition leaves

use tracing::debug;

use crate::rng::GameRng;

use super::bsp::BspNode;
use super::data::DungeonData;
use super::rect::Rect;

/// Default margin between a room and its partition edges
pub const DEFAULT_PADDING: usize = 2;

/// Places one randomly sized room in each leaf that can hold one
#[derive(Debug, Clone, Copy)]
pub struct RoomCarver {
    pub padding: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
}

impl RoomCarver {
    pub fn new(min_room_size: usize, max_room_size: usize, padding: usize) -> Self {
        Self {
            padding,
            min_room_size,
            max_room_size: max_room_size.max(min_room_size),
        }
    }

    /// Carve rooms into every leaf of `tree`. Returns how many were placed.
    pub fn carve(&self, tree: &mut BspNode, data: &mut DungeonData, rng: &mut GameRng) -> usize {
        let mut carved = 0;
        for leaf in tree.leaves_mut() {
            if let Some(bounds) = self.room_bounds(leaf.bounds, rng)
                && let Some(id) = data.add_room(bounds)
            {
                leaf.room = Some(id);
                carved += 1;
            }
        }
        debug!(rooms = carved, "carved rooms");
        carved
    }

    /// Pick room bounds inside a partition, or `None` if it is too small
    pub fn room_bounds(&self, partition: Rect, rng: &mut GameRng) -> Option<Rect> {
        let pad = self.padding as i32;
        let min = self.min_room_size as i32;
        let max_width = partition.width - 2 * pad;
        let max_height = partition.height - 2 * pad;
        if max_width < min || max_height < min {
            debug!(
                x = partition.x,
                y = partition.y,
                width = partition.width,
                height = partition.height,
                "partition too small for a room"
            );
            return None;
        }

        let cap = self.max_room_size as i32;
        let width = rng.range(min, max_width.min(cap));
        let height = rng.range(min, max_height.min(cap));
        let x = partition.x + pad + rng.range(0, max_width - width);
        let y = partition.y + pad + rng.range(0, max_height - height);
        Some(Rect::new(x, y, width, height))
    }
}

impl Default for RoomCarver {
    fn default() -> Self {
        Self::new(6, 20, DEFAULT_PADDING)
    }
}
