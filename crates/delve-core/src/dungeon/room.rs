//! Room types and structures
//!
//! Rooms are plain records owned by `DungeonData` and referenced everywhere
//! else by `RoomId`, their index in the room list.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::grid::GridPosition;
use super::rect::Rect;

/// Area at or below which a carved room is Small
pub const SMALL_ROOM_MAX_AREA: usize = 100;
/// Area at or below which a carved room is Medium
pub const MEDIUM_ROOM_MAX_AREA: usize = 400;

/// Stable room identifier (index into `DungeonData::rooms`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

impl RoomId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Room role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum RoomType {
    StartingRoom = 0,
    #[default]
    SmallRoom = 1,
    MediumRoom = 2,
    LargeRoom = 3,
    Corridor = 4,
    TreasureRoom = 5,
    GuardRoom = 6,
    Laboratory = 7,
    BossRoom = 8,
}

impl RoomType {
    /// Size class for a freshly carved room
    pub fn from_area(area: usize) -> Self {
        if area <= SMALL_ROOM_MAX_AREA {
            RoomType::SmallRoom
        } else if area <= MEDIUM_ROOM_MAX_AREA {
            RoomType::MediumRoom
        } else {
            RoomType::LargeRoom
        }
    }

    /// Whether this is one of the three plain size classes
    pub fn is_size_class(self) -> bool {
        matches!(
            self,
            RoomType::SmallRoom | RoomType::MediumRoom | RoomType::LargeRoom
        )
    }
}

/// A placed rectangular room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    bounds: Rect,
    center: GridPosition,
    pub room_type: RoomType,
    /// Positions of doors touching this room
    pub door_positions: Vec<GridPosition>,
    pub floor_tiles: Vec<GridPosition>,
    /// BFS distance from the starting room, -1 until computed or if unreachable
    pub distance_from_start: i32,
    pub is_starting_room: bool,
}

impl Room {
    /// Create a room over `bounds`, typed by area, with its floor tile list filled in
    pub fn new(id: RoomId, bounds: Rect) -> Self {
        let floor_tiles = (bounds.y..bounds.bottom())
            .flat_map(|y| (bounds.x..bounds.right()).map(move |x| GridPosition::new(x, y)))
            .collect();
        Self {
            id,
            bounds,
            center: bounds.center(),
            room_type: RoomType::from_area(bounds.area()),
            door_positions: Vec::new(),
            floor_tiles,
            distance_from_start: -1,
            is_starting_room: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> GridPosition {
        self.center
    }

    pub fn area(&self) -> usize {
        self.bounds.area()
    }

    pub fn door_count(&self) -> usize {
        self.door_positions.len()
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.bounds.contains(pos)
    }

    pub fn on_boundary(&self, pos: GridPosition) -> bool {
        self.bounds.on_boundary(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_from_area() {
        assert_eq!(RoomType::from_area(36), RoomType::SmallRoom);
        assert_eq!(RoomType::from_area(100), RoomType::SmallRoom);
        assert_eq!(RoomType::from_area(101), RoomType::MediumRoom);
        assert_eq!(RoomType::from_area(400), RoomType::MediumRoom);
        assert_eq!(RoomType::from_area(401), RoomType::LargeRoom);
    }

    #[test]
    fn test_new_room() {
        let room = Room::new(RoomId(3), Rect::new(4, 5, 10, 12));
        assert_eq!(room.center(), GridPosition::new(9, 11));
        assert_eq!(room.area(), 120);
        assert_eq!(room.room_type, RoomType::MediumRoom);
        assert_eq!(room.floor_tiles.len(), 120);
        assert_eq!(room.distance_from_start, -1);
        assert!(!room.is_starting_room);
        assert!(room.on_boundary(GridPosition::new(4, 8)));
        assert!(!room.on_boundary(GridPosition::new(6, 8)));
    }
}
