//! Generated dungeon container
//!
//! `DungeonData` owns the tile grid and the flat room, door and corridor
//! lists every phase reads and writes. Entities are only ever appended;
//! a new run starts from `clear`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::door::DungeonDoor;
use super::graph::RoomGraph;
use super::grid::{Grid, GridPosition, TileType};
use super::rect::Rect;
use super::room::{Room, RoomId, RoomType};

/// Complete output of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonData {
    pub seed: u64,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub doors: Vec<DungeonDoor>,
    /// Cells carved outside any room
    pub corridor_tiles: Vec<GridPosition>,
    rooms_by_type: BTreeMap<RoomType, Vec<RoomId>>,
    pub starting_room: Option<RoomId>,
}

impl DungeonData {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            seed: 0,
            grid: Grid::new(width, height),
            rooms: Vec::new(),
            doors: Vec::new(),
            corridor_tiles: Vec::new(),
            rooms_by_type: BTreeMap::new(),
            starting_room: None,
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Drop every entity and reset the grid to walls. Dimensions are kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.rooms.clear();
        self.doors.clear();
        self.corridor_tiles.clear();
        self.rooms_by_type.clear();
        self.starting_room = None;
    }

    /// Register a room over `bounds` and write its floor tiles.
    /// Returns `None` if the bounds leave the grid.
    pub fn add_room(&mut self, bounds: Rect) -> Option<RoomId> {
        let grid_rect = Rect::new(0, 0, self.width() as i32, self.height() as i32);
        if bounds.width <= 0 || bounds.height <= 0 || !grid_rect.contains_rect(&bounds) {
            return None;
        }
        let id = RoomId(self.rooms.len());
        let room = Room::new(id, bounds);
        for &pos in &room.floor_tiles {
            self.grid.set(pos, TileType::Floor);
        }
        self.rooms_by_type.entry(room.room_type).or_default().push(id);
        self.rooms.push(room);
        Some(id)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id.index())
    }

    /// Reclassify a room, keeping the type index in step
    pub fn set_room_type(&mut self, id: RoomId, room_type: RoomType) {
        let Some(room) = self.rooms.get_mut(id.index()) else {
            return;
        };
        let old = room.room_type;
        if old == room_type {
            return;
        }
        room.room_type = room_type;
        if let Some(list) = self.rooms_by_type.get_mut(&old) {
            list.retain(|&r| r != id);
            if list.is_empty() {
                self.rooms_by_type.remove(&old);
            }
        }
        let list = self.rooms_by_type.entry(room_type).or_default();
        list.push(id);
        list.sort();
    }

    /// Rooms currently of `room_type`, in id order
    pub fn rooms_of_type(&self, room_type: RoomType) -> &[RoomId] {
        self.rooms_by_type
            .get(&room_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The `roomsByType` index
    pub fn rooms_by_type(&self) -> &BTreeMap<RoomType, Vec<RoomId>> {
        &self.rooms_by_type
    }

    /// Append a door, stamp its tile and record it on the rooms it touches
    pub fn add_door(&mut self, door: DungeonDoor) -> usize {
        self.grid.set(door.position, TileType::Door);
        for id in [door.room_a, door.room_b].into_iter().flatten() {
            if let Some(room) = self.rooms.get_mut(id.index()) {
                room.door_positions.push(door.position);
            }
        }
        self.doors.push(door);
        self.doors.len() - 1
    }

    pub fn add_corridor_tile(&mut self, pos: GridPosition) {
        self.corridor_tiles.push(pos);
    }

    /// Whether a door already joins `a` and `b` directly
    pub fn are_directly_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.doors.iter().any(|door| door.joins(a, b))
    }

    /// Number of doors touching the room
    pub fn connection_count(&self, id: RoomId) -> usize {
        self.doors.iter().filter(|door| door.touches(id)).count()
    }

    /// Index of the room whose bounds contain `pos`
    pub fn room_at(&self, pos: GridPosition) -> Option<RoomId> {
        self.rooms.iter().find(|room| room.contains(pos)).map(|room| room.id)
    }

    pub fn graph(&self) -> RoomGraph {
        RoomGraph::from_doors(self.rooms.len(), &self.doors)
    }

    pub fn is_fully_connected(&self) -> bool {
        self.graph().components().len() <= 1
    }

    /// Textual debug summary for logs and tooling
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Dungeon {}x{} (seed {})", self.width(), self.height(), self.seed);
        let _ = writeln!(
            out,
            "Rooms: {}  Doors: {}  Corridor tiles: {}",
            self.rooms.len(),
            self.doors.len(),
            self.corridor_tiles.len()
        );
        match self.starting_room.and_then(|id| self.room(id)) {
            Some(room) => {
                let center = room.center();
                let _ = writeln!(
                    out,
                    "Starting room: #{} at ({}, {})",
                    room.id.index(),
                    center.x,
                    center.y
                );
            }
            None => {
                let _ = writeln!(out, "Starting room: none");
            }
        }
        let _ = writeln!(out, "Fully connected: {}", self.is_fully_connected());
        let _ = writeln!(out, "Room types:");
        for (room_type, ids) in &self.rooms_by_type {
            let _ = writeln!(out, "  {room_type}: {}", ids.len());
        }
        out
    }

    /// ASCII map. The starting room's center is drawn as `@`.
    pub fn render_ascii(&self) -> String {
        let start = self
            .starting_room
            .and_then(|id| self.room(id))
            .map(Room::center);
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for (x, tile) in self.grid.row(y).iter().enumerate() {
                if start == Some(GridPosition::new(x as i32, y as i32)) {
                    out.push('@');
                } else {
                    out.push(tile.glyph());
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{DoorOrientation, DungeonDoor};

    #[test]
    fn test_add_room_writes_floor_and_index() {
        let mut data = DungeonData::new(30, 30);
        let id = data.add_room(Rect::new(2, 2, 6, 6)).unwrap();
        assert_eq!(id, RoomId(0));
        assert_eq!(data.grid.count(TileType::Floor), 36);
        assert_eq!(data.rooms_of_type(RoomType::SmallRoom), &[id]);
    }

    #[test]
    fn test_add_room_rejects_out_of_bounds() {
        let mut data = DungeonData::new(10, 10);
        assert!(data.add_room(Rect::new(5, 5, 6, 6)).is_none());
        assert!(data.add_room(Rect::new(-1, 0, 3, 3)).is_none());
        assert!(data.rooms.is_empty());
    }

    #[test]
    fn test_set_room_type_reindexes() {
        let mut data = DungeonData::new(30, 30);
        let a = data.add_room(Rect::new(2, 2, 6, 6)).unwrap();
        let b = data.add_room(Rect::new(12, 2, 6, 6)).unwrap();
        data.set_room_type(a, RoomType::StartingRoom);
        assert_eq!(data.rooms_of_type(RoomType::SmallRoom), &[b]);
        assert_eq!(data.rooms_of_type(RoomType::StartingRoom), &[a]);
        data.set_room_type(b, RoomType::StartingRoom);
        assert!(data.rooms_of_type(RoomType::SmallRoom).is_empty());
        assert!(!data.rooms_by_type().contains_key(&RoomType::SmallRoom));
    }

    #[test]
    fn test_add_door_records_on_rooms() {
        let mut data = DungeonData::new(30, 30);
        let a = data.add_room(Rect::new(2, 2, 6, 6)).unwrap();
        let b = data.add_room(Rect::new(12, 2, 6, 6)).unwrap();
        let pos = GridPosition::new(7, 4);
        data.add_door(DungeonDoor::between(pos, DoorOrientation::Vertical, a, b));
        assert_eq!(data.grid.get(pos), Some(TileType::Door));
        assert!(data.are_directly_connected(b, a));
        assert_eq!(data.connection_count(a), 1);
        assert_eq!(data.room(b).unwrap().door_positions, vec![pos]);
        assert!(data.is_fully_connected());
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut data = DungeonData::new(20, 15);
        data.add_room(Rect::new(2, 2, 6, 6));
        data.clear();
        assert!(data.rooms.is_empty());
        assert_eq!(data.width(), 20);
        assert_eq!(data.height(), 15);
        assert_eq!(data.grid.count(TileType::Floor), 0);
    }

    #[test]
    fn test_summary_and_ascii() {
        let mut data = DungeonData::new(12, 10);
        let a = data.add_room(Rect::new(2, 2, 6, 6)).unwrap();
        data.starting_room = Some(a);
        let summary = data.summary();
        assert!(summary.contains("Rooms: 1"));
        assert!(summary.contains("Starting room: #0 at (5, 5)"));
        let ascii = data.render_ascii();
        assert_eq!(ascii.lines().count(), 10);
        assert_eq!(ascii.matches('@').count(), 1);
    }
}
