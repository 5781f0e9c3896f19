//! Special room assignment (boss, guard, treasure, laboratory)
//!
//! Runs after progression so it can read `distance_from_start`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data::DungeonData;
use super::room::{RoomId, RoomType};

/// Dead ends at least this deep become treasure rooms
pub const TREASURE_MIN_DISTANCE: i32 = 2;

/// Rooms that were given a special role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub boss: Option<RoomId>,
    pub guard: Option<RoomId>,
    pub treasures: Vec<RoomId>,
    pub laboratory: Option<RoomId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoomSpecializer;

impl RoomSpecializer {
    pub fn assign(&self, data: &mut DungeonData) -> Specialization {
        let mut result = Specialization::default();
        let Some(start) = data.starting_room else {
            return result;
        };
        let graph = data.graph();

        let mut boss: Option<(RoomId, i32)> = None;
        for room in &data.rooms {
            if room.id != start
                && room.distance_from_start > 0
                && boss.is_none_or(|(_, d)| room.distance_from_start > d)
            {
                boss = Some((room.id, room.distance_from_start));
            }
        }
        if let Some((id, _)) = boss {
            data.set_room_type(id, RoomType::BossRoom);
            result.boss = Some(id);

            if let Some(path) = graph.path(start, id)
                && path.len() >= 3
            {
                let guard = path[path.len() - 2];
                data.set_room_type(guard, RoomType::GuardRoom);
                result.guard = Some(guard);
            }
        }

        let treasures: Vec<RoomId> = data
            .rooms
            .iter()
            .filter(|room| {
                room.room_type.is_size_class()
                    && room.distance_from_start >= TREASURE_MIN_DISTANCE
                    && graph.neighbors(room.id).count() == 1
            })
            .map(|room| room.id)
            .collect();
        for &id in &treasures {
            data.set_room_type(id, RoomType::TreasureRoom);
        }
        result.treasures = treasures;

        let mut laboratory: Option<(RoomId, usize)> = None;
        for room in data.rooms.iter().filter(|r| r.room_type == RoomType::MediumRoom) {
            if laboratory.is_none_or(|(_, area)| room.area() > area) {
                laboratory = Some((room.id, room.area()));
            }
        }
        if let Some((id, _)) = laboratory {
            data.set_room_type(id, RoomType::Laboratory);
            result.laboratory = Some(id);
        }

        debug!(
            boss = ?result.boss,
            guard = ?result.guard,
            treasures = result.treasures.len(),
            "assigned special rooms"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{
        DoorOrientation, DungeonDoor, GridPosition, ProgressionInitializer, Rect,
    };

    /// 0 - 1 - 2 - 3, with 4 hanging off 0 and 5 hanging off 2
    fn branching() -> DungeonData {
        let mut data = DungeonData::new(100, 40);
        data.add_room(Rect::new(2, 2, 8, 8));
        data.add_room(Rect::new(22, 2, 12, 12));
        data.add_room(Rect::new(42, 2, 12, 12));
        data.add_room(Rect::new(62, 2, 8, 8));
        data.add_room(Rect::new(22, 22, 8, 8));
        data.add_room(Rect::new(42, 22, 8, 8));
        for (a, b) in [(0, 1), (1, 2), (2, 3), (0, 4), (2, 5)] {
            data.add_door(DungeonDoor::between(
                GridPosition::new(0, 0),
                DoorOrientation::Vertical,
                RoomId(a),
                RoomId(b),
            ));
        }
        data.starting_room = Some(RoomId(0));
        data.set_room_type(RoomId(0), RoomType::StartingRoom);
        ProgressionInitializer.initialize(&mut data);
        data
    }

    #[test]
    fn test_assigns_roles() {
        let mut data = branching();
        let result = RoomSpecializer.assign(&mut data);

        assert_eq!(result.boss, Some(RoomId(3)));
        assert_eq!(result.guard, Some(RoomId(2)));
        assert_eq!(result.treasures, vec![RoomId(5)]);
        assert_eq!(result.laboratory, Some(RoomId(1)));
        assert_eq!(data.rooms_of_type(RoomType::BossRoom), &[RoomId(3)]);
        assert_eq!(data.rooms_of_type(RoomType::TreasureRoom), &[RoomId(5)]);
        assert_eq!(data.rooms_of_type(RoomType::SmallRoom), &[RoomId(4)]);
    }

    #[test]
    fn test_without_start_does_nothing() {
        let mut data = branching();
        data.starting_room = None;
        assert_eq!(RoomSpecializer.assign(&mut data), Specialization::default());
    }
}
