//! Doors between rooms and the exterior entrance

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::grid::GridPosition;
use super::room::RoomId;

/// Which way the door leaf runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum DoorOrientation {
    /// Sits in a top or bottom wall
    Horizontal,
    /// Sits in a left or right wall
    Vertical,
}

/// Progression state of a door
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum DoorState {
    Open,
    #[default]
    Closed,
    Locked,
    /// Needs game logic outside the layout to open
    Sealed,
    Hidden,
}

/// A door on a room boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonDoor {
    pub position: GridPosition,
    pub orientation: DoorOrientation,
    pub state: DoorState,
    pub is_entrance: bool,
    pub room_a: Option<RoomId>,
    /// Absent for the exterior entrance
    pub room_b: Option<RoomId>,
}

impl DungeonDoor {
    /// Door joining two rooms
    pub fn between(
        position: GridPosition,
        orientation: DoorOrientation,
        room_a: RoomId,
        room_b: RoomId,
    ) -> Self {
        Self {
            position,
            orientation,
            state: DoorState::Closed,
            is_entrance: false,
            room_a: Some(room_a),
            room_b: Some(room_b),
        }
    }

    /// Exterior entrance into `room`
    pub fn entrance(position: GridPosition, orientation: DoorOrientation, room: RoomId) -> Self {
        Self {
            position,
            orientation,
            state: DoorState::Open,
            is_entrance: true,
            room_a: Some(room),
            room_b: None,
        }
    }

    pub fn touches(&self, room: RoomId) -> bool {
        self.room_a == Some(room) || self.room_b == Some(room)
    }

    /// Whether this door joins exactly these two rooms, in either order
    pub fn joins(&self, a: RoomId, b: RoomId) -> bool {
        (self.room_a == Some(a) && self.room_b == Some(b))
            || (self.room_a == Some(b) && self.room_b == Some(a))
    }

    /// Both endpoints, if this is an interior door
    pub fn endpoints(&self) -> Option<(RoomId, RoomId)> {
        match (self.room_a, self.room_b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}
