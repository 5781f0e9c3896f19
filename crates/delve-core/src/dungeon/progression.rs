//! Distance labelling and door-state gating

use tracing::{debug, warn};

use super::data::DungeonData;
use super::door::DoorState;

/// Labels room distances from the start and assigns door states
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionInitializer;

impl ProgressionInitializer {
    /// BFS from the starting room, then gate doors:
    /// entrance doors open, doors on the start room closed, every other door sealed.
    /// Returns the greatest distance reached.
    pub fn initialize(&self, data: &mut DungeonData) -> i32 {
        let Some(start) = data.starting_room else {
            warn!("no starting room, progression left uninitialised");
            return -1;
        };

        let distances = data.graph().distances_from(start);
        for room in &mut data.rooms {
            room.distance_from_start = distances.get(room.id.index()).copied().unwrap_or(-1);
        }

        for door in &mut data.doors {
            door.state = if door.is_entrance {
                DoorState::Open
            } else if door.touches(start) {
                DoorState::Closed
            } else {
                DoorState::Sealed
            };
        }

        let deepest = distances.iter().copied().max().unwrap_or(-1);
        let unreachable = distances.iter().filter(|&&d| d < 0).count();
        debug!(deepest, unreachable, "initialised progression");
        deepest
    }
}
