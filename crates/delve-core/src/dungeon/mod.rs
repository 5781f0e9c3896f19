//! Dungeon system
//!
//! Contains the tile grid, rooms, doors and every generation phase from
//! space partitioning to post-generation validation.

mod bsp;
mod carver;
mod corridor;
mod data;
mod door;
mod generation;
mod graph;
mod grid;
mod progression;
mod rect;
mod room;
mod special;
mod start;
mod validator;

pub use bsp::{BspNode, SpacePartitioner, DEFAULT_MAX_DEPTH, FORCED_SPLIT_RATIO};
pub use carver::{RoomCarver, DEFAULT_PADDING};
pub use corridor::{
    ConnectionReport, CorridorConnector, DEFAULT_MAX_DOORS_PER_ROOM, DEFAULT_MAX_REPAIR_ATTEMPTS,
    DEFAULT_MAX_REPAIR_DISTANCE, DEFAULT_MAX_SEGMENT_LENGTH,
};
pub use data::DungeonData;
pub use door::{DoorOrientation, DoorState, DungeonDoor};
pub use generation::{DungeonGenerator, GeneratedDungeon, GenerationObserver, GenerationPhase};
pub use graph::RoomGraph;
pub use grid::{Grid, GridPosition, TileType};
pub use progression::ProgressionInitializer;
pub use rect::{Rect, RectSide};
pub use room::{Room, RoomId, RoomType, MEDIUM_ROOM_MAX_AREA, SMALL_ROOM_MAX_AREA};
pub use special::{RoomSpecializer, Specialization, TREASURE_MIN_DISTANCE};
pub use start::{
    carve_entrance, Rejection, RoomScore, StartSelection, StartingPointSelector, VESTIBULE_DEPTH,
    VESTIBULE_WIDTH,
};
pub use validator::{DungeonValidator, ValidationResult};
