//! Corridor generation and connectivity repair
//!
//! Two phases:
//! 1. Walk the partition tree bottom-up and join one room from each child
//!    of every internal node with an L-shaped corridor.
//! 2. Find connected components of the door graph and join the closest
//!    room pair between the largest component and any other, until a
//!    single component remains or the attempt budget runs out.
//!
//! Each corridor gets at most one door, placed on the boundary of one of
//! the rooms it joins.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::GenerationSettings;
use crate::rng::GameRng;

use super::bsp::BspNode;
use super::data::DungeonData;
use super::door::{DoorOrientation, DungeonDoor};
use super::grid::{GridPosition, TileType};
use super::room::RoomId;

/// Default cap on cells per straight corridor segment
pub const DEFAULT_MAX_SEGMENT_LENGTH: usize = 200;
/// Default number of repair passes
pub const DEFAULT_MAX_REPAIR_ATTEMPTS: usize = 10;
/// Default longest corridor the repair pass will dig
pub const DEFAULT_MAX_REPAIR_DISTANCE: f32 = 100.0;
/// Default door cap per room
pub const DEFAULT_MAX_DOORS_PER_ROOM: usize = 4;

/// What the connector did, including any residual disconnection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub corridors: usize,
    pub doors: usize,
    /// Components left after the tree phase
    pub components_before_repair: usize,
    pub repair_attempts: usize,
    pub abandoned_pairs: Vec<(RoomId, RoomId)>,
    /// Components left when the connector finished
    pub residual_components: usize,
}

impl ConnectionReport {
    pub fn is_connected(&self) -> bool {
        self.residual_components <= 1
    }
}

/// A door placement candidate
#[derive(Debug, Clone, Copy)]
struct DoorCandidate {
    position: GridPosition,
    room: RoomId,
    /// Distance to the midpoint of the wall it sits on; `None` for fallbacks
    wall_offset: Option<f32>,
    orientation: Option<DoorOrientation>,
}

/// Joins rooms with corridors and doors
#[derive(Debug, Clone, Copy)]
pub struct CorridorConnector {
    pub corridor_width: usize,
    pub max_segment_length: usize,
    pub max_repair_attempts: usize,
    pub max_repair_distance: f32,
    pub max_doors_per_room: usize,
}

impl Default for CorridorConnector {
    fn default() -> Self {
        Self {
            corridor_width: 1,
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            max_repair_attempts: DEFAULT_MAX_REPAIR_ATTEMPTS,
            max_repair_distance: DEFAULT_MAX_REPAIR_DISTANCE,
            max_doors_per_room: DEFAULT_MAX_DOORS_PER_ROOM,
        }
    }
}

impl CorridorConnector {
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self {
            corridor_width: settings.corridor_width.max(1),
            max_segment_length: settings.max_corridor_length,
            max_repair_attempts: settings.max_repair_attempts,
            max_repair_distance: settings.max_repair_distance,
            max_doors_per_room: settings.max_doors_per_room,
        }
    }

    /// Run both phases
    pub fn connect(
        &self,
        tree: &BspNode,
        data: &mut DungeonData,
        rng: &mut GameRng,
    ) -> ConnectionReport {
        let (corridors, doors) = self.connect_tree(tree, data, rng);
        let mut report = self.repair_connectivity(data, rng);
        report.corridors += corridors;
        report.doors += doors;
        report
    }

    /// Phase 1: join sibling subtrees. Returns (corridors, doors) created.
    pub fn connect_tree(
        &self,
        tree: &BspNode,
        data: &mut DungeonData,
        rng: &mut GameRng,
    ) -> (usize, usize) {
        let mut counts = (0, 0);
        self.connect_node(tree, data, rng, &mut counts);
        debug!(corridors = counts.0, doors = counts.1, "connected partition tree");
        counts
    }

    fn connect_node(
        &self,
        node: &BspNode,
        data: &mut DungeonData,
        rng: &mut GameRng,
        counts: &mut (usize, usize),
    ) {
        let Some((left, right)) = node.children() else {
            return;
        };
        self.connect_node(left, data, rng, counts);
        self.connect_node(right, data, rng, counts);

        let left_rooms = left.rooms();
        let right_rooms = right.rooms();
        let (Some(&a), Some(&b)) = (rng.choose(&left_rooms), rng.choose(&right_rooms)) else {
            return;
        };
        counts.0 += 1;
        if self.connect_rooms(data, a, b, rng).is_some() {
            counts.1 += 1;
        }
    }

    /// Phase 2: merge components until one remains or attempts run out
    pub fn repair_connectivity(&self, data: &mut DungeonData, rng: &mut GameRng) -> ConnectionReport {
        let mut report = ConnectionReport {
            components_before_repair: data.graph().components().len(),
            ..ConnectionReport::default()
        };
        let mut abandoned: HashSet<(RoomId, RoomId)> = HashSet::new();

        loop {
            let components = data.graph().components();
            report.residual_components = components.len();
            if components.len() <= 1 {
                break;
            }
            if report.repair_attempts >= self.max_repair_attempts {
                error!(
                    components = components.len(),
                    attempts = report.repair_attempts,
                    "connectivity repair exhausted, layout left disconnected"
                );
                break;
            }
            report.repair_attempts += 1;

            let Some((a, b, distance)) = self.closest_pair(data, &components, &abandoned) else {
                error!(
                    components = components.len(),
                    "no joinable room pair left, layout left disconnected"
                );
                break;
            };

            if distance > self.max_repair_distance {
                warn!(
                    room_a = a.index(),
                    room_b = b.index(),
                    distance,
                    "repair pair too far apart, abandoning"
                );
                abandoned.insert((a, b));
                report.abandoned_pairs.push((a, b));
                continue;
            }

            report.corridors += 1;
            if self.connect_rooms(data, a, b, rng).is_some() {
                report.doors += 1;
            } else {
                abandoned.insert((a, b));
                report.abandoned_pairs.push((a, b));
            }
        }

        debug!(
            attempts = report.repair_attempts,
            residual = report.residual_components,
            "connectivity repair finished"
        );
        report
    }

    /// Closest pair with one room in the largest component and one outside it.
    /// Rooms at the door cap and abandoned pairs are skipped.
    fn closest_pair(
        &self,
        data: &DungeonData,
        components: &[Vec<RoomId>],
        abandoned: &HashSet<(RoomId, RoomId)>,
    ) -> Option<(RoomId, RoomId, f32)> {
        let largest = components
            .iter()
            .enumerate()
            .fold(0, |best, (i, c)| if c.len() > components[best].len() { i } else { best });

        let has_capacity =
            |id: RoomId| data.room(id).is_some_and(|r| r.door_count() < self.max_doors_per_room);

        let mut best: Option<(RoomId, RoomId, f32)> = None;
        for &a in &components[largest] {
            if !has_capacity(a) {
                continue;
            }
            let Some(room_a) = data.room(a) else { continue };
            for (i, component) in components.iter().enumerate() {
                if i == largest {
                    continue;
                }
                for &b in component {
                    if !has_capacity(b) || abandoned.contains(&(a, b)) {
                        continue;
                    }
                    let Some(room_b) = data.room(b) else { continue };
                    let distance = room_a.center().distance(room_b.center());
                    if best.is_none_or(|(_, _, d)| distance < d) {
                        best = Some((a, b, distance));
                    }
                }
            }
        }
        best
    }

    /// Carve an L-shaped corridor between two room centers and try to place a door.
    /// Returns the new door's index. A corridor cut short by the segment cap
    /// gets no door, so the rooms stay unjoined in the door graph.
    pub fn connect_rooms(
        &self,
        data: &mut DungeonData,
        a: RoomId,
        b: RoomId,
        rng: &mut GameRng,
    ) -> Option<usize> {
        if a == b {
            return None;
        }
        let from = data.room(a)?.center();
        let to = data.room(b)?.center();
        let Some(path) = self.carve_corridor(data, from, to, rng) else {
            warn!(room_a = a.index(), room_b = b.index(), "corridor truncated, no door placed");
            return None;
        };
        self.place_door(data, &path, a, b)
    }

    /// Dig two straight segments from `from` to `to`, horizontal or vertical first
    /// at random. Returns every cell the corridor covers, in digging order, or
    /// `None` when a segment hit the length cap before reaching its end. The
    /// second segment is not dug after a truncated first one.
    pub fn carve_corridor(
        &self,
        data: &mut DungeonData,
        from: GridPosition,
        to: GridPosition,
        rng: &mut GameRng,
    ) -> Option<Vec<GridPosition>> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let corner = if rng.coin() {
            GridPosition::new(to.x, from.y)
        } else {
            GridPosition::new(from.x, to.y)
        };
        let complete = self.carve_segment(data, from, corner, &mut path, &mut seen)
            && self.carve_segment(data, corner, to, &mut path, &mut seen);
        complete.then_some(path)
    }

    fn carve_segment(
        &self,
        data: &mut DungeonData,
        from: GridPosition,
        to: GridPosition,
        path: &mut Vec<GridPosition>,
        seen: &mut HashSet<GridPosition>,
    ) -> bool {
        let horizontal = from.y == to.y;
        let (dx, dy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
        let width = self.corridor_width as i32;
        let mut cursor = from;
        let mut steps = 0;

        loop {
            for band in 0..width {
                let cell = if horizontal {
                    cursor.offset(0, band)
                } else {
                    cursor.offset(band, 0)
                };
                self.carve_cell(data, cell, path, seen);
            }
            if cursor == to {
                return true;
            }
            if steps >= self.max_segment_length {
                warn!(
                    from_x = from.x,
                    from_y = from.y,
                    to_x = to.x,
                    to_y = to.y,
                    cap = self.max_segment_length,
                    "corridor segment hit length cap"
                );
                return false;
            }
            cursor = cursor.offset(dx, dy);
            steps += 1;
        }
    }

    fn carve_cell(
        &self,
        data: &mut DungeonData,
        cell: GridPosition,
        path: &mut Vec<GridPosition>,
        seen: &mut HashSet<GridPosition>,
    ) {
        let Some(tile) = data.grid.get(cell) else {
            return;
        };
        if tile == TileType::Wall {
            data.grid.set(cell, TileType::Floor);
            data.add_corridor_tile(cell);
        }
        if seen.insert(cell) {
            path.push(cell);
        }
    }

    /// Place one door for a freshly carved corridor between `a` and `b`
    pub fn place_door(
        &self,
        data: &mut DungeonData,
        path: &[GridPosition],
        a: RoomId,
        b: RoomId,
    ) -> Option<usize> {
        let room_a = data.room(a)?;
        let room_b = data.room(b)?;
        if room_a.door_count() >= self.max_doors_per_room
            || room_b.door_count() >= self.max_doors_per_room
        {
            warn!(room_a = a.index(), room_b = b.index(), "door cap reached, no door placed");
            return None;
        }
        if data.are_directly_connected(a, b) {
            debug!(room_a = a.index(), room_b = b.index(), "rooms already joined");
            return None;
        }

        let mut candidates = Vec::new();
        let mut fallbacks = Vec::new();
        for id in [a, b] {
            let found = boundary_candidates(data, path, id);
            if found.is_empty() {
                fallbacks.extend(fallback_candidate(data, path, id));
            } else {
                candidates.extend(found);
            }
        }

        let chosen = pick_best(&candidates, |c| c.wall_offset.unwrap_or(f32::MAX))
            .or_else(|| {
                pick_best(&fallbacks, |c| {
                    data.room(c.room)
                        .map_or(f32::MAX, |r| r.bounds().distance_to_perimeter(c.position))
                })
            })?;

        let orientation = chosen
            .orientation
            .unwrap_or_else(|| orientation_from_path(path, chosen.position));
        let other = if chosen.room == a { b } else { a };
        let door = DungeonDoor::between(chosen.position, orientation, chosen.room, other);
        Some(data.add_door(door))
    }
}

/// First candidate with the lowest score
fn pick_best(candidates: &[DoorCandidate], score: impl Fn(&DoorCandidate) -> f32) -> Option<DoorCandidate> {
    let mut best: Option<(DoorCandidate, f32)> = None;
    for candidate in candidates {
        let s = score(candidate);
        if best.is_none_or(|(_, b)| s < b) {
            best = Some((*candidate, s));
        }
    }
    best.map(|(c, _)| c)
}

/// Corridor cells on the room's boundary with a full 3x3 neighbourhood in the grid
fn boundary_candidates(data: &DungeonData, path: &[GridPosition], id: RoomId) -> Vec<DoorCandidate> {
    let Some(room) = data.room(id) else {
        return Vec::new();
    };
    let bounds = room.bounds();
    path.iter()
        .filter(|&&pos| data.grid.has_clearance(pos) && data.grid.get(pos) != Some(TileType::Door))
        .filter_map(|&pos| {
            let side = bounds.side_of(pos)?;
            let orientation = if side.is_horizontal() {
                DoorOrientation::Horizontal
            } else {
                DoorOrientation::Vertical
            };
            Some(DoorCandidate {
                position: pos,
                room: id,
                wall_offset: Some(pos.distance(bounds.side_midpoint(side))),
                orientation: Some(orientation),
            })
        })
        .collect()
}

/// The corridor cell nearest the room's perimeter, if it lies on the wall
fn fallback_candidate(data: &DungeonData, path: &[GridPosition], id: RoomId) -> Option<DoorCandidate> {
    let bounds = data.room(id)?.bounds();
    let mut best: Option<(GridPosition, f32)> = None;
    for &pos in path {
        if data.grid.get(pos) == Some(TileType::Door) {
            continue;
        }
        let d = bounds.distance_to_perimeter(pos);
        if best.is_none_or(|(_, b)| d < b) {
            best = Some((pos, d));
        }
    }
    // Off-wall cells never become doors
    best.filter(|&(pos, _)| bounds.on_boundary(pos))
        .map(|(position, _)| DoorCandidate {
            position,
            room: id,
            wall_offset: None,
            orientation: None,
        })
}

/// A corridor running east-west passes through a vertical wall and vice versa
fn orientation_from_path(path: &[GridPosition], pos: GridPosition) -> DoorOrientation {
    let runs_horizontally =
        path.contains(&pos.offset(-1, 0)) || path.contains(&pos.offset(1, 0));
    if runs_horizontally {
        DoorOrientation::Vertical
    } else {
        DoorOrientation::Horizontal
    }
}
