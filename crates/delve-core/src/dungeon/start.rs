//! Starting room selection and exterior entrance carving
//!
//! Every room is scored against `StartingPointCriteria`. Three hard gates
//! (size, connections, accessibility) zero a room's score outright; the
//! rest are additive terms. The best positive score wins, ties going to the
//! earlier room.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, error, warn};

use crate::config::{MapEdge, StartingPointCriteria};

use super::data::DungeonData;
use super::door::{DoorOrientation, DungeonDoor};
use super::graph::RoomGraph;
use super::grid::{GridPosition, TileType};
use super::rect::Rect;
use super::room::{RoomId, RoomType};

const SIZE_BASE_SCORE: f32 = 10.0;
const PER_CONNECTION_SCORE: f32 = 5.0;
const TOUCHING_EDGE_BONUS: f32 = 25.0;
const PREFERRED_EDGE_BONUS: f32 = 15.0;
const CENTRALITY_WEIGHT: f32 = 15.0;
const CORNER_PENALTY: f32 = 30.0;
const ACCESSIBILITY_WEIGHT: f32 = 20.0;
const MEDIUM_ROOM_BONUS: f32 = 8.0;
const LARGE_ROOM_BONUS: f32 = 5.0;

/// Depth of the exterior vestibule, in cells
pub const VESTIBULE_DEPTH: i32 = 3;
/// Width of the exterior vestibule, in cells
pub const VESTIBULE_WIDTH: i32 = 3;

/// Why a room failed a hard gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Rejection {
    #[strum(to_string = "too small")]
    TooSmall,
    #[strum(to_string = "too few connections")]
    TooFewConnections,
    #[strum(to_string = "poor accessibility")]
    PoorAccessibility,
}

/// Score breakdown for one candidate room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomScore {
    pub room: RoomId,
    pub score: f32,
    pub rejection: Option<Rejection>,
    pub connections: usize,
    pub accessibility: f32,
    pub nearest_edge: MapEdge,
    /// Wall cells between the room and its nearest map edge
    pub edge_distance: i32,
}

/// Outcome of start selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartSelection {
    pub room: Option<RoomId>,
    pub scores: Vec<RoomScore>,
    /// Index of the entrance door, if one was carved
    pub entrance: Option<usize>,
    /// The room failed a gate and was taken only because nothing scored above zero
    pub fallback: bool,
}

/// Picks and marks the starting room
#[derive(Debug, Clone, Default)]
pub struct StartingPointSelector {
    pub criteria: StartingPointCriteria,
}

impl StartingPointSelector {
    pub fn new(criteria: StartingPointCriteria) -> Self {
        Self { criteria }
    }

    /// Score every room, mark the winner as the start and optionally carve an entrance
    pub fn select(&self, data: &mut DungeonData) -> StartSelection {
        if data.rooms.is_empty() {
            warn!("no rooms to choose a start from");
            return StartSelection::default();
        }

        let graph = data.graph();
        let scores: Vec<RoomScore> = data
            .rooms
            .iter()
            .map(|room| self.score_room(data, &graph, room.id))
            .collect();

        let mut winner: Option<&RoomScore> = None;
        for candidate in scores.iter().filter(|s| s.score > 0.0) {
            if winner.is_none_or(|w| candidate.score > w.score) {
                winner = Some(candidate);
            }
        }
        let (winner, fallback) = match winner {
            Some(w) => (Some(w.room), false),
            None => (self.fallback(data, &scores), true),
        };

        let Some(room) = winner else {
            error!(rooms = data.rooms.len(), "no room qualifies as the starting room");
            return StartSelection {
                room: None,
                scores,
                entrance: None,
                fallback: false,
            };
        };

        self.mark_start(data, room);
        let entrance = if self.criteria.create_exterior_entrance {
            let edge = scores[room.index()].nearest_edge;
            carve_entrance(data, room, edge)
        } else {
            None
        };

        debug!(room = room.index(), score = scores[room.index()].score, "selected starting room");
        StartSelection {
            room: Some(room),
            scores,
            entrance,
            fallback,
        }
    }

    /// When nothing scores above zero, take the best-connected room that still
    /// meets the size gate. The size gate is never bypassed.
    fn fallback(&self, data: &DungeonData, scores: &[RoomScore]) -> Option<RoomId> {
        let mut best: Option<&RoomScore> = None;
        for score in scores {
            let big_enough = data
                .room(score.room)
                .is_some_and(|r| r.area() >= self.criteria.min_room_area);
            if big_enough && best.is_none_or(|b| score.connections > b.connections) {
                best = Some(score);
            }
        }
        if let Some(best) = best {
            let bypassed = best
                .rejection
                .map_or_else(|| "non-positive score".to_string(), |r| r.to_string());
            warn!(
                room = best.room.index(),
                %bypassed,
                connections = best.connections,
                "no room scored above zero, falling back to a gated room"
            );
        }
        best.map(|b| b.room)
    }

    fn mark_start(&self, data: &mut DungeonData, room: RoomId) {
        let previous: Vec<RoomId> = data
            .rooms
            .iter()
            .filter(|r| r.is_starting_room || r.room_type == RoomType::StartingRoom)
            .map(|r| r.id)
            .collect();
        for id in previous {
            let area = data.room(id).map_or(0, |r| r.area());
            data.set_room_type(id, RoomType::from_area(area));
            if let Some(r) = data.room_mut(id) {
                r.is_starting_room = false;
            }
        }

        data.set_room_type(room, RoomType::StartingRoom);
        if let Some(r) = data.room_mut(room) {
            r.is_starting_room = true;
        }
        data.starting_room = Some(room);
    }

    /// Score a single room
    pub fn score_room(&self, data: &DungeonData, graph: &RoomGraph, id: RoomId) -> RoomScore {
        let criteria = &self.criteria;
        let connections = data.connection_count(id);
        let accessibility = if data.rooms.is_empty() {
            0.0
        } else {
            graph.reachable_count(id) as f32 / data.rooms.len() as f32
        };
        let (nearest_edge, edge_distance) = nearest_edge(data, id);

        let mut result = RoomScore {
            room: id,
            score: 0.0,
            rejection: None,
            connections,
            accessibility,
            nearest_edge,
            edge_distance,
        };
        let Some(room) = data.room(id) else {
            return result;
        };

        if room.area() < criteria.min_room_area {
            result.rejection = Some(Rejection::TooSmall);
            return result;
        }
        if connections < criteria.min_connections {
            result.rejection = Some(Rejection::TooFewConnections);
            return result;
        }
        if accessibility < criteria.min_accessibility_ratio {
            result.rejection = Some(Rejection::PoorAccessibility);
            return result;
        }

        let mut score = SIZE_BASE_SCORE;

        if connections <= criteria.max_connections {
            score += PER_CONNECTION_SCORE * connections as f32;
        } else {
            score -= PER_CONNECTION_SCORE * (connections - criteria.max_connections) as f32;
        }

        let width = data.width() as f32;
        let height = data.height() as f32;
        let center = room.center();

        if criteria.prefer_map_edge {
            let span = match nearest_edge {
                MapEdge::North | MapEdge::South => height,
                MapEdge::East | MapEdge::West => width,
            };
            let closeness = 1.0 - edge_distance as f32 / (span / 2.0);
            score += closeness * criteria.edge_preference_strength;
            if edge_distance < 2 {
                score += TOUCHING_EDGE_BONUS;
            }
            if criteria.preferred_edge.matches(nearest_edge) {
                score += PREFERRED_EDGE_BONUS;
            } else {
                score -= PREFERRED_EDGE_BONUS;
            }
        } else {
            let dx = center.x as f32 - width / 2.0;
            let dy = center.y as f32 - height / 2.0;
            let max_distance = ((width / 2.0).powi(2) + (height / 2.0).powi(2)).sqrt();
            if max_distance > 0.0 {
                score += (1.0 - (dx * dx + dy * dy).sqrt() / max_distance) * CENTRALITY_WEIGHT;
            }
        }

        if !criteria.allow_corners && near_corner(data, center, criteria.corner_avoidance_radius) {
            score -= CORNER_PENALTY;
        }

        score += accessibility * ACCESSIBILITY_WEIGHT;

        score += match room.room_type {
            RoomType::MediumRoom => MEDIUM_ROOM_BONUS,
            RoomType::LargeRoom => LARGE_ROOM_BONUS,
            _ => 0.0,
        };

        result.score = score;
        result
    }
}

/// Nearest map edge to a room's bounds and the gap to it
fn nearest_edge(data: &DungeonData, id: RoomId) -> (MapEdge, i32) {
    let Some(room) = data.room(id) else {
        return (MapEdge::North, 0);
    };
    let bounds = room.bounds();
    let gaps = edge_gaps(data, bounds);
    gaps.into_iter()
        .fold((MapEdge::North, i32::MAX), |best, (edge, gap)| {
            if gap < best.1 { (edge, gap) } else { best }
        })
}

fn edge_gaps(data: &DungeonData, bounds: Rect) -> [(MapEdge, i32); 4] {
    [
        (MapEdge::North, bounds.y),
        (MapEdge::South, data.height() as i32 - bounds.bottom()),
        (MapEdge::East, data.width() as i32 - bounds.right()),
        (MapEdge::West, bounds.x),
    ]
}

fn near_corner(data: &DungeonData, center: GridPosition, radius: f32) -> bool {
    let (w, h) = (data.width() as i32 - 1, data.height() as i32 - 1);
    [
        GridPosition::new(0, 0),
        GridPosition::new(w, 0),
        GridPosition::new(0, h),
        GridPosition::new(w, h),
    ]
    .iter()
    .any(|&corner| center.distance(corner) < radius)
}

fn outward(edge: MapEdge) -> (i32, i32) {
    match edge {
        MapEdge::North => (0, -1),
        MapEdge::South => (0, 1),
        MapEdge::East => (1, 0),
        MapEdge::West => (-1, 0),
    }
}

/// Turn a boundary cell of `room` facing `edge` into an open entrance door and
/// carve a small vestibule outside it. Other edges are tried, nearest first,
/// if that side has no usable cell. Returns the door index; a room that
/// already has an entrance keeps it.
pub fn carve_entrance(data: &mut DungeonData, room: RoomId, edge: MapEdge) -> Option<usize> {
    if let Some(existing) = data
        .doors
        .iter()
        .position(|d| d.is_entrance && d.room_a == Some(room))
    {
        return Some(existing);
    }
    let bounds = data.room(room)?.bounds();
    let mut edges = edge_gaps(data, bounds);
    edges.sort_by_key(|&(e, gap)| (e != edge, gap));

    for (edge, _) in edges {
        let Some(position) = entrance_cell(data, bounds, edge) else {
            continue;
        };
        let orientation = match edge {
            MapEdge::North | MapEdge::South => DoorOrientation::Horizontal,
            MapEdge::East | MapEdge::West => DoorOrientation::Vertical,
        };
        let index = data.add_door(DungeonDoor::entrance(position, orientation, room));

        let (ox, oy) = outward(edge);
        let (px, py) = (oy.abs(), ox.abs());
        for depth in 1..=VESTIBULE_DEPTH {
            for lateral in -(VESTIBULE_WIDTH / 2)..=(VESTIBULE_WIDTH / 2) {
                let cell = position.offset(ox * depth + px * lateral, oy * depth + py * lateral);
                if data.grid.get(cell) == Some(TileType::Wall) {
                    data.grid.set(cell, TileType::Floor);
                    data.add_corridor_tile(cell);
                }
            }
        }
        debug!(room = room.index(), x = position.x, y = position.y, %edge, "carved entrance");
        return Some(index);
    }

    warn!(room = room.index(), "no boundary cell can take an entrance");
    None
}

/// Middle boundary cell on `edge` whose outside neighbour is still wall
fn entrance_cell(data: &DungeonData, bounds: Rect, edge: MapEdge) -> Option<GridPosition> {
    let cells: Vec<GridPosition> = match edge {
        MapEdge::North => (bounds.x + 1..bounds.right() - 1)
            .map(|x| GridPosition::new(x, bounds.y))
            .collect(),
        MapEdge::South => (bounds.x + 1..bounds.right() - 1)
            .map(|x| GridPosition::new(x, bounds.bottom() - 1))
            .collect(),
        MapEdge::West => (bounds.y + 1..bounds.bottom() - 1)
            .map(|y| GridPosition::new(bounds.x, y))
            .collect(),
        MapEdge::East => (bounds.y + 1..bounds.bottom() - 1)
            .map(|y| GridPosition::new(bounds.right() - 1, y))
            .collect(),
    };
    let (ox, oy) = outward(edge);
    let candidates: Vec<GridPosition> = cells
        .into_iter()
        .filter(|&pos| {
            data.grid.get(pos) == Some(TileType::Floor)
                && data.grid.get(pos.offset(ox, oy)) == Some(TileType::Wall)
        })
        .collect();
    candidates.get(candidates.len() / 2).copied()
}
