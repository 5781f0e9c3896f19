//! Post-generation structural and balance checks
//!
//! Validation never touches the dungeon. Findings are advisory: callers
//! decide whether errors are worth a regeneration with another seed.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::data::DungeonData;
use super::grid::GridPosition;
use super::room::{RoomId, RoomType};

const MIN_START_AREA: usize = 64;
const MIN_START_CONNECTIONS: usize = 2;
const MAX_START_CONNECTIONS: usize = 4;
const START_OFFSET_RATIO: f32 = 0.8;
const MIN_DISTINCT_TYPES: usize = 3;
const MAX_SMALL_RATIO: f32 = 0.7;
const MAX_LARGE_RATIO: f32 = 0.4;
const MIN_BOSS_AREA: usize = 200;
const MIN_TREASURE_AREA: usize = 100;
const MAX_ROOM_AREA: usize = 600;
const MIN_BOSS_DISTANCE: i32 = 3;
const MIN_TREASURE_DISTANCE: i32 = 2;
const DEEP_TREASURE_DISTANCE: i32 = 4;
const ROOM_TYPE_COUNT: f32 = 8.0;

/// Ideal small / medium / large split
const IDEAL_SIZE_MIX: [f32; 3] = [0.3, 0.5, 0.2];
const SIZE_MIX_WEIGHT: f32 = 0.3;
const CENTROID_WEIGHT: f32 = 0.4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// 0..=1
    pub completability_score: f32,
    /// 0..=1
    pub balance_score: f32,
}

impl ValidationResult {
    /// Human readable report for tooling output
    pub fn report(&self) -> String {
        let mut out = String::new();
        let verdict = if self.is_valid { "valid" } else { "INVALID" };
        let _ = writeln!(out, "Validation: {verdict}");
        let _ = writeln!(out, "Completability: {:.2}", self.completability_score);
        let _ = writeln!(out, "Balance: {:.2}", self.balance_score);
        for error in &self.errors {
            let _ = writeln!(out, "  error: {error}");
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "  warning: {warning}");
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonValidator;

impl DungeonValidator {
    pub fn validate(&self, data: &DungeonData) -> ValidationResult {
        let mut check = Checks::default();
        let graph = data.graph();
        let reach = graph.distances_from(RoomId(0));
        let origin = data.starting_room.unwrap_or(RoomId(0));
        let depth = graph.distances_from(origin);

        check.connectivity(data, &reach);
        check.starting_room(data);
        check.distribution(data);
        check.sizes(data);
        check.doors(data);
        check.progression(data, &depth);

        ValidationResult {
            is_valid: check.errors.is_empty(),
            completability_score: completability(data, &reach, &depth),
            balance_score: balance(data),
            warnings: check.warnings,
            errors: check.errors,
        }
    }
}

#[derive(Default)]
struct Checks {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Checks {
    fn connectivity(&mut self, data: &DungeonData, reach: &[i32]) {
        let unreachable = reach.iter().filter(|&&d| d < 0).count();
        if unreachable == 0 {
            return;
        }
        self.errors.push(format!(
            "{unreachable} of {} rooms unreachable from room 0",
            data.rooms.len()
        ));
        for (room_type, ids) in data.rooms_by_type() {
            let missing = ids.iter().filter(|&&id| distance_of(reach, id) < 0).count();
            if missing > 0 {
                self.warnings
                    .push(format!("{missing} of {} {room_type} rooms unreachable", ids.len()));
            }
        }
    }

    fn starting_room(&mut self, data: &DungeonData) {
        let Some(room) = data.starting_room.and_then(|id| data.room(id)) else {
            self.errors.push("no starting room assigned".to_string());
            return;
        };
        if room.area() < MIN_START_AREA {
            self.warnings
                .push(format!("starting room is small ({} tiles)", room.area()));
        }
        let connections = data.connection_count(room.id);
        if connections < MIN_START_CONNECTIONS {
            self.warnings
                .push(format!("starting room has few connections ({connections})"));
        } else if connections > MAX_START_CONNECTIONS {
            self.warnings
                .push(format!("starting room has many connections ({connections})"));
        }
        let center = map_center(data);
        let max_offset = center.0.hypot(center.1);
        let offset = offset_from(room.center(), center);
        if max_offset > 0.0 && offset > START_OFFSET_RATIO * max_offset {
            self.warnings
                .push(format!("starting room is far from the map center ({offset:.1})"));
        }
    }

    fn distribution(&mut self, data: &DungeonData) {
        let total = data.rooms.len();
        if total == 0 {
            self.warnings.push("dungeon has no rooms".to_string());
            return;
        }
        let ratio = |room_type| data.rooms_of_type(room_type).len() as f32 / total as f32;

        let distinct = data.rooms_by_type().len();
        if distinct < MIN_DISTINCT_TYPES {
            self.warnings
                .push(format!("low room variety ({distinct} types)"));
        }
        let small = ratio(RoomType::SmallRoom);
        if small > MAX_SMALL_RATIO {
            self.warnings
                .push(format!("too many small rooms ({:.0}%)", small * 100.0));
        }
        let large = ratio(RoomType::LargeRoom);
        if large > MAX_LARGE_RATIO {
            self.warnings
                .push(format!("too many large rooms ({:.0}%)", large * 100.0));
        }
        if data.rooms_of_type(RoomType::TreasureRoom).is_empty() {
            self.warnings.push("no treasure rooms".to_string());
        }
        let bosses = data.rooms_of_type(RoomType::BossRoom).len();
        if bosses > 1 {
            self.warnings.push(format!("{bosses} boss rooms"));
        }
    }

    fn sizes(&mut self, data: &DungeonData) {
        for room in &data.rooms {
            let area = room.area();
            let minimum = match room.room_type {
                RoomType::BossRoom => MIN_BOSS_AREA,
                RoomType::TreasureRoom => MIN_TREASURE_AREA,
                RoomType::StartingRoom => MIN_START_AREA,
                _ => 0,
            };
            if area < minimum {
                self.warnings.push(format!(
                    "{} room #{} is undersized ({area} < {minimum})",
                    room.room_type,
                    room.id.index()
                ));
            }
            if area > MAX_ROOM_AREA {
                self.warnings
                    .push(format!("room #{} is oversized ({area})", room.id.index()));
            }
        }
    }

    fn doors(&mut self, data: &DungeonData) {
        for (index, door) in data.doors.iter().enumerate() {
            let ends = [door.room_a, door.room_b];
            let missing_ref = door.room_a.is_none() || (!door.is_entrance && door.room_b.is_none());
            if missing_ref {
                self.errors
                    .push(format!("door {index} has a missing room reference"));
                continue;
            }
            let rooms: Vec<_> = ends.iter().flatten().map(|&id| data.room(id)).collect();
            if rooms.iter().any(Option::is_none) {
                self.errors
                    .push(format!("door {index} references a room that does not exist"));
                continue;
            }
            let on_wall = rooms.iter().flatten().any(|room| room.on_boundary(door.position));
            if !on_wall {
                self.warnings.push(format!(
                    "door {index} at ({}, {}) is not on a room boundary",
                    door.position.x, door.position.y
                ));
            }
        }
        for room in &data.rooms {
            if !data.doors.iter().any(|door| door.touches(room.id)) {
                self.errors
                    .push(format!("room #{} has no doors", room.id.index()));
            }
        }
    }

    fn progression(&mut self, data: &DungeonData, depth: &[i32]) {
        for &id in data.rooms_of_type(RoomType::BossRoom) {
            let d = distance_of(depth, id);
            if (0..MIN_BOSS_DISTANCE).contains(&d) {
                self.warnings
                    .push(format!("boss room #{} is only {d} rooms from the start", id.index()));
            }
        }
        let deep_treasure = data
            .rooms_of_type(RoomType::TreasureRoom)
            .iter()
            .any(|&id| distance_of(depth, id) >= DEEP_TREASURE_DISTANCE);
        if !deep_treasure {
            self.warnings
                .push(format!("no treasure room at depth {DEEP_TREASURE_DISTANCE} or more"));
        }
    }
}

/// BFS distance for `id`, or -1 when the id is outside the table
fn distance_of(distances: &[i32], id: RoomId) -> i32 {
    distances.get(id.index()).copied().unwrap_or(-1)
}

/// Half-extents of the map, which double as its center point
fn map_center(data: &DungeonData) -> (f32, f32) {
    (data.width() as f32 / 2.0, data.height() as f32 / 2.0)
}

fn offset_from(pos: GridPosition, center: (f32, f32)) -> f32 {
    (pos.x as f32 - center.0).hypot(pos.y as f32 - center.1)
}

fn completability(data: &DungeonData, reach: &[i32], depth: &[i32]) -> f32 {
    let total = data.rooms.len();
    if total == 0 {
        return 0.0;
    }
    let reachable = reach.iter().filter(|&&d| d >= 0).count();
    let mut score = 0.4 * reachable as f32 / total as f32;

    if let [boss] = data.rooms_of_type(RoomType::BossRoom)
        && distance_of(depth, *boss) >= MIN_BOSS_DISTANCE
    {
        score += 0.2;
    }
    let treasures_deep = data
        .rooms_of_type(RoomType::TreasureRoom)
        .iter()
        .all(|&id| distance_of(depth, id) >= MIN_TREASURE_DISTANCE);
    if treasures_deep {
        score += 0.2;
    }
    let variety = data.rooms_by_type().len() as f32 / ROOM_TYPE_COUNT;
    score += 0.2 * variety.min(1.0);
    score.clamp(0.0, 1.0)
}

/// Size-mix and centroid terms, renormalised over their combined weight
fn balance(data: &DungeonData) -> f32 {
    let total = data.rooms.len();
    if total == 0 {
        return 0.0;
    }

    let mut counts = [0usize; 3];
    for room in &data.rooms {
        let class = match RoomType::from_area(room.area()) {
            RoomType::SmallRoom => 0,
            RoomType::MediumRoom => 1,
            _ => 2,
        };
        counts[class] += 1;
    }
    let deviation: f32 = counts
        .iter()
        .zip(IDEAL_SIZE_MIX)
        .map(|(&count, ideal)| (count as f32 / total as f32 - ideal).abs())
        .sum();
    let size_score = 1.0 - deviation / 2.0;

    let (sx, sy) = data.rooms.iter().fold((0.0, 0.0), |(sx, sy), room| {
        let c = room.center();
        (sx + c.x as f32, sy + c.y as f32)
    });
    let centroid = GridPosition::new(
        (sx / total as f32).round() as i32,
        (sy / total as f32).round() as i32,
    );
    let center = map_center(data);
    let max_offset = center.0.hypot(center.1);
    let centroid_score = if max_offset > 0.0 {
        1.0 - (offset_from(centroid, center) / max_offset).min(1.0)
    } else {
        1.0
    };

    let score = (SIZE_MIX_WEIGHT * size_score + CENTROID_WEIGHT * centroid_score)
        / (SIZE_MIX_WEIGHT + CENTROID_WEIGHT);
    score.clamp(0.0, 1.0)
}
