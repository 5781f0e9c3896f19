use std::collections::{HashSet, VecDeque};

use delve_core::dungeon::{
    CorridorConnector, DoorOrientation, DungeonData, DungeonDoor, DungeonGenerator,
    DungeonValidator, GridPosition, Rect, RoomId, StartingPointSelector, TileType,
};
use delve_core::{GameRng, GenerationSettings, StartingPointCriteria};

#[test]
fn test_default_fifty_by_fifty_is_playable() {
    let mut settings = GenerationSettings::new(50, 50, 42);
    settings.min_room_size = 6;
    let result = DungeonGenerator::new(settings).unwrap().generate().unwrap();
    let data = &result.data;

    assert!(data.rooms.len() >= 4, "only {} rooms", data.rooms.len());
    assert!(data.starting_room.is_some());

    let validation = DungeonValidator.validate(data);
    assert!(validation.errors.is_empty(), "{:?}", validation.errors);
    assert!(validation.is_valid);
    assert!(
        validation.completability_score > 0.5,
        "completability {}",
        validation.completability_score
    );
}

/// Two pairs of rooms, each pair joined only to itself
fn split_groups() -> (DungeonData, CorridorConnector, GameRng) {
    let mut data = DungeonData::new(60, 40);
    let left_top = data.add_room(Rect::new(2, 2, 8, 8)).unwrap();
    let left_bottom = data.add_room(Rect::new(2, 24, 8, 8)).unwrap();
    let right_top = data.add_room(Rect::new(44, 2, 8, 8)).unwrap();
    let right_bottom = data.add_room(Rect::new(44, 24, 8, 8)).unwrap();

    let connector = CorridorConnector::default();
    let mut rng = GameRng::new(11);
    connector.connect_rooms(&mut data, left_top, left_bottom, &mut rng);
    connector.connect_rooms(&mut data, right_top, right_bottom, &mut rng);
    assert_eq!(data.graph().components().len(), 2);
    (data, connector, rng)
}

#[test]
fn test_repair_merges_disconnected_groups() {
    let (mut data, connector, mut rng) = split_groups();
    let report = connector.repair_connectivity(&mut data, &mut rng);

    assert_eq!(report.components_before_repair, 2);
    assert_eq!(report.residual_components, 1);
    assert!(report.is_connected());
    assert!(data.is_fully_connected());
    assert_eq!(data.graph().reachable_count(RoomId(0)), 4);
}

#[test]
fn test_repair_with_no_attempts_reports_residual_components() {
    let (mut data, mut connector, mut rng) = split_groups();
    connector.max_repair_attempts = 0;
    let report = connector.repair_connectivity(&mut data, &mut rng);

    assert_eq!(report.repair_attempts, 0);
    assert_eq!(report.residual_components, 2);
    assert!(!report.is_connected());
    assert!(!data.is_fully_connected());
}

#[test]
fn test_repair_abandons_distant_pairs() {
    let (mut data, mut connector, mut rng) = split_groups();
    connector.max_repair_distance = 5.0;
    let report = connector.repair_connectivity(&mut data, &mut rng);

    assert!(!report.is_connected());
    assert!(!report.abandoned_pairs.is_empty());
    assert!(report.repair_attempts <= connector.max_repair_attempts);
}

/// A 5x5 hub with three 8x8 rooms hanging off it
fn hub_and_spokes() -> DungeonData {
    let mut data = DungeonData::new(50, 50);
    let hub = data.add_room(Rect::new(20, 20, 5, 5)).unwrap();
    let west = data.add_room(Rect::new(5, 19, 8, 8)).unwrap();
    let east = data.add_room(Rect::new(35, 19, 8, 8)).unwrap();
    let north = data.add_room(Rect::new(19, 5, 8, 8)).unwrap();
    for (pos, orientation, spoke) in [
        (GridPosition::new(20, 22), DoorOrientation::Vertical, west),
        (GridPosition::new(24, 22), DoorOrientation::Vertical, east),
        (GridPosition::new(22, 20), DoorOrientation::Horizontal, north),
    ] {
        data.add_door(DungeonDoor::between(pos, orientation, hub, spoke));
    }
    data
}

#[test]
fn test_small_hub_is_never_the_start() {
    let mut data = hub_and_spokes();
    assert_eq!(data.connection_count(RoomId(0)), 3);

    let selection = StartingPointSelector::default().select(&mut data);
    let start = selection.room.unwrap();
    assert_ne!(start, RoomId(0));
    assert_eq!(data.starting_room, Some(start));
    assert!(!selection.fallback);
    assert!(selection.scores[0].rejection.is_some());
}

#[test]
fn test_small_hub_is_not_the_fallback_start() {
    let mut data = hub_and_spokes();
    let criteria = StartingPointCriteria {
        min_connections: 2,
        create_exterior_entrance: false,
        ..StartingPointCriteria::default()
    };
    let selection = StartingPointSelector::new(criteria).select(&mut data);

    assert!(selection.scores.iter().all(|s| s.score <= 0.0));
    assert!(selection.fallback);
    let start = selection.room.unwrap();
    assert_ne!(start, RoomId(0));
    assert!(data.room(start).unwrap().area() >= 36);
}

#[test]
fn test_entrance_opens_onto_carved_floor() {
    let result = DungeonGenerator::new(GenerationSettings::new(60, 60, 8))
        .unwrap()
        .generate()
        .unwrap();
    let data = &result.data;
    let Some(index) = result.start.entrance else {
        return;
    };
    let door = &data.doors[index];
    assert!(door.is_entrance);
    assert_eq!(door.room_b, None);
    assert_eq!(data.grid.get(door.position), Some(TileType::Door));
}

/// Passable tiles reachable from `start` by 4-way steps
fn flood_fill(data: &DungeonData, start: GridPosition) -> HashSet<GridPosition> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let next = pos.offset(dx, dy);
            if data.grid.get(next).is_some_and(|t| t.is_passable()) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

#[test]
fn test_short_corridor_cap_keeps_graph_honest() {
    for seed in 0..6 {
        let mut settings = GenerationSettings::new(240, 60, seed);
        settings.max_corridor_length = 15;
        let result = DungeonGenerator::new(settings).unwrap().generate().unwrap();
        let data = &result.data;
        let Some(start) = data.starting_room else {
            continue;
        };
        let walked = flood_fill(data, data.room(start).unwrap().center());
        let depths = data.graph().distances_from(start);
        for room in &data.rooms {
            if depths[room.id.index()] >= 0 {
                assert!(
                    walked.contains(&room.center()),
                    "seed {seed}: room #{} joined by doors but not walkable",
                    room.id.index()
                );
            }
        }
    }
}
