use proptest::prelude::*;

use delve_core::dungeon::{
    DungeonData, DungeonGenerator, DungeonValidator, GeneratedDungeon, GridPosition, Rect,
    TileType,
};
use delve_core::GenerationSettings;

fn generate(width: usize, height: usize, seed: u64) -> GeneratedDungeon {
    DungeonGenerator::new(GenerationSettings::new(width, height, seed))
        .unwrap()
        .generate()
        .unwrap()
}

fn grid_rect(data: &DungeonData) -> Rect {
    Rect::new(0, 0, data.width() as i32, data.height() as i32)
}

fn assert_door_integrity(data: &DungeonData) {
    for door in &data.doors {
        assert_eq!(data.grid.get(door.position), Some(TileType::Door));
        let room_a = door.room_a.and_then(|id| data.room(id)).unwrap();
        if door.is_entrance {
            assert_eq!(door.room_b, None);
            let bounds = room_a.bounds();
            let opens_outward = [(0, -1), (0, 1), (-1, 0), (1, 0)]
                .into_iter()
                .map(|(dx, dy)| door.position.offset(dx, dy))
                .filter(|pos| !bounds.contains(*pos))
                .any(|pos| data.grid.get(pos).is_some_and(|t| t != TileType::Wall));
            assert!(opens_outward, "entrance at {:?} opens onto wall", door.position);
        } else {
            let room_b = door.room_b.and_then(|id| data.room(id)).unwrap();
            assert_ne!(room_a.id, room_b.id);
            assert!(room_a.on_boundary(door.position) || room_b.on_boundary(door.position));
        }
    }
}

#[test]
fn test_seed_sweep_keeps_structure() {
    for seed in 0..20 {
        let result = generate(60, 50, seed);
        let data = &result.data;
        assert_door_integrity(data);

        let starts: Vec<_> = data.rooms.iter().filter(|r| r.is_starting_room).collect();
        assert_eq!(starts.len(), 1, "seed {seed}");
        assert_eq!(data.starting_room, Some(starts[0].id));

        if result.connection.is_connected() {
            let graph = data.graph();
            for room in &data.rooms {
                assert_eq!(graph.reachable_count(room.id), data.rooms.len(), "seed {seed}");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_generation_is_deterministic(
        seed in any::<u64>(),
        width in 40usize..=90,
        height in 40usize..=90,
    ) {
        let first = generate(width, height, seed);
        let second = generate(width, height, seed);
        prop_assert_eq!(&first.data.grid, &second.data.grid);
        prop_assert_eq!(&first.data.rooms, &second.data.rooms);
        prop_assert_eq!(&first.data.doors, &second.data.doors);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_rooms_and_leaves_stay_in_bounds(
        seed in any::<u64>(),
        width in 40usize..=120,
        height in 40usize..=120,
    ) {
        let result = generate(width, height, seed);
        let bounds = grid_rect(&result.data);
        for leaf in result.tree.leaves() {
            prop_assert!(bounds.contains_rect(&leaf.bounds));
        }
        for room in &result.data.rooms {
            prop_assert!(bounds.contains_rect(&room.bounds()));
            prop_assert_eq!(room.floor_tiles.len(), room.area());
        }
        for &tile in &result.data.corridor_tiles {
            prop_assert!(result.data.grid.in_bounds(tile));
        }
    }

    #[test]
    fn prop_doors_reference_real_rooms(seed in any::<u64>(), size in 40usize..=80) {
        let result = generate(size, size, seed);
        assert_door_integrity(&result.data);
        for room in &result.data.rooms {
            prop_assert!(room.door_count() <= result.data.doors.len());
        }
    }

    #[test]
    fn prop_validation_is_idempotent(seed in any::<u64>(), size in 40usize..=80) {
        let result = generate(size, size, seed);
        let first = DungeonValidator.validate(&result.data);
        let second = DungeonValidator.validate(&result.data);
        prop_assert!((0.0..=1.0).contains(&first.completability_score));
        prop_assert!((0.0..=1.0).contains(&first.balance_score));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_render_matches_grid(seed in any::<u64>(), size in 40usize..=60) {
        let data = generate(size, size, seed).data;
        let map = data.render_ascii();
        let lines: Vec<&str> = map.lines().collect();
        prop_assert_eq!(lines.len(), data.height());
        prop_assert!(lines.iter().all(|l| l.chars().count() == data.width()));
        let start_marks = map.chars().filter(|&c| c == '@').count();
        prop_assert_eq!(start_marks, usize::from(data.starting_room.is_some()));
        let center = data.starting_room.and_then(|id| data.room(id)).map(|r| r.center());
        prop_assert!(center.is_none_or(|c: GridPosition| data.grid.get(c) == Some(TileType::Floor)));
    }
}
