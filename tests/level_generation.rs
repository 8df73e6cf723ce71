//! Level generator properties over many seeds and shapes.

use bracket_geometry::prelude::Point;
use netrunner::{
    LevelError,
    config::{Difficulty, LevelConfig},
    map::{Level, LevelGenerator, ObjectKind, Room, Tile, corridor_path},
};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn generate(config: LevelConfig) -> Level {
    LevelGenerator::new(config).generate_level()
}

/// At least one empty column or row between the two footprints.
fn separated(a: &Room, b: &Room) -> bool {
    a.x + a.width < b.x || b.x + b.width < a.x || a.y + a.height < b.y || b.y + b.height < a.y
}

fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Normal),
        Just(Difficulty::Hard),
    ]
}

prop_compose! {
    fn level_config()(
        seed in 1u64..1_000_000,
        width in 24i32..64,
        height in 24i32..64,
        min_room_size in 3i32..6,
        extra_size in 0i32..4,
        min_rooms in 1i32..6,
        extra_rooms in 0i32..6,
        difficulty in difficulty(),
    ) -> LevelConfig {
        LevelConfig {
            width,
            height,
            min_rooms,
            max_rooms: min_rooms + extra_rooms,
            min_room_size,
            max_room_size: min_room_size + extra_size,
            difficulty,
            seed: Some(seed),
            ..LevelConfig::default()
        }
    }
}

// ── Example scenarios ──────────────────────────────────────────────────

#[test]
fn fixed_seed_chain_of_five_rooms() {
    let level = generate(LevelConfig {
        min_rooms: 5,
        max_rooms: 5,
        min_room_size: 4,
        max_room_size: 4,
        seed: Some(42),
        ..LevelConfig::default()
    });
    assert_eq!(level.rooms.len(), 5);
    assert!(!level.is_under_generated());
    for (i, a) in level.rooms.iter().enumerate() {
        for b in &level.rooms[i + 1..] {
            assert!(separated(a, b), "{a:?} touches {b:?}");
        }
    }
    for pair in level.rooms.windows(2) {
        assert!(
            level
                .path_between(pair[0].center(), pair[1].center())
                .is_some()
        );
    }
}

#[test]
fn default_config_is_valid_and_fills_its_rooms() {
    let config = LevelConfig {
        seed: Some(7),
        ..LevelConfig::default()
    };
    assert!(config.validate().is_ok());
    let level = generate(config);
    assert!(level.rooms.len() >= 5);
    assert_eq!(level.rooms.len(), level.rooms_requested);
    assert_eq!(level.width * level.height, level.tiles.len() as i32);
}

#[test]
fn cramped_map_reports_under_generation() {
    // Only four 4x4 rooms fit in 12x12 with a gap between them.
    let level = generate(LevelConfig {
        width: 12,
        height: 12,
        min_rooms: 5,
        max_rooms: 5,
        min_room_size: 4,
        max_room_size: 4,
        seed: Some(99),
        ..LevelConfig::default()
    });
    assert_eq!(level.rooms_requested, 5);
    assert!(level.rooms.len() < 5);
    assert!(level.is_under_generated());
    assert!(!level.is_degenerate());
}

#[test]
fn difficulty_sets_object_budget() {
    for (difficulty, expected) in [
        (Difficulty::Easy, 11),
        (Difficulty::Normal, 10),
        (Difficulty::Hard, 11),
    ] {
        let level = generate(LevelConfig {
            difficulty,
            seed: Some(5),
            ..LevelConfig::default()
        });
        let budget: usize = ObjectKind::ALL
            .iter()
            .map(|kind| kind.count_for(difficulty))
            .sum();
        assert_eq!(budget, expected);
        assert_eq!(level.objects.len() + level.dropped_objects, budget);
    }
}

#[test]
fn rooms_without_interior_are_refused() {
    // Two-tile rooms are all wall, so the start would land on a wall corner.
    let mut generator = LevelGenerator::new(LevelConfig {
        min_room_size: 2,
        max_room_size: 2,
        seed: Some(42),
        ..LevelConfig::default()
    });
    assert!(matches!(
        generator.try_generate_level(),
        Err(LevelError::InvalidConfig(reason)) if reason.contains("min_room_size")
    ));
}

#[test]
fn checked_generation_accepts_the_defaults() {
    let level = LevelGenerator::new(LevelConfig {
        seed: Some(42),
        ..LevelConfig::default()
    })
    .try_generate_level();
    assert!(level.is_ok_and(|level| level.tile(level.start) == Some(Tile::Floor)));
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rooms_keep_their_distance(config in level_config()) {
        let level = generate(config);
        for (i, a) in level.rooms.iter().enumerate() {
            for b in &level.rooms[i + 1..] {
                prop_assert!(separated(a, b));
                prop_assert!(!a.crowds(b));
            }
        }
    }

    #[test]
    fn room_interiors_are_floor_and_borders_are_walls_or_doors(config in level_config()) {
        let level = generate(config);
        for room in &level.rooms {
            for y in room.y..room.y + room.height {
                for x in room.x..room.x + room.width {
                    let point = Point::new(x, y);
                    let tile = level.tile(point);
                    if room.contains_interior(point) {
                        prop_assert_eq!(tile, Some(Tile::Floor));
                    } else {
                        prop_assert!(matches!(tile, Some(Tile::Wall | Tile::Door)));
                    }
                }
            }
        }
    }

    #[test]
    fn corridors_link_consecutive_rooms(config in level_config()) {
        let level = generate(config);
        for pair in level.rooms.windows(2) {
            for point in corridor_path(pair[0].center(), pair[1].center()) {
                prop_assert!(matches!(
                    level.tile(point),
                    Some(Tile::Floor | Tile::Door)
                ));
            }
        }
    }

    #[test]
    fn start_is_floor_inside_first_room(config in level_config()) {
        let level = generate(config);
        prop_assume!(!level.is_degenerate());
        prop_assert_eq!(level.tile(level.start), Some(Tile::Floor));
        prop_assert!(level.rooms[0].contains_interior(level.start));
        prop_assert_eq!(level.room_of(level.start), Some(0));
    }

    #[test]
    fn objects_sit_on_free_floor_outside_first_room(config in level_config()) {
        let level = generate(config);
        let mut seen = Vec::new();
        for object in &level.objects {
            prop_assert!(object.room > 0);
            prop_assert!(level.rooms[object.room].contains_interior(object.position));
            prop_assert_eq!(level.tile(object.position), Some(Tile::Floor));
            prop_assert_ne!(object.position, level.start);
            prop_assert!(!seen.contains(&object.position));
            seen.push(object.position);
        }
        let budget: usize = ObjectKind::ALL
            .iter()
            .map(|kind| kind.count_for(level.difficulty))
            .sum();
        prop_assert_eq!(level.objects.len() + level.dropped_objects, budget);
    }

    #[test]
    fn same_seed_same_level(config in level_config()) {
        let a = generate(config.clone());
        let b = generate(config);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_room_is_reachable_from_start(seed in 1u64..100_000) {
        let level = generate(LevelConfig { seed: Some(seed), ..LevelConfig::default() });
        for room in &level.rooms {
            prop_assert!(level.path_between(level.start, room.center()).is_some());
        }
    }
}
