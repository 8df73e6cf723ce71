use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use log::{debug, info, warn};

use super::{Level, LevelObject, ObjectKind, Room, Tile, corridor_path};
use crate::{config::LevelConfig, error::LevelError, rng::RandomSequence};

/// Outcome of trying to find a spot for one object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Placement {
    Placed(Point),
    Exhausted,
}

pub struct LevelGenerator {
    config: LevelConfig,
    rng: RandomSequence,
}

impl LevelGenerator {
    pub fn new(config: LevelConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => RandomSequence::new(seed),
            None => RandomSequence::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Builds a level. A level with no rooms signals that placement failed;
    /// [`LevelGenerator::try_generate_level`] reports that as an error instead.
    pub fn generate_level(&mut self) -> Level {
        let mut level = Level::empty(self.config.width, self.config.height);
        level.level_type = self.config.level_type;
        level.difficulty = self.config.difficulty;
        level.seed = self.rng.seed();

        let requested = self
            .rng
            .next_in_range(self.config.min_rooms, self.config.max_rooms)
            .max(0) as usize;
        level.rooms_requested = requested;

        for slot in 0..requested {
            match self.place_room(&level.rooms) {
                Some(room) => {
                    debug!("slot {slot}: room {room:?}");
                    level.rooms.push(room);
                }
                None => debug!(
                    "slot {slot}: no free spot after {} attempts",
                    self.config.room_attempts
                ),
            }
        }

        if level.rooms.is_empty() {
            warn!("seed {}: no room could be placed", level.seed);
            return level;
        }

        for room in level.rooms.clone() {
            stamp_room(&mut level, &room);
        }
        for pair in level.rooms.clone().windows(2) {
            carve_corridor(&mut level, pair[0].center(), pair[1].center());
        }

        level.start = level.rooms[0].center();
        self.place_objects(&mut level);

        if level.is_under_generated() {
            warn!(
                "seed {}: placed {} of {} rooms",
                level.seed,
                level.rooms.len(),
                level.rooms_requested
            );
        }
        if level.dropped_objects > 0 {
            warn!(
                "seed {}: dropped {} objects with no free floor",
                level.seed, level.dropped_objects
            );
        }
        info!(
            "generated {} level: {} rooms, {} objects (seed {})",
            level.level_type.as_str(),
            level.rooms.len(),
            level.objects.len(),
            level.seed
        );
        level
    }

    /// Like [`LevelGenerator::generate_level`], but refuses configurations
    /// that fail [`LevelConfig::validate`] and levels with no rooms.
    pub fn try_generate_level(&mut self) -> Result<Level, LevelError> {
        self.config
            .validate()
            .map_err(|err| LevelError::InvalidConfig(err.to_string()))?;
        let level = self.generate_level();
        if level.is_degenerate() {
            return Err(LevelError::NoRooms { seed: level.seed });
        }
        Ok(level)
    }

    fn place_room(&mut self, accepted: &[Room]) -> Option<Room> {
        let LevelConfig {
            width,
            height,
            min_room_size,
            max_room_size,
            room_attempts,
            ..
        } = self.config;

        for _ in 0..room_attempts {
            let room_w = self.rng.next_in_range(min_room_size, max_room_size);
            let room_h = self.rng.next_in_range(min_room_size, max_room_size);
            let x = self.rng.next_in_range(1, width - room_w - 1);
            let y = self.rng.next_in_range(1, height - room_h - 1);
            let candidate = Room::new(x, y, room_w, room_h);

            if candidate.x + candidate.width >= width || candidate.y + candidate.height >= height {
                continue;
            }
            if accepted.iter().any(|room| candidate.crowds(room)) {
                continue;
            }
            return Some(candidate);
        }
        None
    }

    fn place_objects(&mut self, level: &mut Level) {
        let mut occupied: HashSet<Point> = HashSet::new();
        occupied.insert(level.start);

        for kind in ObjectKind::ALL {
            let count = kind.count_for(level.difficulty);
            for _ in 0..count {
                if level.rooms.len() < 2 {
                    level.dropped_objects += 1;
                    continue;
                }
                let room_idx = self.rng.next_in_range(1, level.rooms.len() as i32 - 1) as usize;
                let room = level.rooms[room_idx];
                match self.find_free_floor(level, &room, &occupied) {
                    Placement::Placed(position) => {
                        occupied.insert(position);
                        level.objects.push(LevelObject {
                            kind,
                            room: room_idx,
                            position,
                        });
                    }
                    Placement::Exhausted => level.dropped_objects += 1,
                }
            }
        }
    }

    fn find_free_floor(
        &mut self,
        level: &Level,
        room: &Room,
        occupied: &HashSet<Point>,
    ) -> Placement {
        let interior = room.interior();
        for _ in 0..self.config.object_attempts {
            let x = self.rng.next_in_range(interior.x1, interior.x2 - 1);
            let y = self.rng.next_in_range(interior.y1, interior.y2 - 1);
            let point = Point::new(x, y);
            if level.tile(point) == Some(Tile::Floor) && !occupied.contains(&point) {
                return Placement::Placed(point);
            }
        }
        Placement::Exhausted
    }
}

fn stamp_room(level: &mut Level, room: &Room) {
    for y in room.y..room.y + room.height {
        for x in room.x..room.x + room.width {
            let point = Point::new(x, y);
            let tile = if room.contains_interior(point) {
                Tile::Floor
            } else {
                Tile::Wall
            };
            level.set_tile(point, tile);
        }
    }
}

fn carve_corridor(level: &mut Level, from: Point, to: Point) {
    for point in corridor_path(from, to) {
        match level.tile(point) {
            Some(Tile::Wall) => level.set_tile(point, Tile::Door),
            Some(Tile::Empty) => level.set_tile(point, Tile::Floor),
            _ => {}
        }
    }
}
