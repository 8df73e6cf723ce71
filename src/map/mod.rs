pub mod generator;

use std::collections::HashMap;

use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg, a_star_search};
use smallvec::SmallVec;

use crate::config::{Difficulty, LevelType};

pub use generator::LevelGenerator;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    Floor,
    Door,
}

impl Tile {
    pub fn glyph(&self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Door => '+',
        }
    }

    pub fn is_walkable(&self) -> bool {
        matches!(self, Tile::Floor | Tile::Door)
    }
}

/// Rectangle of tiles whose outermost ring is wall and whose inside is floor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn interior(&self) -> Rect {
        Rect::with_size(self.x + 1, self.y + 1, self.width - 2, self.height - 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn contains_interior(&self, point: Point) -> bool {
        point.x > self.x
            && point.x < self.x + self.width - 1
            && point.y > self.y
            && point.y < self.y + self.height - 1
    }

    /// True when `other` comes within one tile of this room, i.e. the two
    /// walls would touch with no empty tile between them.
    pub fn crowds(&self, other: &Room) -> bool {
        self.x < other.x + other.width + 1
            && self.x + self.width + 1 > other.x
            && self.y < other.y + other.height + 1
            && self.y + self.height + 1 > other.y
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectCategory {
    Hazard,
    Collectible,
    Interactable,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Firewall,
    DataPacket,
    Terminal,
}

impl ObjectKind {
    /// Placement order used by the generator.
    pub const ALL: [ObjectKind; 3] = [
        ObjectKind::Firewall,
        ObjectKind::DataPacket,
        ObjectKind::Terminal,
    ];

    pub fn category(&self) -> ObjectCategory {
        match self {
            ObjectKind::Firewall => ObjectCategory::Hazard,
            ObjectKind::DataPacket => ObjectCategory::Collectible,
            ObjectKind::Terminal => ObjectCategory::Interactable,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            ObjectKind::Firewall => 'F',
            ObjectKind::DataPacket => 'D',
            ObjectKind::Terminal => 'T',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Firewall => "firewall",
            ObjectKind::DataPacket => "data packet",
            ObjectKind::Terminal => "terminal",
        }
    }

    pub fn count_for(&self, difficulty: Difficulty) -> usize {
        match (self, difficulty) {
            (ObjectKind::Firewall, Difficulty::Easy) => 3,
            (ObjectKind::Firewall, Difficulty::Normal) => 5,
            (ObjectKind::Firewall, Difficulty::Hard) => 8,
            (ObjectKind::DataPacket, Difficulty::Easy) => 5,
            (ObjectKind::DataPacket, Difficulty::Normal) => 3,
            (ObjectKind::DataPacket, Difficulty::Hard) => 2,
            (ObjectKind::Terminal, Difficulty::Easy) => 3,
            (ObjectKind::Terminal, Difficulty::Normal) => 2,
            (ObjectKind::Terminal, Difficulty::Hard) => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelObject {
    pub kind: ObjectKind,
    /// Index into [`Level::rooms`]; never 0.
    pub room: usize,
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub rooms: Vec<Room>,
    pub start: Point,
    pub objects: Vec<LevelObject>,
    pub level_type: LevelType,
    pub difficulty: Difficulty,
    pub seed: u64,
    /// Room count drawn before placement; may exceed `rooms.len()`.
    pub rooms_requested: usize,
    /// Objects given up after exhausting their placement attempts.
    pub dropped_objects: usize,
}

impl Level {
    pub fn empty(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; size],
            rooms: Vec::new(),
            start: Point::new(0, 0),
            objects: Vec::new(),
            level_type: LevelType::default(),
            difficulty: Difficulty::default(),
            seed: 0,
            rooms_requested: 0,
            dropped_objects: 0,
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile(&self, point: Point) -> Option<Tile> {
        self.idx(point).map(|idx| self.tiles[idx])
    }

    pub fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile(point).is_some_and(|tile| tile.is_walkable())
    }

    /// A level without rooms is the generator's failure signal.
    pub fn is_degenerate(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn is_under_generated(&self) -> bool {
        self.rooms.len() < self.rooms_requested
    }

    pub fn room_of(&self, point: Point) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(point))
    }

    pub fn object_at(&self, point: Point) -> Option<&LevelObject> {
        self.objects.iter().find(|object| object.position == point)
    }

    pub fn remove_object(&mut self, point: Point) -> Option<LevelObject> {
        let idx = self
            .objects
            .iter()
            .position(|object| object.position == point)?;
        Some(self.objects.remove(idx))
    }

    pub fn count_objects(&self, kind: ObjectKind) -> usize {
        self.objects
            .iter()
            .filter(|object| object.kind == kind)
            .count()
    }

    /// Row-major rows of tiles, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1) as usize)
    }

    /// Plain-text map with objects and the start marker stamped in.
    pub fn to_ascii(&self) -> String {
        let overlay: HashMap<Point, char> = self
            .objects
            .iter()
            .map(|object| (object.position, object.kind.glyph()))
            .collect();
        let has_start = !self.rooms.is_empty();
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            for (x, tile) in row.iter().enumerate() {
                let point = Point::new(x as i32, y as i32);
                let glyph = if has_start && point == self.start {
                    '@'
                } else {
                    overlay.get(&point).copied().unwrap_or_else(|| tile.glyph())
                };
                out.push(glyph);
            }
        }
        out
    }

    /// Walkable route between two tiles, endpoints included.
    pub fn path_between(&self, from: Point, to: Point) -> Option<Vec<Point>> {
        if !self.is_walkable(from) || !self.is_walkable(to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }
        let start = self.point2d_to_index(from);
        let end = self.point2d_to_index(to);
        let path = a_star_search(start, end, self);
        if !path.success {
            return None;
        }
        Some(
            path.steps
                .into_iter()
                .map(|idx| self.index_to_point2d(idx))
                .collect(),
        )
    }
}

impl BaseMap for Level {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles
            .get(idx)
            .map_or(true, |tile| matches!(tile, Tile::Wall | Tile::Empty))
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        let steps = [
            Point::new(1, 0),
            Point::new(-1, 0),
            Point::new(0, 1),
            Point::new(0, -1),
        ];
        for dir in steps {
            let dest = Point::new(point.x + dir.x, point.y + dir.y);
            if self.is_walkable(dest) {
                exits.push((self.point2d_to_index(dest), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Manhattan.distance2d(p1, p2)
    }
}

impl Algorithm2D for Level {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Level::in_bounds(self, point)
    }
}

/// L-shaped walk from `start`: along its row to `end.x`, then along that
/// column to `end.y`.
pub fn corridor_path(start: Point, end: Point) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = start;
    path.push(cursor);

    while cursor.x != end.x {
        cursor.x += if end.x > cursor.x { 1 } else { -1 };
        path.push(cursor);
    }

    while cursor.y != end.y {
        cursor.y += if end.y > cursor.y { 1 } else { -1 };
        path.push(cursor);
    }

    path
}
