use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use netrunner::{
    map::{Level, ObjectKind, Tile},
    terminal::{LineStyle, TerminalSession},
    trace::{NetworkGraph, NodeId, TraceStatus},
};

const NODE_SPACING_X: i32 = 6;
const NODE_SPACING_Y: i32 = 3;

/// Visible window onto a level, kept centred on the player where possible.
#[derive(Copy, Clone, Debug)]
pub struct Viewport {
    pub origin: Point,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    fn camera(&self, level: &Level, focus: Point) -> Point {
        let x = (focus.x - self.width / 2).clamp(0, (level.width - self.width).max(0));
        let y = (focus.y - self.height / 2).clamp(0, (level.height - self.height).max(0));
        Point::new(x, y)
    }
}

pub fn draw_header(ctx: &mut BTerm, title: &str, detail: &str) {
    let (width, _) = ctx.get_char_size();
    ctx.draw_box(0, 0, width as i32 - 1, 4, RGB::named(GRAY), RGB::named(BLACK));
    ctx.print_color(2, 1, RGB::named(LIGHT_GREEN), RGB::named(BLACK), title);
    ctx.print_color(2, 2, RGB::named(LIGHT_CYAN), RGB::named(BLACK), detail);
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let height = (log.len() as i32).min(5) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width as i32 - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(
        2,
        top + 1,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "Event Log",
    );
    for (row, entry) in log.iter().take(5).enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}

pub fn draw_map(ctx: &mut BTerm, level: &Level, viewport: Viewport, player: Point) {
    let camera = viewport.camera(level, player);

    for sy in 0..viewport.height {
        for sx in 0..viewport.width {
            let point = Point::new(camera.x + sx, camera.y + sy);
            let Some(tile) = level.tile(point) else {
                continue;
            };
            let screen_x = viewport.origin.x + sx;
            let screen_y = viewport.origin.y + sy;
            let (fg, glyph) = if point == player {
                (RGB::named(YELLOW), '@')
            } else if let Some(object) = level.object_at(point) {
                (object_color(object.kind), object.kind.glyph())
            } else {
                (tile_color(tile), tile.glyph())
            };
            ctx.set(screen_x, screen_y, fg, RGB::named(BLACK), to_cp437(glyph));
        }
    }
}

fn tile_color(tile: Tile) -> RGB {
    match tile {
        Tile::Wall => RGB::from_u8(0, 100, 0),
        Tile::Floor => RGB::named(GRAY),
        Tile::Door => RGB::named(LIGHT_GREEN),
        Tile::Empty => RGB::named(BLACK),
    }
}

fn object_color(kind: ObjectKind) -> RGB {
    match kind {
        ObjectKind::Firewall => RGB::named(RED),
        ObjectKind::DataPacket => RGB::named(CYAN),
        ObjectKind::Terminal => RGB::named(LIGHT_GREEN),
    }
}

pub fn draw_terminal(ctx: &mut BTerm, session: &TerminalSession, input: &str, top: i32, rows: i32) {
    let (width, _) = ctx.get_char_size();
    ctx.draw_box(
        0,
        top,
        width as i32 - 1,
        rows + 1,
        RGB::from_u8(0, 100, 0),
        RGB::named(BLACK),
    );

    let visible = (rows - 1).max(0) as usize;
    let lines = session.scrollback();
    let skip = lines.len().saturating_sub(visible);
    for (row, line) in lines.iter().skip(skip).enumerate() {
        ctx.print_color(
            2,
            top + 1 + row as i32,
            style_color(line.style),
            RGB::named(BLACK),
            &line.text,
        );
    }

    let prompt_line = if session.is_busy() {
        "...".to_string()
    } else {
        format!("{} {input}_", session.prompt())
    };
    ctx.print_color(
        2,
        top + rows,
        RGB::named(LIGHT_GREEN),
        RGB::named(BLACK),
        &prompt_line,
    );
}

fn style_color(style: LineStyle) -> RGB {
    match style {
        LineStyle::Normal => RGB::named(GREEN),
        LineStyle::Echo => RGB::named(LIGHT_GREEN),
        LineStyle::Error => RGB::named(RED),
        LineStyle::Directory => RGB::named(LIGHT_BLUE),
        LineStyle::File => RGB::named(WHITE),
        LineStyle::Success => RGB::named(YELLOW),
    }
}

pub fn draw_trace(ctx: &mut BTerm, graph: &NetworkGraph, cursor: Point, origin: Point) {
    let screen = |grid: Point| {
        Point::new(
            origin.x + grid.x * NODE_SPACING_X,
            origin.y + grid.y * NODE_SPACING_Y,
        )
    };

    for (a, b) in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(a), graph.node(b)) else {
            continue;
        };
        let active = is_step(graph.current_path(), a, b);
        let color = if active {
            RGB::named(YELLOW)
        } else {
            RGB::named(DARK_GRAY)
        };
        let start = screen(from.grid);
        let end = screen(to.grid);
        if start.y == end.y {
            for x in start.x.min(end.x) + 1..start.x.max(end.x) {
                ctx.set(x, start.y, color, RGB::named(BLACK), to_cp437('-'));
            }
        } else {
            for y in start.y.min(end.y) + 1..start.y.max(end.y) {
                ctx.set(start.x, y, color, RGB::named(BLACK), to_cp437('|'));
            }
        }
    }

    for node in graph.nodes() {
        let at = screen(node.grid);
        let glyph = char::from_digit(u32::from(node.kind), 36).unwrap_or('?');
        let fg = if graph.current_path().contains(&node.id) {
            RGB::named(YELLOW)
        } else if node.id == graph.entry() || node.id == graph.exit() {
            RGB::named(LIGHT_GREEN)
        } else {
            kind_color(node.kind)
        };
        let bg = if node.grid == cursor {
            RGB::from_u8(0, 0, 96)
        } else {
            RGB::named(BLACK)
        };
        ctx.set(at.x, at.y, fg, bg, to_cp437(glyph));
    }

    let status = match graph.status() {
        TraceStatus::Active => format!(
            "Time left: {:>4.1}s  Path: {}",
            graph.time_left_ms() as f32 / 1000.0,
            graph.current_path().len()
        ),
        TraceStatus::Completed => "Trace complete".to_string(),
        TraceStatus::Failed(reason) => format!("Trace failed: {reason:?}"),
    };
    ctx.print_color(
        origin.x,
        origin.y - 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        &status,
    );
}

fn is_step(path: &[NodeId], a: NodeId, b: NodeId) -> bool {
    path.windows(2)
        .any(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
}

fn kind_color(kind: u8) -> RGB {
    match kind % 5 {
        0 => RGB::named(CYAN),
        1 => RGB::named(MAGENTA),
        2 => RGB::named(ORANGE),
        3 => RGB::named(LIGHT_BLUE),
        _ => RGB::from_u8(255, 120, 180),
    }
}
