mod input;
mod render;
mod scripted_input;

use std::path::{Path, PathBuf};

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use chrono::Local;
use clap::Parser;
use log::{info, warn};
use netrunner::{
    config::{Difficulty, GameConfig, TraceConfig},
    error::{ConfigError, LevelError},
    map::{Level, LevelGenerator, ObjectKind},
    terminal::{MinigameOutcome, TerminalEvent, TerminalSession},
    trace::{NetworkGraph, Selection, TraceStatus},
};
use render::{Viewport, draw_header, draw_log, draw_map, draw_terminal, draw_trace};
use scripted_input::ScriptedInput;

const SCREEN_HEIGHT: i32 = 50;
const MAP_ORIGIN_X: i32 = 1;
const MAP_ORIGIN_Y: i32 = 5;
const LOG_PANEL_START: i32 = SCREEN_HEIGHT - 6;
const LOG_MAX_ENTRIES: usize = 8;
const VIEW_WIDTH: i32 = 78;
const VIEW_HEIGHT: i32 = LOG_PANEL_START - MAP_ORIGIN_Y - 2;
const TERMINAL_TOP: i32 = 5;
const TERMINAL_ROWS: i32 = LOG_PANEL_START - TERMINAL_TOP - 3;
const TRACE_ORIGIN_X: i32 = 8;
const TRACE_ORIGIN_Y: i32 = 9;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for level and trace generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// easy, normal or hard
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// JSON config file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feed terminal lines from a file and print the transcript
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print the generated level as ASCII and exit
    #[arg(long)]
    dump_level: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Map,
    Terminal,
    Trace,
}

/// Where a trace run was started from, and so where its result goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TraceOrigin {
    Firewall(Point),
    Breach,
}

struct TraceRun {
    graph: NetworkGraph,
    cursor: Point,
    origin: TraceOrigin,
}

struct NetrunnerState {
    config: GameConfig,
    level: Level,
    player: Point,
    mode: Mode,
    session: TerminalSession,
    input_line: String,
    trace: Option<TraceRun>,
    message_log: Vec<String>,
    packets: usize,
    frame: u64,
}

impl NetrunnerState {
    fn new(config: GameConfig) -> Result<Self, LevelError> {
        let level = LevelGenerator::new(config.level.clone()).try_generate_level()?;
        let session = TerminalSession::new(config.terminal.clone());
        let mut state = Self {
            player: level.start,
            level,
            config,
            mode: Mode::Map,
            session,
            input_line: String::new(),
            trace: None,
            message_log: Vec::new(),
            packets: 0,
            frame: 0,
        };
        state.push_log_entry(format!(
            "Level seed {}: {} rooms, {} objects",
            state.level.seed,
            state.level.rooms.len(),
            state.level.objects.len()
        ));
        Ok(state)
    }
}

impl GameState for NetrunnerState {
    fn tick(&mut self, ctx: &mut BTerm) {
        let elapsed_ms = ctx.frame_time_ms.max(0.0) as u64;
        self.frame = self.frame.wrapping_add(1);
        match self.mode {
            Mode::Map => self.handle_map_input(ctx),
            Mode::Terminal => self.handle_terminal_input(ctx),
            Mode::Trace => self.handle_trace_input(ctx),
        }
        self.session.advance(elapsed_ms);
        self.pump_session_events();
        self.advance_trace(elapsed_ms);
        ctx.cls();
        self.draw_scene(ctx);
    }
}

impl NetrunnerState {
    fn handle_map_input(&mut self, ctx: &mut BTerm) {
        if let Some(key) = ctx.key {
            match key {
                VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H => {
                    self.try_step(-1, 0)
                }
                VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L => {
                    self.try_step(1, 0)
                }
                VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K => self.try_step(0, -1),
                VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J => self.try_step(0, 1),
                VirtualKeyCode::Escape | VirtualKeyCode::Q => ctx.quit(),
                _ => {}
            }
        }
    }

    fn handle_terminal_input(&mut self, ctx: &mut BTerm) {
        let Some(key) = ctx.key else {
            return;
        };
        match key {
            VirtualKeyCode::Escape => {
                self.mode = Mode::Map;
                self.push_log_entry("Left the terminal");
            }
            VirtualKeyCode::Return => {
                let line = std::mem::take(&mut self.input_line);
                self.session.process_line(&line);
            }
            VirtualKeyCode::Back => {
                self.input_line.pop();
            }
            VirtualKeyCode::Up => {
                if let Some(line) = self.session.history_previous() {
                    self.input_line = line.to_string();
                }
            }
            VirtualKeyCode::Down => {
                self.input_line = self
                    .session
                    .history_next()
                    .map(str::to_string)
                    .unwrap_or_default();
            }
            _ => {
                if let Some(c) = input::key_to_char(key, ctx.shift) {
                    self.input_line.push(c);
                }
            }
        }
    }

    fn handle_trace_input(&mut self, ctx: &mut BTerm) {
        let Some(key) = ctx.key else {
            return;
        };
        let Some(run) = self.trace.as_mut() else {
            return;
        };
        let last = run.graph.params().grid_size as i32 - 1;
        let mut rejected = None;
        match key {
            VirtualKeyCode::Left | VirtualKeyCode::A => run.cursor.x = (run.cursor.x - 1).max(0),
            VirtualKeyCode::Right | VirtualKeyCode::D => {
                run.cursor.x = (run.cursor.x + 1).min(last)
            }
            VirtualKeyCode::Up | VirtualKeyCode::W => run.cursor.y = (run.cursor.y - 1).max(0),
            VirtualKeyCode::Down | VirtualKeyCode::S => {
                run.cursor.y = (run.cursor.y + 1).min(last)
            }
            VirtualKeyCode::Return | VirtualKeyCode::Space => {
                if let Selection::Rejected(reason) = run.graph.select_at(run.cursor) {
                    rejected = Some(reason);
                }
            }
            VirtualKeyCode::Escape => run.graph.abort(),
            _ => {}
        }
        if let Some(reason) = rejected {
            self.push_log_entry(format!("Node rejected: {reason:?}"));
        }
    }

    fn try_step(&mut self, dx: i32, dy: i32) {
        let target = Point::new(self.player.x + dx, self.player.y + dy);
        if let Some(kind) = self.level.object_at(target).map(|object| object.kind) {
            match kind {
                ObjectKind::Firewall => {
                    self.push_log_entry(format!("Firewall at {},{}: tracing", target.x, target.y));
                    self.start_trace(TraceOrigin::Firewall(target), self.config.trace.difficulty);
                    return;
                }
                ObjectKind::Terminal => {
                    self.mode = Mode::Terminal;
                    self.push_log_entry(format!("Jacked in at {},{}", target.x, target.y));
                    return;
                }
                ObjectKind::DataPacket => {
                    self.level.remove_object(target);
                    self.packets += 1;
                    let left = self.level.count_objects(ObjectKind::DataPacket);
                    self.push_log_entry(format!("Data packet collected, {left} left"));
                }
            }
        }
        if self.level.is_walkable(target) {
            self.player = target;
        } else {
            self.push_log_entry(format!("Blocked at {},{}", target.x, target.y));
        }
    }

    fn pump_session_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                TerminalEvent::LaunchMinigame {
                    kind,
                    host,
                    difficulty,
                } => {
                    // Password and code puzzles fall back to the trace.
                    self.push_log_entry(format!(
                        "Breach of {} ({} puzzle)",
                        host.address,
                        kind.as_str()
                    ));
                    self.start_trace(TraceOrigin::Breach, difficulty);
                }
                TerminalEvent::SessionEnded => {
                    let mut terminal = self.config.terminal.clone();
                    terminal.settings = self.session.settings().clone();
                    self.session = TerminalSession::new(terminal);
                    self.mode = Mode::Map;
                    self.push_log_entry("Terminal session closed");
                }
                TerminalEvent::Output(_)
                | TerminalEvent::Clear
                | TerminalEvent::PromptChanged(_) => {}
            }
        }
    }

    fn start_trace(&mut self, origin: TraceOrigin, difficulty: Difficulty) {
        let config = TraceConfig {
            difficulty,
            seed: self.config.trace.seed.map(|seed| seed.wrapping_add(self.frame)),
            ..self.config.trace.clone()
        };
        match NetworkGraph::try_new(&config) {
            Ok(graph) => {
                let cursor = graph
                    .node(graph.entry())
                    .map_or(Point::new(0, 0), |node| node.grid);
                self.trace = Some(TraceRun {
                    graph,
                    cursor,
                    origin,
                });
                self.mode = Mode::Trace;
            }
            Err(err) => {
                warn!("trace could not be built: {err}");
                self.push_log_entry(format!("Trace unavailable: {err}"));
                self.finish_trace(origin, false);
            }
        }
    }

    fn advance_trace(&mut self, elapsed_ms: u64) {
        let (status, origin) = match self.trace.as_mut() {
            Some(run) => (run.graph.tick(elapsed_ms), run.origin),
            None => return,
        };
        if status == TraceStatus::Active {
            return;
        }
        self.trace = None;
        self.finish_trace(origin, status == TraceStatus::Completed);
    }

    fn finish_trace(&mut self, origin: TraceOrigin, success: bool) {
        match origin {
            TraceOrigin::Firewall(point) => {
                if success {
                    self.level.remove_object(point);
                    self.push_log_entry(format!("Firewall at {},{} bypassed", point.x, point.y));
                } else {
                    self.push_log_entry("Trace failed, the firewall holds");
                }
                self.mode = Mode::Map;
            }
            TraceOrigin::Breach => {
                let outcome = if success {
                    MinigameOutcome::Success
                } else {
                    MinigameOutcome::Failure
                };
                self.session.resolve_minigame(outcome);
                self.mode = Mode::Terminal;
            }
        }
    }

    fn draw_scene(&mut self, ctx: &mut BTerm) {
        let detail = format!(
            "Seed {} | {} | Packets {} | Frame {}",
            self.level.seed, self.level.difficulty, self.packets, self.frame
        );
        match self.mode {
            Mode::Map => {
                draw_header(ctx, "NETRUNNER :: network map", &detail);
                let viewport = Viewport {
                    origin: Point::new(MAP_ORIGIN_X, MAP_ORIGIN_Y),
                    width: VIEW_WIDTH,
                    height: VIEW_HEIGHT,
                };
                draw_map(ctx, &self.level, viewport, self.player);
            }
            Mode::Terminal => {
                draw_header(ctx, "NETRUNNER :: terminal (Esc to leave)", &detail);
                draw_terminal(
                    ctx,
                    &self.session,
                    &self.input_line,
                    TERMINAL_TOP,
                    TERMINAL_ROWS,
                );
            }
            Mode::Trace => {
                draw_header(
                    ctx,
                    "NETRUNNER :: trace (arrows move, Enter selects, Esc aborts)",
                    &detail,
                );
                if let Some(run) = &self.trace {
                    draw_trace(
                        ctx,
                        &run.graph,
                        run.cursor,
                        Point::new(TRACE_ORIGIN_X, TRACE_ORIGIN_Y),
                    );
                }
            }
        }
        draw_log(ctx, &self.message_log, LOG_PANEL_START);
    }

    fn push_log_entry<S: Into<String>>(&mut self, entry: S) {
        let stamped = format!("{} {}", Local::now().format("%H:%M:%S"), entry.into());
        self.message_log.insert(0, stamped);
        self.message_log.truncate(LOG_MAX_ENTRIES);
    }
}

fn load_config(args: &Args) -> Result<GameConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.set_difficulty(difficulty);
    }
    if let Some(seed) = args.seed {
        config.set_seed(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Runs the session to quiescence, playing any breach puzzle it asks for.
fn settle(session: &mut TerminalSession, trace: &TraceConfig) {
    loop {
        session.run_pending();
        let mut breach = None;
        for event in session.drain_events() {
            match event {
                TerminalEvent::Output(line) => println!("{}", line.text),
                TerminalEvent::Clear => println!("--- screen cleared ---"),
                TerminalEvent::LaunchMinigame {
                    kind,
                    host,
                    difficulty,
                } => {
                    println!(
                        "[{} puzzle against {} on {difficulty}]",
                        kind.as_str(),
                        host.address
                    );
                    breach = Some(difficulty);
                }
                TerminalEvent::SessionEnded => println!("[session ended]"),
                TerminalEvent::PromptChanged(_) => {}
            }
        }
        match breach {
            Some(difficulty) => {
                let outcome = autoplay_trace(trace, difficulty);
                session.resolve_minigame(outcome);
            }
            None => break,
        }
    }
}

fn autoplay_trace(base: &TraceConfig, difficulty: Difficulty) -> MinigameOutcome {
    let config = TraceConfig {
        difficulty,
        ..base.clone()
    };
    let mut graph = NetworkGraph::new(&config);
    let Some(route) = graph.solution() else {
        println!("[trace: no route to the exit]");
        return MinigameOutcome::Failure;
    };
    for id in route {
        if graph.select_node(id) == Selection::Completed {
            println!("[trace: solved in {} hops]", graph.current_path().len() - 1);
            return MinigameOutcome::Success;
        }
    }
    MinigameOutcome::Failure
}

fn run_script(path: &Path, config: &GameConfig) -> BError {
    let mut script = ScriptedInput::from_file(path)?;
    info!("running {} scripted lines from {}", script.len(), path.display());
    let mut session = TerminalSession::try_new(config.terminal.clone())?;
    settle(&mut session, &config.trace);
    while let Some(line) = script.next_line() {
        session.process_line(line);
        settle(&mut session, &config.trace);
        if session.is_ended() {
            break;
        }
    }
    Ok(())
}

fn main() -> BError {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_level {
        let level = LevelGenerator::new(config.level.clone()).try_generate_level()?;
        println!("{}", level.to_ascii());
        println!(
            "seed {} | {} of {} rooms | {} objects ({} dropped)",
            level.seed,
            level.rooms.len(),
            level.rooms_requested,
            level.objects.len(),
            level.dropped_objects
        );
        return Ok(());
    }
    if let Some(path) = &args.script {
        return run_script(path, &config);
    }

    let context = BTermBuilder::simple80x50()
        .with_title("netrunner")
        .build()?;
    let game_state = NetrunnerState::new(config)?;
    main_loop(context, game_state)
}
