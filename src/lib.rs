//! Core of a terminal hacking game.
//!
//! - [`map`]: seeded room-and-corridor levels with objects to find.
//! - [`trace`]: the network trace puzzle, a typed node grid with a
//!   guaranteed solution path.
//! - [`terminal`]: a command interpreter over a fixed filesystem and a
//!   simulated network, with staggered output driven by a virtual clock.
//!
//! Everything is single-threaded and owned by whoever constructs it. All
//! randomness flows through [`rng::RandomSequence`], so a seed reproduces a
//! level or puzzle exactly.

pub mod config;
pub mod data;
pub mod error;
pub mod map;
pub mod rng;
pub mod terminal;
pub mod trace;

pub use config::{Difficulty, GameConfig, LevelConfig, Settings, TerminalConfig, TraceConfig};
pub use error::{CommandError, ConfigError, LevelError, TraceError};
pub use map::{Level, LevelGenerator};
pub use rng::RandomSequence;
pub use terminal::{MinigameOutcome, TerminalEvent, TerminalSession};
pub use trace::NetworkGraph;
