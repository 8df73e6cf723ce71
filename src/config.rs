//! Plain configuration structs for every subsystem.
//!
//! All of them deserialize from JSON with defaults filled in, so a config file
//! only needs to name the values it changes.

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{data::hosts::Host, error::ConfigError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(value.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelType {
    #[default]
    Network,
    Server,
    Database,
}

impl LevelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelType::Network => "network",
            LevelType::Server => "server",
            LevelType::Database => "database",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: i32,
    pub height: i32,
    pub min_rooms: i32,
    pub max_rooms: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub difficulty: Difficulty,
    pub level_type: LevelType,
    pub seed: Option<u64>,
    /// Placement tries per room slot before the slot is given up.
    pub room_attempts: u32,
    /// Position tries per object before it is dropped.
    pub object_attempts: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            min_rooms: 5,
            max_rooms: 10,
            min_room_size: 4,
            max_room_size: 8,
            difficulty: Difficulty::Normal,
            level_type: LevelType::Network,
            seed: None,
            room_attempts: 30,
            object_attempts: 50,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_room_size < 3 {
            return Err(ConfigError::invalid(
                "min_room_size",
                format!("{} leaves no interior (minimum is 3)", self.min_room_size),
            ));
        }
        if self.max_room_size < self.min_room_size {
            return Err(ConfigError::invalid(
                "max_room_size",
                format!("{} is below min_room_size {}", self.max_room_size, self.min_room_size),
            ));
        }
        if self.min_rooms < 1 || self.max_rooms < self.min_rooms {
            return Err(ConfigError::invalid(
                "rooms",
                format!("range {}..={} is empty", self.min_rooms, self.max_rooms),
            ));
        }
        if self.width < self.max_room_size + 2 || self.height < self.max_room_size + 2 {
            return Err(ConfigError::invalid(
                "dimensions",
                format!(
                    "{}x{} cannot hold a {}-tile room with its margin",
                    self.width, self.height, self.max_room_size
                ),
            ));
        }
        if self.room_attempts == 0 {
            return Err(ConfigError::invalid("room_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

/// Shape of one network trace puzzle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceParams {
    pub grid_size: usize,
    pub connections: usize,
    pub node_types: u8,
    pub time_limit_secs: u32,
}

impl TraceParams {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                grid_size: 6,
                connections: 3,
                node_types: 3,
                time_limit_secs: 60,
            },
            Difficulty::Normal => Self {
                grid_size: 8,
                connections: 2,
                node_types: 4,
                time_limit_secs: 45,
            },
            Difficulty::Hard => Self {
                grid_size: 10,
                connections: 2,
                node_types: 5,
                time_limit_secs: 30,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub difficulty: Difficulty,
    /// Replaces the difficulty table when set.
    pub params: Option<TraceParams>,
    pub board_width: f32,
    pub board_height: f32,
    /// Link generations tried before the puzzle is declared unsolvable.
    pub link_attempts: u32,
    pub seed: Option<u64>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            params: None,
            board_width: 600.0,
            board_height: 400.0,
            link_attempts: 2,
            seed: None,
        }
    }
}

impl TraceConfig {
    pub fn with_params(params: TraceParams) -> Self {
        Self {
            params: Some(params),
            ..Self::default()
        }
    }

    pub fn params(&self) -> TraceParams {
        self.params
            .unwrap_or_else(|| TraceParams::for_difficulty(self.difficulty))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = self.params();
        if params.grid_size < 2 {
            return Err(ConfigError::invalid(
                "grid_size",
                "entry and exit need at least two columns",
            ));
        }
        if params.node_types == 0 {
            return Err(ConfigError::invalid("node_types", "must be at least 1"));
        }
        if self.link_attempts == 0 {
            return Err(ConfigError::invalid("link_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

/// Player-facing options edited with `options`/`setopt`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Percent, 0 to 100.
    pub sound_volume: u8,
    pub music_volume: u8,
    /// Milliseconds per typed character in the terminal view.
    pub terminal_speed: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            sound_volume: 70,
            music_volume: 50,
            terminal_speed: 20,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sound_volume > 100 || self.music_volume > 100 {
            return Err(ConfigError::invalid("volume", "must be between 0 and 100"));
        }
        if !(10..=50).contains(&self.terminal_speed) {
            return Err(ConfigError::invalid(
                "terminal_speed",
                "must be between 10 and 50",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub home_directory: String,
    /// Lines kept in the scrollback buffer.
    pub max_lines: usize,
    /// Hosts revealed by `scan`.
    pub hosts: Vec<Host>,
    /// Host revealed by a successful database breach.
    pub backup_host: Host,
    pub settings: Settings,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            home_directory: "/home/user".to_string(),
            max_lines: 100,
            hosts: crate::data::hosts::scan_table(),
            backup_host: crate::data::hosts::backup_host(),
            settings: Settings::default(),
        }
    }
}

impl TerminalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.home_directory.starts_with('/') {
            return Err(ConfigError::invalid(
                "home_directory",
                format!("\"{}\" is not absolute", self.home_directory),
            ));
        }
        if self.max_lines == 0 {
            return Err(ConfigError::invalid("max_lines", "must be at least 1"));
        }
        self.settings.validate()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub level: LevelConfig,
    pub trace: TraceConfig,
    pub terminal: TerminalConfig,
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level.validate()?;
        self.trace.validate()?;
        self.terminal.validate()
    }

    /// Applies one difficulty to every subsystem.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.level.difficulty = difficulty;
        self.trace.difficulty = difficulty;
        self.terminal.settings.difficulty = difficulty;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.level.seed = Some(seed);
        self.trace.seed = Some(seed);
    }
}
