use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("unknown difficulty \"{0}\" (expected easy, normal or hard)")]
    UnknownDifficulty(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("no room could be placed (seed {seed})")]
    NoRooms { seed: u64 },

    #[error("level configuration rejected: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("no route between entry and exit after {attempts} link generations")]
    Unsolvable { attempts: u32 },

    #[error("trace configuration rejected: {0}")]
    InvalidConfig(String),
}

/// Faults raised inside a command handler. The session reports them as a
/// single error line and keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Internal(String),
}
