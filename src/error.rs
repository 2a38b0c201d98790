use crate::config::Difficulty;

/// Errors surfaced by maze generation, session handling and progress persistence.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid maze dimensions {cols}x{rows}: both must be at least 1")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("invalid move ({d_col}, {d_row}): expected a single unit step")]
    InvalidDirection { d_col: i32, d_row: i32 },

    #[error("level {level} is out of range (1..={total})")]
    LevelOutOfRange { level: u32, total: u32 },

    #[error("level {level} is locked on {difficulty}")]
    LevelLocked { difficulty: Difficulty, level: u32 },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
