//! Perfect-maze generation, a move-validating game session, and level
//! progression persisted between runs.

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod maze;
pub mod progress;
pub mod render;
pub mod session;

pub use config::{Difficulty, DifficultyParams, GameConfig, Settings};
pub use error::{GameError, Result};
pub use game::{Game, LevelState};
pub use maze::{generate, generate_with, Cell, Dir, Grid, Position};
pub use progress::{JsonFileStore, MemoryStore, Progress, ProgressStore};
pub use session::{level_score, GameSession, LevelOutcome, MoveResult, Phase};
