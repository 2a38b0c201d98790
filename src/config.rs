use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

const DEFAULT_RENDER_FPS: u64 = 60;
const DEFAULT_PROGRESS_FILE: &str = "maze_progress.json";
const DEFAULT_TOTAL_LEVELS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownDifficulty(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub base_cols: usize,
    pub base_rows: usize,
    pub growth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub easy: DifficultyParams,
    pub medium: DifficultyParams,
    pub hard: DifficultyParams,
    /// Highest level index; also the ceiling for unlocking.
    pub total_levels: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            easy: DifficultyParams {
                base_cols: 8,
                base_rows: 8,
                growth: 1.0,
            },
            medium: DifficultyParams {
                base_cols: 12,
                base_rows: 12,
                growth: 2.0,
            },
            hard: DifficultyParams {
                base_cols: 15,
                base_rows: 15,
                growth: 3.0,
            },
            total_levels: DEFAULT_TOTAL_LEVELS,
        }
    }
}

impl GameConfig {
    pub fn params(&self, difficulty: Difficulty) -> DifficultyParams {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Grid size for a level: `base + floor(level * growth)` on each axis.
    pub fn dimensions(&self, difficulty: Difficulty, level: u32) -> (usize, usize) {
        let p = self.params(difficulty);
        let extra = (level as f32 * p.growth).floor().max(0.0) as usize;
        (p.base_cols + extra, p.base_rows + extra)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub render_fps: u64,
    pub progress_file: PathBuf,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        let render_fps = std::env::var("MAZE_FPS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RENDER_FPS);
        let progress_file = std::env::var("MAZE_PROGRESS_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRESS_FILE));
        let seed = std::env::var("MAZE_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());
        let log_file = std::env::var("MAZE_LOG_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            render_fps,
            progress_file,
            seed,
            log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_growth_formula() {
        let config = GameConfig::default();
        assert_eq!(config.dimensions(Difficulty::Easy, 1), (9, 9));
        assert_eq!(config.dimensions(Difficulty::Medium, 3), (18, 18));
        assert_eq!(config.dimensions(Difficulty::Hard, 10), (45, 45));
    }

    #[test]
    fn fractional_growth_is_floored() {
        let mut config = GameConfig::default();
        config.easy.growth = 0.5;
        config.easy.base_rows = 6;
        assert_eq!(config.dimensions(Difficulty::Easy, 3), (9, 7));
    }

    #[test]
    fn difficulty_parses_names() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert!(matches!(
            "insane".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty(_))
        ));
    }
}
