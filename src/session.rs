use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use crate::config::{Difficulty, GameConfig};
use crate::error::{GameError, Result};
use crate::maze::{self, Dir, Grid, Position};

const BASE_POINTS_PER_LEVEL: u32 = 100;
const TIME_BONUS_MAX: u64 = 300;
const TIME_BONUS_DECAY: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutcome {
    pub difficulty: Difficulty,
    pub level: u32,
    pub elapsed_secs: u64,
    pub level_score: u32,
    pub total_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Ignored,
    Blocked,
    Moved {
        to: Position,
        completed: Option<LevelOutcome>,
    },
}

/// `100 * level` plus a time bonus that drains 5 points per second.
pub fn level_score(level: u32, elapsed_secs: u64) -> u32 {
    let bonus = TIME_BONUS_MAX.saturating_sub(elapsed_secs.saturating_mul(TIME_BONUS_DECAY));
    BASE_POINTS_PER_LEVEL.saturating_mul(level) + bonus as u32
}

#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    difficulty: Difficulty,
    level: u32,
    player: Position,
    goal: Position,
    started_at: Instant,
    finished_at: Option<Instant>,
    score: u32,
    phase: Phase,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            grid: Grid::filled(1, 1),
            difficulty: Difficulty::Easy,
            level: 0,
            player: Position::default(),
            goal: Position::default(),
            started_at: Instant::now(),
            finished_at: None,
            score: 0,
            phase: Phase::NotStarted,
        }
    }

    pub fn start(
        config: &GameConfig,
        difficulty: Difficulty,
        level: u32,
        carried_score: u32,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let (cols, rows) = config.dimensions(difficulty, level);
        let grid = maze::generate_with(cols, rows, rng)?;
        info!("starting {difficulty} level {level} on a {cols}x{rows} maze");

        Ok(Self {
            grid,
            difficulty,
            level,
            player: Position::new(0, 0),
            goal: Position::new(cols - 1, rows - 1),
            started_at: Instant::now(),
            finished_at: None,
            score: carried_score,
            phase: Phase::Running,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Whole seconds on the level clock; frozen once the goal is reached.
    pub fn elapsed_secs(&self) -> u64 {
        match self.phase {
            Phase::NotStarted => 0,
            Phase::Running => self.started_at.elapsed().as_secs(),
            Phase::Completed => self
                .finished_at
                .map(|t| t.saturating_duration_since(self.started_at))
                .unwrap_or(Duration::ZERO)
                .as_secs(),
        }
    }

    pub fn step(&mut self, d_col: i32, d_row: i32) -> Result<MoveResult> {
        self.step_at(d_col, d_row, Instant::now())
    }

    /// Same as [`step`](Self::step) with an explicit clock reading for the win check.
    pub fn step_at(&mut self, d_col: i32, d_row: i32, now: Instant) -> Result<MoveResult> {
        let dir = Dir::from_delta(d_col, d_row).ok_or(GameError::InvalidDirection { d_col, d_row })?;
        if self.phase != Phase::Running {
            return Ok(MoveResult::Ignored);
        }

        let open = self
            .grid
            .cell(self.player)
            .map(|cell| !cell.has_wall(dir))
            .unwrap_or(false);
        let next = match self.grid.neighbor(self.player, dir) {
            Some(next) if open => next,
            _ => {
                debug!("move {dir:?} blocked at {:?}", self.player);
                return Ok(MoveResult::Blocked);
            }
        };

        self.player = next;
        let completed = self.check_win(now);
        Ok(MoveResult::Moved {
            to: next,
            completed,
        })
    }

    fn check_win(&mut self, now: Instant) -> Option<LevelOutcome> {
        if self.player != self.goal {
            return None;
        }
        self.phase = Phase::Completed;
        self.finished_at = Some(now);

        let elapsed_secs = now.saturating_duration_since(self.started_at).as_secs();
        let gained = level_score(self.level, elapsed_secs);
        self.score = self.score.saturating_add(gained);
        info!(
            "{} level {} completed in {}s: +{} (total {})",
            self.difficulty, self.level, elapsed_secs, gained, self.score
        );

        Some(LevelOutcome {
            difficulty: self.difficulty,
            level: self.level,
            elapsed_secs,
            level_score: gained,
            total_score: self.score,
        })
    }
}
