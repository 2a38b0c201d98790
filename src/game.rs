use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Difficulty, GameConfig};
use crate::error::{GameError, Result};
use crate::maze::Dir;
use crate::progress::{Progress, ProgressStore};
use crate::session::{GameSession, MoveResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Locked,
    Open,
    Completed,
}

pub struct Game<S: ProgressStore> {
    config: GameConfig,
    progress: Progress,
    store: S,
    rng: StdRng,
    difficulty: Difficulty,
    score: u32,
    session: Option<GameSession>,
}

impl<S: ProgressStore> Game<S> {
    pub fn new(config: GameConfig, store: S, seed: Option<u64>) -> Self {
        let progress = store.load().sanitized(config.total_levels);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            progress,
            store,
            rng,
            difficulty: Difficulty::Easy,
            score: 0,
            session: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Replaces the current session with a fresh maze for `level`.
    pub fn start_level(&mut self, level: u32) -> Result<&GameSession> {
        let total = self.config.total_levels;
        if level < 1 || level > total {
            return Err(GameError::LevelOutOfRange { level, total });
        }
        if !self.progress.is_unlocked(self.difficulty, level) {
            return Err(GameError::LevelLocked {
                difficulty: self.difficulty,
                level,
            });
        }
        let session = GameSession::start(&self.config, self.difficulty, level, self.score, &mut self.rng)?;
        Ok(&*self.session.insert(session))
    }

    pub fn restart(&mut self) -> Result<&GameSession> {
        let level = self.current_level().unwrap_or(1);
        self.start_level(level)
    }

    pub fn has_next_level(&self) -> bool {
        self.current_level()
            .map(|level| level < self.config.total_levels)
            .unwrap_or(false)
    }

    pub fn next_level(&mut self) -> Result<&GameSession> {
        let level = self.current_level().unwrap_or(0) + 1;
        self.start_level(level)
    }

    fn current_level(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.level())
    }

    pub fn move_player(&mut self, dir: Dir) -> Result<MoveResult> {
        let Some(session) = self.session.as_mut() else {
            return Ok(MoveResult::Ignored);
        };
        let (dc, dr) = dir.delta();
        let result = session.step(dc as i32, dr as i32)?;

        if let MoveResult::Moved {
            completed: Some(outcome),
            ..
        } = result
        {
            self.score = outcome.total_score;
            let total = self.config.total_levels;
            if self.progress.record_completion(outcome.difficulty, outcome.level, total) {
                if let Err(e) = self.store.save(&self.progress) {
                    warn!("failed to save progress: {e}");
                }
            }
        }
        Ok(result)
    }

    pub fn level_rows(&self) -> Vec<(u32, LevelState)> {
        (1..=self.config.total_levels)
            .map(|level| {
                let state = if self.progress.is_completed(self.difficulty, level) {
                    LevelState::Completed
                } else if self.progress.is_unlocked(self.difficulty, level) {
                    LevelState::Open
                } else {
                    LevelState::Locked
                };
                (level, state)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryStore;

    fn game() -> Game<MemoryStore> {
        Game::new(GameConfig::default(), MemoryStore::default(), Some(21))
    }

    #[test]
    fn locked_and_out_of_range_levels_are_refused() {
        let mut game = game();
        assert!(matches!(
            game.start_level(2),
            Err(GameError::LevelLocked { level: 2, .. })
        ));
        assert!(matches!(
            game.start_level(0),
            Err(GameError::LevelOutOfRange { level: 0, total: 10 })
        ));
        assert!(matches!(
            game.start_level(11),
            Err(GameError::LevelOutOfRange { .. })
        ));
        assert!(game.session().is_none());
    }

    #[test]
    fn moves_without_session_are_ignored() {
        let mut game = game();
        assert_eq!(game.move_player(Dir::Right).unwrap(), MoveResult::Ignored);
    }

    #[test]
    fn level_rows_reflect_progress() {
        let mut store = MemoryStore::default();
        let mut progress = Progress::default();
        progress.record_completion(Difficulty::Easy, 1, 10);
        store.save(&progress).unwrap();

        let game = Game::new(GameConfig::default(), store, Some(1));
        let rows = game.level_rows();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0], (1, LevelState::Completed));
        assert_eq!(rows[1], (2, LevelState::Open));
        assert_eq!(rows[2], (3, LevelState::Locked));
    }

    #[test]
    fn restart_keeps_level_and_difficulty() {
        let mut game = game();
        game.select_difficulty(Difficulty::Medium);
        game.start_level(1).unwrap();
        let session = game.restart().unwrap();
        assert_eq!(session.level(), 1);
        assert_eq!(session.difficulty(), Difficulty::Medium);
        assert_eq!(session.grid().cols(), 14);
    }

    #[test]
    fn next_level_requires_unlock() {
        let mut game = game();
        game.start_level(1).unwrap();
        assert!(game.has_next_level());
        assert!(matches!(
            game.next_level(),
            Err(GameError::LevelLocked { level: 2, .. })
        ));
    }
}
