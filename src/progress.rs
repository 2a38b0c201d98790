use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Difficulty;
use crate::error::Result;

/// Highest unlocked level per difficulty, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Progress {
    unlocked: BTreeMap<Difficulty, u32>,
}

// Unknown tier names are dropped so the known ones survive.
impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
        let unlocked = raw
            .into_iter()
            .filter_map(|(name, level)| name.parse::<Difficulty>().ok().map(|d| (d, level)))
            .collect();
        Ok(Self { unlocked })
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked: Difficulty::ALL.iter().map(|d| (*d, 1)).collect(),
        }
    }
}

impl Progress {
    pub fn unlocked(&self, difficulty: Difficulty) -> u32 {
        self.unlocked.get(&difficulty).copied().unwrap_or(1).max(1)
    }

    pub fn is_unlocked(&self, difficulty: Difficulty, level: u32) -> bool {
        level >= 1 && level <= self.unlocked(difficulty)
    }

    pub fn is_completed(&self, difficulty: Difficulty, level: u32) -> bool {
        level >= 1 && level < self.unlocked(difficulty)
    }

    /// Advances the frontier by one when `level` is the frontier itself.
    /// Replays of earlier levels leave it untouched.
    pub fn record_completion(&mut self, difficulty: Difficulty, level: u32, total_levels: u32) -> bool {
        let current = self.unlocked(difficulty);
        if level != current || current >= total_levels {
            return false;
        }
        self.unlocked.insert(difficulty, current + 1);
        info!("{difficulty} level {} unlocked", current + 1);
        true
    }

    pub fn sanitized(mut self, total_levels: u32) -> Self {
        let ceiling = total_levels.max(1);
        for d in Difficulty::ALL {
            let value = self.unlocked.get(&d).copied().unwrap_or(1).clamp(1, ceiling);
            self.unlocked.insert(d, value);
        }
        self
    }
}

pub trait ProgressStore {
    /// Never fails: anything unreadable falls back to the default record.
    fn load(&self) -> Progress;
    fn save(&mut self, progress: &Progress) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Progress {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Progress::default(),
            Err(e) => {
                warn!("could not read {}: {e}; starting fresh", self.path.display());
                return Progress::default();
            }
        };
        match serde_json::from_str::<Progress>(&text) {
            Ok(progress) => progress,
            Err(e) => {
                warn!("ignoring corrupt progress file {}: {e}", self.path.display());
                Progress::default()
            }
        }
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        let json = serde_json::to_string(progress)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub saved: Option<Progress>,
    pub saves: usize,
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Progress {
        self.saved.clone().unwrap_or_default()
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        self.saved = Some(progress.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("maze-runner-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn defaults_to_level_one_everywhere() {
        let progress = Progress::default();
        for d in Difficulty::ALL {
            assert_eq!(progress.unlocked(d), 1);
            assert!(progress.is_unlocked(d, 1));
            assert!(!progress.is_unlocked(d, 2));
            assert!(!progress.is_completed(d, 1));
        }
    }

    #[test]
    fn completing_frontier_unlocks_next() {
        let mut progress = Progress::default();
        assert!(progress.record_completion(Difficulty::Easy, 1, 10));
        assert_eq!(progress.unlocked(Difficulty::Easy), 2);
        assert_eq!(progress.unlocked(Difficulty::Hard), 1);
        assert!(progress.is_completed(Difficulty::Easy, 1));
    }

    #[test]
    fn replays_never_move_the_frontier() {
        let mut progress = Progress::default();
        progress.record_completion(Difficulty::Medium, 1, 10);
        progress.record_completion(Difficulty::Medium, 2, 10);
        assert_eq!(progress.unlocked(Difficulty::Medium), 3);

        assert!(!progress.record_completion(Difficulty::Medium, 1, 10));
        assert!(!progress.record_completion(Difficulty::Medium, 2, 10));
        assert!(!progress.record_completion(Difficulty::Medium, 5, 10));
        assert_eq!(progress.unlocked(Difficulty::Medium), 3);
    }

    #[test]
    fn frontier_stops_at_last_level() {
        let mut progress = Progress::default();
        for level in 1..=3 {
            progress.record_completion(Difficulty::Hard, level, 3);
        }
        assert_eq!(progress.unlocked(Difficulty::Hard), 3);
        assert!(!progress.record_completion(Difficulty::Hard, 3, 3));
    }

    #[test]
    fn serializes_as_name_to_level_map() {
        let mut progress = Progress::default();
        progress.record_completion(Difficulty::Easy, 1, 10);
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"easy":2,"medium":1,"hard":1}"#);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let progress: Progress = serde_json::from_str(r#"{"easy":0,"hard":99}"#).unwrap();
        let progress = progress.sanitized(10);
        assert_eq!(progress.unlocked(Difficulty::Easy), 1);
        assert_eq!(progress.unlocked(Difficulty::Medium), 1);
        assert_eq!(progress.unlocked(Difficulty::Hard), 10);
    }

    #[test]
    fn unknown_tiers_do_not_discard_known_ones() {
        let progress: Progress = serde_json::from_str(r#"{"easy":4,"expert":1,"hard":2}"#).unwrap();
        let progress = progress.sanitized(10);
        assert_eq!(progress.unlocked(Difficulty::Easy), 4);
        assert_eq!(progress.unlocked(Difficulty::Medium), 1);
        assert_eq!(progress.unlocked(Difficulty::Hard), 2);

        let path = temp_path("unknown-tier");
        fs::write(&path, r#"{"easy":3,"expert":9}"#).unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unlocked(Difficulty::Easy), 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_store_round_trips_and_survives_corruption() {
        let path = temp_path("store");
        let _ = fs::remove_file(&path);
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.load(), Progress::default());

        let mut progress = Progress::default();
        progress.record_completion(Difficulty::Easy, 1, 10);
        store.save(&progress).unwrap();
        assert_eq!(store.load(), progress);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(store.load(), Progress::default());
        let _ = fs::remove_file(&path);
    }
}
