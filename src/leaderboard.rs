//! High score leaderboard
//!
//! Persisted as JSON next to the save path, tracks the top 5 scores. Load and
//! save failures degrade to an empty board or an unsaved run rather than
//! aborting the game.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard rows to keep
pub const MAX_ENTRIES: usize = 5;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Top-5 leaderboard bound to a JSON file
#[derive(Debug, Clone)]
pub struct Leaderboard {
    path: PathBuf,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Load the leaderboard from `path`.
    ///
    /// A missing or unparseable file yields an empty board; the parse failure
    /// is logged, never surfaced.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Vec<LeaderboardEntry>>(&json) {
                Ok(mut entries) => {
                    entries.sort_by(|a, b| b.score.cmp(&a.score));
                    entries.truncate(MAX_ENTRIES);
                    log::info!("Loaded {} leaderboard entries", entries.len());
                    entries
                }
                Err(e) => {
                    log::warn!("Corrupt leaderboard file {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(_) => {
                log::info!("No leaderboard found, starting fresh");
                Vec::new()
            }
        };
        Self { path, entries }
    }

    /// Re-read the backing file, picking up scores written since [`load`](Self::load)
    pub fn reload(&mut self) {
        self.entries = Self::load(&self.path).entries;
    }

    /// Rows in rank order, best first
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best stored score, if any
    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Would `score` take the top rank? An empty board always says yes.
    pub fn is_new_best(&self, score: u64) -> bool {
        self.best().is_none_or(|best| score > best)
    }

    /// Is `name` already on the board? Case-insensitive.
    pub fn name_taken(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Record a finished run and persist.
    ///
    /// The entry is inserted unconditionally (name uniqueness was settled at
    /// naming time), the board re-sorted and trimmed to the top 5. A write
    /// failure is logged and the in-memory board kept.
    pub fn record(&mut self, name: &str, score: u64) {
        self.entries.push(LeaderboardEntry {
            name: name.to_string(),
            score,
        });
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
        self.save();
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize leaderboard: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            log::warn!("Failed to write leaderboard {}: {e}", self.path.display());
        } else {
            log::info!("Leaderboard saved ({} entries)", self.entries.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_in(dir: &tempfile::TempDir) -> Leaderboard {
        Leaderboard::load(dir.path().join("leaderboard.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let board = board_in(&dir);
        assert!(board.is_empty());
        assert!(board.is_new_best(0));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        std::fs::write(&path, "not json {").unwrap();
        let board = Leaderboard::load(&path);
        assert!(board.is_empty());
    }

    #[test]
    fn test_record_sorts_and_trims_to_five() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = board_in(&dir);
        for (name, score) in [
            ("Asha", 1000),
            ("Bina", 3000),
            ("Chandra", 500),
            ("Devi", 2500),
            ("Esha", 1500),
            ("Farid", 2000),
        ] {
            board.record(name, score);
        }
        let scores: Vec<u64> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![3000, 2500, 2000, 1500, 1000]);
        assert_eq!(board.entries().len(), MAX_ENTRIES);
    }

    #[test]
    fn test_record_persists_across_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        {
            let mut board = Leaderboard::load(&path);
            board.record("Asha", 4200);
        }
        let board = Leaderboard::load(&path);
        assert_eq!(board.best(), Some(4200));
        assert_eq!(board.entries()[0].name, "Asha");
    }

    #[test]
    fn test_new_best_beats_strictly() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = board_in(&dir);
        board.record("Asha", 1000);
        assert!(!board.is_new_best(1000));
        assert!(board.is_new_best(1001));
    }

    #[test]
    fn test_name_taken_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = board_in(&dir);
        board.record("Asha", 1000);
        assert!(board.name_taken("asha"));
        assert!(board.name_taken("ASHA"));
        assert!(!board.name_taken("Bina"));
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        let mut board = Leaderboard::load(&path);
        assert!(board.is_empty());

        let mut other = Leaderboard::load(&path);
        other.record("Devi", 900);

        board.reload();
        assert!(board.name_taken("Devi"));
    }
}
