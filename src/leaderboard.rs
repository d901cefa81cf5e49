use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::difficulty::Difficulty;
use crate::session::Mode;

/// Leaderboard capacity; everything below the cut is dropped on record
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub date: DateTime<Local>,
}

pub trait LeaderboardStore {
    /// Malformed or missing persisted data reads as empty history
    fn load(&self) -> Vec<LeaderboardEntry>;
    fn save(&self, entries: &[LeaderboardEntry]) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileLeaderboardStore {
    path: PathBuf,
}

impl FileLeaderboardStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::leaderboard_path()
            .unwrap_or_else(|| PathBuf::from("plink_leaderboard.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileLeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardStore for FileLeaderboardStore {
    fn load(&self) -> Vec<LeaderboardEntry> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(entries) = serde_json::from_slice::<Vec<LeaderboardEntry>>(&bytes) {
                return entries;
            }
        }
        Vec::new()
    }

    fn save(&self, entries: &[LeaderboardEntry]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(entries).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Append-only, capped, score-sorted session history
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    store: Box<dyn LeaderboardStore>,
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard")
            .field("entries", &self.entries)
            .finish()
    }
}

impl Leaderboard {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_store(Box::new(FileLeaderboardStore::new()))
    }

    pub fn with_store(store: Box<dyn LeaderboardStore>) -> Self {
        let entries = store.load();
        Self { entries, store }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Append, re-sort descending by score, truncate to the top
    /// [`MAX_ENTRIES`], persist. Entries with equal score keep insertion
    /// order (the sort is stable), so an older result outranks a tie.
    ///
    /// Returns the recorded entry's rank (0 = first place), or `None` if it
    /// fell off the board. Persistence failures are swallowed; losing a
    /// leaderboard write must not disturb the session that produced it.
    pub fn record(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let score = entry.score;
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        // stable sort: among equal scores the new entry sorted last
        let rank = self
            .entries
            .iter()
            .rposition(|e| e.score == score)
            .filter(|&idx| idx < MAX_ENTRIES);
        self.entries.truncate(MAX_ENTRIES);
        let _ = self.store.save(&self.entries);
        rank
    }
}
