use chrono::{DateTime, Local};
use itertools::Itertools;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::difficulty::Difficulty;

/// How a resolved target left the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Clicked inside its lifetime
    Hit,
    /// Lifetime elapsed unhit
    Expired,
    /// A click that landed on empty field
    Whiff,
}

impl TargetOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetOutcome::Hit => "hit",
            TargetOutcome::Expired => "expired",
            TargetOutcome::Whiff => "whiff",
        }
    }
}

/// One resolved target (or whiffed click), as persisted for analytics
#[derive(Debug, Clone)]
pub struct TargetStat {
    pub difficulty: Difficulty,
    pub outcome: TargetOutcome,
    /// Set for hits only
    pub reaction_ms: Option<u64>,
    /// Zero for whiffs, which have no target
    pub radius: f64,
    pub timestamp: DateTime<Local>,
}

/// Per-difficulty aggregate used by the analytics screen
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultySummary {
    pub difficulty: String,
    pub avg_reaction_ms: f64,
    pub hit_rate: f64,
    pub attempts: i64,
}

/// Database manager for per-target statistics
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Open (and migrate) the database at the default state path
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("plink_stats.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::from_connection(Connection::open(&db_path)?)
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path.as_ref())?)
    }

    /// Throwaway database for tests and headless runs
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS target_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                difficulty TEXT NOT NULL,
                outcome TEXT NOT NULL,
                reaction_ms INTEGER,
                radius REAL NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_target_stats_difficulty ON target_stats(difficulty)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_target_stats_timestamp ON target_stats(timestamp)",
            [],
        )?;

        Ok(StatsDb { conn })
    }

    pub fn record_target_stat(&self, stat: &TargetStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO target_stats (difficulty, outcome, reaction_ms, radius, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stat.difficulty.to_string(),
                stat.outcome.as_str(),
                stat.reaction_ms,
                stat.radius,
                stat.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Average reaction time over hits for one difficulty, if any were landed
    pub fn get_avg_reaction(&self, difficulty: Difficulty) -> Result<Option<f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT AVG(reaction_ms) FROM target_stats WHERE difficulty = ?1 AND outcome = 'hit'",
        )?;
        let avg: Option<f64> = stmt.query_row([difficulty.to_string()], |row| row.get(0))?;
        Ok(avg)
    }

    /// Percentage of attempts at one difficulty that were hits
    pub fn get_hit_rate(&self, difficulty: Difficulty) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*) as total,
                SUM(CASE WHEN outcome = 'hit' THEN 1 ELSE 0 END) as hits
            FROM target_stats
            WHERE difficulty = ?1
            "#,
        )?;

        let (total, hits): (i64, i64) = stmt.query_row([difficulty.to_string()], |row| {
            Ok((row.get(0)?, row.get::<_, Option<i64>>(1)?.unwrap_or(0)))
        })?;

        if total == 0 {
            Ok(0.0)
        } else {
            Ok((hits as f64 / total as f64) * 100.0)
        }
    }

    /// Aggregates per difficulty, ordered easy → expert
    pub fn get_difficulty_summary(&self) -> Result<Vec<DifficultySummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                difficulty,
                AVG(CASE WHEN outcome = 'hit' THEN reaction_ms END) as avg_reaction,
                (SUM(CASE WHEN outcome = 'hit' THEN 1 ELSE 0 END) * 100.0 / COUNT(*)) as hit_rate,
                COUNT(*) as attempts
            FROM target_stats
            GROUP BY difficulty
            "#,
        )?;

        let summary_iter = stmt.query_map([], |row| {
            let avg_reaction: Option<f64> = row.get(1)?;
            Ok(DifficultySummary {
                difficulty: row.get(0)?,
                avg_reaction_ms: avg_reaction.unwrap_or(0.0),
                hit_rate: row.get(2)?,
                attempts: row.get(3)?,
            })
        })?;

        let mut summary = Vec::new();
        for item in summary_iter {
            summary.push(item?);
        }

        Ok(summary
            .into_iter()
            .sorted_by_key(|s| difficulty_rank(&s.difficulty))
            .collect())
    }

    /// Dump every recorded row as CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "SELECT difficulty, outcome, reaction_ms, radius, timestamp FROM target_stats ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut wtr = csv::Writer::from_path(path.as_ref()).map_err(csv_to_sqlite_err)?;
        wtr.write_record(["difficulty", "outcome", "reaction_ms", "radius", "timestamp"])
            .map_err(csv_to_sqlite_err)?;
        for row in rows {
            let (difficulty, outcome, reaction_ms, radius, timestamp) = row?;
            wtr.write_record([
                difficulty,
                outcome,
                reaction_ms.map(|ms| ms.to_string()).unwrap_or_default(),
                radius.to_string(),
                timestamp,
            ])
            .map_err(csv_to_sqlite_err)?;
        }
        wtr.flush().map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                Some(format!("csv export failed: {}", e)),
            )
        })?;
        Ok(())
    }

    /// Clear all statistics (for testing or reset purposes)
    pub fn clear_all_stats(&self) -> Result<()> {
        self.conn.execute("DELETE FROM target_stats", [])?;
        Ok(())
    }
}

fn difficulty_rank(name: &str) -> usize {
    Difficulty::ALL
        .iter()
        .position(|d| d.to_string() == name)
        .unwrap_or(Difficulty::ALL.len())
}

fn csv_to_sqlite_err(e: csv::Error) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        Some(format!("csv export failed: {}", e)),
    )
}
