use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One resolved placement attempt, as persisted for difficulty analytics.
#[derive(Debug, Clone)]
pub struct PlacementStat {
    pub letter: char,
    pub was_correct: bool,
    pub time_to_place_ms: u64,
    pub word: String,
    pub timestamp: DateTime<Local>,
}

/// Per-letter aggregate across all recorded sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterSummary {
    pub letter: char,
    pub miss_rate: f64,
    pub avg_time_to_place_ms: f64,
    pub attempts: i64,
}

/// Database of placement attempts, one row per resolved drop. Keyed by
/// letter so the results screen can surface which letters the player
/// struggles to place.
#[derive(Debug)]
pub struct LetterStatsDb {
    conn: Connection,
}

impl LetterStatsDb {
    /// Open (creating if needed) the database at the default state path.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("spellfall_stats.db"));
        Self::open(&db_path)
    }

    /// Open a database at an explicit path; tests point this at a tempdir.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS placement_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                letter TEXT NOT NULL,
                was_correct BOOLEAN NOT NULL,
                time_to_place_ms INTEGER NOT NULL,
                word TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_placement_stats_letter ON placement_stats(letter)",
            [],
        )?;

        Ok(LetterStatsDb { conn })
    }

    /// Record one resolved placement attempt.
    pub fn record_attempt(&self, stat: &PlacementStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO placement_stats
            (letter, was_correct, time_to_place_ms, word, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stat.letter.to_string(),
                stat.was_correct,
                stat.time_to_place_ms as i64,
                stat.word,
                stat.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Miss rate (%) for one letter, across all attempts.
    pub fn miss_rate(&self, letter: char) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT COUNT(*) as total,
                   SUM(CASE WHEN was_correct THEN 0 ELSE 1 END) as misses
            FROM placement_stats
            WHERE letter = ?1
            "#,
        )?;
        let (total, misses): (i64, Option<i64>) =
            stmt.query_row(params![letter.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        if total == 0 {
            return Ok(0.0);
        }
        Ok(misses.unwrap_or(0) as f64 / total as f64 * 100.0)
    }

    /// Average spawn-to-placement time for one letter, correct attempts only.
    pub fn avg_time_to_place(&self, letter: char) -> Result<Option<f64>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT AVG(time_to_place_ms)
            FROM placement_stats
            WHERE letter = ?1 AND was_correct
            "#,
        )?;
        stmt.query_row(params![letter.to_string()], |row| row.get(0))
    }

    /// Aggregate view over every letter with at least one attempt.
    pub fn letter_summary(&self) -> Result<Vec<LetterSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT letter,
                   AVG(CASE WHEN was_correct THEN 0.0 ELSE 100.0 END) as miss_rate,
                   AVG(time_to_place_ms) as avg_time,
                   COUNT(*) as attempts
            FROM placement_stats
            GROUP BY letter
            ORDER BY letter
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let letter: String = row.get(0)?;
            Ok(LetterSummary {
                letter: letter.chars().next().unwrap_or(' '),
                miss_rate: row.get(1)?,
                avg_time_to_place_ms: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                attempts: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    pub fn clear_all_stats(&self) -> Result<()> {
        self.conn.execute("DELETE FROM placement_stats", [])?;
        Ok(())
    }
}
