// SQLite persistence for week-over-week ranking history.
//
// One database per league-year (`ranks_<year>.db`). A week is written once;
// re-running the same week leaves the stored rows untouched.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::season::TeamId;

/// One team's stored ranks for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub week: u32,
    pub team_id: TeamId,
    pub overall_rank: u32,
    pub power_rank: u32,
    pub tier: u32,
    pub power: f64,
}

/// SQLite-backed rank history for a single league-year.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

/// Database file for `year` inside `dir`.
pub fn history_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("ranks_{year}.db"))
}

impl HistoryStore {
    /// Open (or create) a history database at `path`. Pass `":memory:"` for
    /// an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open history database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS rank_history (
                week         INTEGER NOT NULL,
                team_id      INTEGER NOT NULL,
                overall_rank INTEGER NOT NULL,
                power_rank   INTEGER NOT NULL,
                tier         INTEGER NOT NULL,
                power        REAL NOT NULL,
                recorded_at  TEXT NOT NULL,
                PRIMARY KEY (week, team_id)
            );
            ",
        )
        .context("failed to create history schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the history database for `year` under `dir`, creating the
    /// directory if needed.
    pub fn open_for_year(dir: &Path, year: i32) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create history directory {}", dir.display()))?;
        let path = history_path(dir, year);
        Self::open(&path.to_string_lossy())
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("history mutex poisoned")
    }

    pub fn has_week(&self, week: u32) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM rank_history WHERE week = ?1",
                params![week],
                |row| row.get(0),
            )
            .context("failed to check for stored week")?;
        Ok(count > 0)
    }

    /// Store a week's ranks in one transaction. Returns `false` without
    /// writing anything when the week is already stored.
    pub fn record_week(&self, week: u32, records: &[HistoryRecord]) -> Result<bool> {
        if self.has_week(week)? {
            warn!("week {week} already stored in rank history, keeping existing rows");
            return Ok(false);
        }

        let recorded_at = chrono::Utc::now().to_rfc3339();
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin history transaction")?;
        for r in records {
            tx.execute(
                "INSERT OR IGNORE INTO rank_history
                    (week, team_id, overall_rank, power_rank, tier, power, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    week,
                    r.team_id,
                    r.overall_rank,
                    r.power_rank,
                    r.tier,
                    r.power,
                    recorded_at
                ],
            )
            .context("failed to insert history row")?;
        }
        tx.commit().context("failed to commit history")?;

        info!("stored {} rank history rows for week {week}", records.len());
        Ok(true)
    }

    /// Ranks stored for `week`, ordered by team id. Empty if none.
    pub fn load_week(&self, week: u32) -> Result<Vec<HistoryRecord>> {
        self.query(
            "SELECT week, team_id, overall_rank, power_rank, tier, power
             FROM rank_history WHERE week = ?1 ORDER BY team_id",
            Some(week),
        )
    }

    /// Every stored row, ordered by week then power rank.
    pub fn load_all(&self) -> Result<Vec<HistoryRecord>> {
        self.query(
            "SELECT week, team_id, overall_rank, power_rank, tier, power
             FROM rank_history ORDER BY week, power_rank",
            None,
        )
    }

    /// Weeks with stored ranks, ascending.
    pub fn weeks(&self) -> Result<Vec<u32>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT DISTINCT week FROM rank_history ORDER BY week")
            .context("failed to prepare weeks query")?;
        let weeks = stmt
            .query_map([], |row| row.get(0))
            .context("failed to query stored weeks")?
            .collect::<std::result::Result<Vec<u32>, _>>()
            .context("failed to map week rows")?;
        Ok(weeks)
    }

    fn query(&self, sql: &str, week: Option<u32>) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql).context("failed to prepare history query")?;
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(HistoryRecord {
                week: row.get(0)?,
                team_id: row.get(1)?,
                overall_rank: row.get(2)?,
                power_rank: row.get(3)?,
                tier: row.get(4)?,
                power: row.get(5)?,
            })
        };
        let rows = match week {
            Some(w) => stmt.query_map(params![w], map_row),
            None => stmt.query_map([], map_row),
        }
        .context("failed to query rank history")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map history rows")?;
        Ok(rows)
    }

    /// Write every stored row to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        let rows = self.load_all()?;
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for row in &rows {
            writer.serialize(row).context("failed to write history row")?;
        }
        writer.flush().context("failed to flush history CSV")?;
        Ok(rows.len())
    }
}
