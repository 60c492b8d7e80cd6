//! Repository Pattern for report and note persistence
//!
//! Business logic (trend engine, CLI) talks to the [`ReportRepository`]
//! trait only, so the SQLite backend can be swapped for the in-memory mock
//! in tests.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   Business Logic (trends, commands)         │
//! └─────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │            ReportRepository                 │
//! └─────────────────────────────────────────────┘
//!              │                     │
//!              ▼                     ▼
//!     ┌─────────────────┐   ┌─────────────────┐
//!     │     SQLite      │   │      Mock       │
//!     └─────────────────┘   └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use shiftlog::storage::{ReportRepository, SqliteReportRepository};
//!
//! let repo = SqliteReportRepository::new("data/shiftlog.db")?;
//! repo.upsert_daily_record(day, &record)?;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::calendar::Period;
use crate::models::{BusinessDay, DailyRecord, NoteEntry, SalesAggregate, ServiceFigures, Submitter};

const DAY_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Repository Trait
// ============================================================================

/// Storage for daily records, notes, settings and owner destinations
pub trait ReportRepository: Send + Sync {
    /// Insert or overwrite the record for a business day
    fn upsert_daily_record(&self, day: BusinessDay, record: &DailyRecord) -> Result<()>;

    /// Record for a business day, if one was stored
    fn get_daily_record(&self, day: BusinessDay) -> Result<Option<DailyRecord>>;

    /// Records within a period, oldest first
    fn records_in_period(&self, period: &Period) -> Result<Vec<DailyRecord>>;

    /// Summed figures over a period
    fn sum_records(&self, period: &Period) -> Result<SalesAggregate> {
        let records = self.records_in_period(period)?;
        Ok(records.iter().collect())
    }

    /// Store a note; re-delivery of an identical note is ignored
    ///
    /// # Returns
    ///
    /// `true` when the note was new
    fn upsert_note(&self, day: BusinessDay, submitter: Submitter, text: &str) -> Result<bool>;

    /// `(day, raw_text)` of every note in a period, oldest first
    fn notes_in_period(&self, period: &Period) -> Result<Vec<(BusinessDay, String)>>;

    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Add a destination for owner summaries; `false` if already present
    fn add_owner_chat(&self, chat_id: i64) -> Result<bool>;

    /// Owner destinations in ascending order
    fn owner_chats(&self) -> Result<Vec<i64>>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of ReportRepository
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteReportRepository {
    conn: Mutex<Connection>,
}

impl SqliteReportRepository {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS daily_records (
                    day TEXT PRIMARY KEY,
                    total_sales REAL NOT NULL,
                    visa REAL NOT NULL,
                    cash REAL NOT NULL,
                    tips REAL NOT NULL,
                    lunch_sales REAL NOT NULL,
                    lunch_pax INTEGER NOT NULL,
                    lunch_walkins INTEGER NOT NULL,
                    lunch_noshows INTEGER NOT NULL,
                    dinner_sales REAL NOT NULL,
                    dinner_pax INTEGER NOT NULL,
                    dinner_walkins INTEGER NOT NULL,
                    dinner_noshows INTEGER NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS notes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    content_hash TEXT NOT NULL UNIQUE,
                    day TEXT NOT NULL,
                    source_chat INTEGER NOT NULL,
                    source_user INTEGER NOT NULL,
                    raw_text TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_notes_day ON notes(day);

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS owner_chats (
                    chat_id INTEGER PRIMARY KEY,
                    added_at TEXT NOT NULL
                );
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DailyRecord> {
        let day: String = row.get(0)?;
        let day = NaiveDate::parse_from_str(&day, DAY_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(DailyRecord {
            day,
            total_sales: row.get(1)?,
            visa: row.get(2)?,
            cash: row.get(3)?,
            tips: row.get(4)?,
            lunch: ServiceFigures {
                sales: row.get(5)?,
                pax: row.get(6)?,
                walkins: row.get(7)?,
                noshows: row.get(8)?,
            },
            dinner: ServiceFigures {
                sales: row.get(9)?,
                pax: row.get(10)?,
                walkins: row.get(11)?,
                noshows: row.get(12)?,
            },
        })
    }
}

const RECORD_COLUMNS: &str = "day, total_sales, visa, cash, tips, \
     lunch_sales, lunch_pax, lunch_walkins, lunch_noshows, \
     dinner_sales, dinner_pax, dinner_walkins, dinner_noshows";

fn day_key(day: BusinessDay) -> String {
    day.format(DAY_FORMAT).to_string()
}

impl ReportRepository for SqliteReportRepository {
    fn upsert_daily_record(&self, day: BusinessDay, record: &DailyRecord) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO daily_records ({RECORD_COLUMNS}, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                day_key(day),
                record.total_sales,
                record.visa,
                record.cash,
                record.tips,
                record.lunch.sales,
                record.lunch.pax,
                record.lunch.walkins,
                record.lunch.noshows,
                record.dinner.sales,
                record.dinner.pax,
                record.dinner.walkins,
                record.dinner.noshows,
                now,
            ],
        )
        .context("Failed to upsert daily record")?;

        tracing::debug!(day = %day, total_sales = record.total_sales, "Daily record stored");
        Ok(())
    }

    fn get_daily_record(&self, day: BusinessDay) -> Result<Option<DailyRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM daily_records WHERE day = ?1"),
                params![day_key(day)],
                Self::record_from_row,
            )
            .optional()
            .context("Failed to get daily record")?;

        Ok(record)
    }

    fn records_in_period(&self, period: &Period) -> Result<Vec<DailyRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM daily_records
                 WHERE day BETWEEN ?1 AND ?2 ORDER BY day"
            ))
            .context("Failed to prepare period query")?;

        let records = stmt
            .query_map(
                params![day_key(period.start()), day_key(period.end())],
                Self::record_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read daily records")?;

        Ok(records)
    }

    fn upsert_note(&self, day: BusinessDay, submitter: Submitter, text: &str) -> Result<bool> {
        let entry = NoteEntry::new(day, submitter, text);
        let conn = self.conn()?;

        let inserted = conn
            .execute(
                r#"
                    INSERT OR IGNORE INTO notes
                        (content_hash, day, source_chat, source_user, raw_text, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                params![
                    entry.content_hash(),
                    day_key(entry.day),
                    entry.source_chat,
                    entry.source_user,
                    entry.raw_text,
                    entry.created_at.to_rfc3339(),
                ],
            )
            .context("Failed to store note")?;

        Ok(inserted > 0)
    }

    fn notes_in_period(&self, period: &Period) -> Result<Vec<(BusinessDay, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT day, raw_text FROM notes WHERE day BETWEEN ?1 AND ?2 ORDER BY day, id")
            .context("Failed to prepare notes query")?;

        let rows = stmt
            .query_map(
                params![day_key(period.start()), day_key(period.end())],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read notes")?;

        rows.into_iter()
            .map(|(day, text)| -> Result<(BusinessDay, String)> {
                let day = NaiveDate::parse_from_str(&day, DAY_FORMAT)
                    .with_context(|| format!("Corrupt note day {day:?}"))?;
                Ok((day, text))
            })
            .collect()
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to load setting")?;

        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            params![key, value, now],
        )
        .context("Failed to save setting")?;

        Ok(())
    }

    fn add_owner_chat(&self, chat_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO owner_chats (chat_id, added_at) VALUES (?1, ?2)",
                params![chat_id, Utc::now().to_rfc3339()],
            )
            .context("Failed to add owner chat")?;

        Ok(inserted > 0)
    }

    fn owner_chats(&self) -> Result<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT chat_id FROM owner_chats ORDER BY chat_id")?;
        let chats = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .context("Failed to read owner chats")?;

        Ok(chats)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory mock implementation of ReportRepository
///
/// Useful for testing without database dependencies.
#[derive(Default)]
pub struct MockReportRepository {
    records: RwLock<BTreeMap<BusinessDay, DailyRecord>>,
    notes: RwLock<Vec<NoteEntry>>,
    note_hashes: RwLock<HashSet<String>>,
    settings: RwLock<HashMap<String, String>>,
    owners: RwLock<BTreeSet<i64>>,
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("Mock repository lock poisoned")
}

impl MockReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes
    pub fn note_count(&self) -> usize {
        self.notes.read().map(|n| n.len()).unwrap_or(0)
    }

    /// Number of stored daily records
    pub fn record_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl ReportRepository for MockReportRepository {
    fn upsert_daily_record(&self, day: BusinessDay, record: &DailyRecord) -> Result<()> {
        let mut stored = record.clone();
        stored.day = day;
        self.records.write().map_err(poisoned)?.insert(day, stored);
        Ok(())
    }

    fn get_daily_record(&self, day: BusinessDay) -> Result<Option<DailyRecord>> {
        Ok(self.records.read().map_err(poisoned)?.get(&day).cloned())
    }

    fn records_in_period(&self, period: &Period) -> Result<Vec<DailyRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .range(period.start()..=period.end())
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn upsert_note(&self, day: BusinessDay, submitter: Submitter, text: &str) -> Result<bool> {
        let entry = NoteEntry::new(day, submitter, text);
        if !self
            .note_hashes
            .write()
            .map_err(poisoned)?
            .insert(entry.content_hash())
        {
            return Ok(false);
        }
        self.notes.write().map_err(poisoned)?.push(entry);
        Ok(true)
    }

    fn notes_in_period(&self, period: &Period) -> Result<Vec<(BusinessDay, String)>> {
        let notes = self.notes.read().map_err(poisoned)?;
        let mut found: Vec<(BusinessDay, String)> = notes
            .iter()
            .filter(|n| period.contains(n.day))
            .map(|n| (n.day, n.raw_text.clone()))
            .collect();
        // stable: insertion order within a day
        found.sort_by_key(|(day, _)| *day);
        Ok(found)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.settings
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn add_owner_chat(&self, chat_id: i64) -> Result<bool> {
        Ok(self.owners.write().map_err(poisoned)?.insert(chat_id))
    }

    fn owner_chats(&self) -> Result<Vec<i64>> {
        Ok(self.owners.read().map_err(poisoned)?.iter().copied().collect())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared repository wrapper
pub type SharedReportRepository = Arc<dyn ReportRepository>;

/// Create a shared SQLite repository
pub fn create_sqlite_repository(path: impl AsRef<Path>) -> Result<SharedReportRepository> {
    Ok(Arc::new(SqliteReportRepository::new(path)?))
}

/// Create a shared mock repository
pub fn create_mock_repository() -> SharedReportRepository {
    Arc::new(MockReportRepository::new())
}

// ============================================================================
// Tests
// ============================================================================
