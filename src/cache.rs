use crate::error::{GhmapError, Result};
use crate::model::{DateRange, Event, EventKind, SCHEMA_VERSION};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, ToSql};
use std::path::Path;

/// On-disk store of normalized events, one snapshot per username. A snapshot
/// is replaced wholesale on refresh; partial updates are never written.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_path: Option<P>) -> Result<Self> {
        let cache_dir = match cache_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => std::env::current_dir()?.join(".ghmap"),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS events (
                username TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                language TEXT NOT NULL,
                kind TEXT NOT NULL,
                size INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS syncs (
                username TEXT PRIMARY KEY,
                fetched_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_username_timestamp
                ON events(username, timestamp);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(GhmapError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    /// When the user was last synced, or `None` if never.
    pub fn last_synced(&self, username: &str) -> Result<Option<DateTime<Utc>>> {
        let result = self.conn.query_row(
            "SELECT fetched_at FROM syncs WHERE username = ?",
            params![username],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(secs) => {
                let fetched_at = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                    GhmapError::Cache(format!("Invalid sync timestamp: {secs}"))
                })?;
                Ok(Some(fetched_at))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Cached events for `username` within `range`, or `None` if the user has
    /// never been synced. An empty vector means a synced user with no events.
    pub fn get_events(&self, username: &str, range: &DateRange) -> Result<Option<Vec<Event>>> {
        if self.last_synced(username)?.is_none() {
            return Ok(None);
        }

        let mut query = String::from(
            "SELECT timestamp, language, kind, size FROM events WHERE username = ?",
        );
        let mut to_bind: Vec<Box<dyn ToSql>> = vec![Box::new(username.to_string())];

        if let Some(since) = &range.since {
            query.push_str(" AND timestamp >= ?");
            to_bind.push(Box::new(since.timestamp()));
        }
        if let Some(until) = &range.until {
            query.push_str(" AND timestamp <= ?");
            to_bind.push(Box::new(until.timestamp()));
        }
        query.push_str(" ORDER BY timestamp");

        let mut stmt = self.conn.prepare(&query)?;
        let bind_refs: Vec<&dyn ToSql> = to_bind.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(bind_refs.as_slice(), |row| {
            let secs: i64 = row.get(0)?;
            let timestamp = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "timestamp".to_string(),
                    rusqlite::types::Type::Integer,
                )
            })?;

            let kind_str: String = row.get(2)?;
            let kind = EventKind::parse(&kind_str).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "kind".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            Ok(Event {
                timestamp,
                language: row.get(1)?,
                kind,
                size: row.get::<_, i64>(3)? as u64,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(Some(events))
    }

    /// Replace the stored snapshot for `username` with `events` and stamp the
    /// sync time.
    pub fn store_events(&mut self, username: &str, events: &[Event]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM events WHERE username = ?", params![username])?;

        let mut insert_stmt = tx.prepare(
            "INSERT INTO events (username, timestamp, language, kind, size)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        for event in events {
            insert_stmt.execute(params![
                username,
                event.timestamp.timestamp(),
                event.language,
                event.kind.as_str(),
                event.size as i64,
            ])?;
        }
        drop(insert_stmt);

        tx.execute(
            "INSERT OR REPLACE INTO syncs (username, fetched_at) VALUES (?, ?)",
            params![username, Utc::now().timestamp()],
        )?;

        tx.commit()?;
        Ok(())
    }
}
