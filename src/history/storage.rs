//! Transcription history storage using SQLite.
//!
//! Persists every completed transcription with its timestamp and word count,
//! plus a running word total updated in the same transaction as each insert.
//! A store that cannot be read is reset to empty rather than failing the
//! application.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use super::word_count;

/// A single persisted transcription.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Unique, monotonically increasing identifier
    pub id: i64,
    /// The transcribed text content
    pub text: String,
    /// Number of whitespace-delimited words in `text`
    pub word_count: usize,
    /// When this transcription was created
    pub created_at: DateTime<Local>,
}

/// Manages the transcription history database.
pub struct HistoryStore {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl HistoryStore {
    /// Creates a history store for the given data directory.
    ///
    /// # Errors
    /// - If the data directory cannot be created
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let database_path = data_dir.join("history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes the database connection, recovering from corruption.
    ///
    /// If the persisted file cannot be opened or initialized, it is removed
    /// and the store restarts empty with a zero total.
    fn connection(&mut self) -> Result<&mut Connection> {
        if self.connection.is_none() {
            let connection = match open_and_init(&self.database_path) {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(
                        "History database unreadable ({e}), resetting {} to empty",
                        self.database_path.display()
                    );
                    let _ = std::fs::remove_file(&self.database_path);
                    open_and_init(&self.database_path)?
                }
            };

            self.connection = Some(connection);
        }

        Ok(self.connection.as_mut().unwrap())
    }

    /// Appends a completed transcription.
    ///
    /// Computes the word count, inserts the entry, and adds the count to the
    /// running word total, all in one transaction, so the entry and the
    /// total can never diverge.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If the transaction fails
    pub fn append(&mut self, text: &str) -> Result<HistoryEntry> {
        let words = word_count(text);
        let now = Local::now();
        let timestamp = now.to_rfc3339();

        let connection = self.connection()?;
        let tx = connection.transaction()?;

        tx.execute(
            "INSERT INTO transcriptions (text, word_count, created_at) VALUES (?1, ?2, ?3)",
            params![text, words as i64, timestamp],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE meta SET value = value + ?1 WHERE key = 'word_total'",
            params![words as i64],
        )?;

        tx.commit()?;

        tracing::debug!("Transcription saved to history ({} words)", words);
        Ok(HistoryEntry {
            id,
            text: text.to_string(),
            word_count: words,
            created_at: now,
        })
    }

    /// Retrieves all transcriptions, most recent first.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution or timestamp parsing fails
    pub fn entries(&mut self) -> Result<Vec<HistoryEntry>> {
        let connection = self.connection()?;

        let mut statement = connection.prepare(
            "SELECT id, text, word_count, created_at FROM transcriptions ORDER BY id DESC",
        )?;

        let entries = statement
            .query_map([], |row| {
                let id = row.get::<_, i64>(0)?;
                let text = row.get::<_, String>(1)?;
                let words = row.get::<_, i64>(2)?;
                let timestamp_str = row.get::<_, String>(3)?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(HistoryEntry {
                    id,
                    text,
                    word_count: words as usize,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Returns the running word total across all recorded transcriptions.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If the query fails
    pub fn word_total(&mut self) -> Result<u64> {
        let connection = self.connection()?;

        let total: i64 = connection.query_row(
            "SELECT value FROM meta WHERE key = 'word_total'",
            [],
            |row| row.get(0),
        )?;

        Ok(total.max(0) as u64)
    }
}

/// Opens the database file and ensures the schema exists.
fn open_and_init(path: &Path) -> Result<Connection> {
    let connection = Connection::open(path)?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS transcriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            word_count INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
        [],
    )?;

    connection.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('word_total', 0)",
        [],
    )?;

    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path()).unwrap();

        let entry = store.append("the quick brown fox").unwrap();
        assert_eq!(entry.word_count, 4);

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "the quick brown fox");
        assert_eq!(entries[0].word_count, 4);
        assert_eq!(store.word_total().unwrap(), 4);
    }

    #[test]
    fn test_entries_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path()).unwrap();

        store.append("first").unwrap();
        store.append("second entry").unwrap();
        store.append("third one here").unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "third one here");
        assert_eq!(entries[2].text, "first");
        for pair in entries.windows(2) {
            assert!(pair[0].id > pair[1].id);
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn test_word_total_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path()).unwrap();

        assert_eq!(store.word_total().unwrap(), 0);
        store.append("one two three").unwrap();
        store.append("  a   b ").unwrap();
        store.append("").unwrap();

        let entries = store.entries().unwrap();
        let sum: usize = entries.iter().map(|e| e.word_count).sum();
        assert_eq!(sum, 5);
        assert_eq!(store.word_total().unwrap(), 5);
    }

    #[test]
    fn test_total_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = HistoryStore::open(dir.path()).unwrap();
            store.append("persisted words here").unwrap();
        }

        let mut store = HistoryStore::open(dir.path()).unwrap();
        assert_eq!(store.word_total().unwrap(), 3);
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_database_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("history.db"), b"this is not a database").unwrap();

        let mut store = HistoryStore::open(dir.path()).unwrap();
        assert_eq!(store.entries().unwrap().len(), 0);
        assert_eq!(store.word_total().unwrap(), 0);

        store.append("works after reset").unwrap();
        assert_eq!(store.word_total().unwrap(), 3);
    }
}
