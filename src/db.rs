use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Handle to the backing SQLite store.
///
/// All state lives here: the language reference table, the page tree and the
/// content blocks. Operations are grouped by concern — language CRUD and
/// resolution in `language.rs`, content blocks in `content.rs`, the page
/// tree in `page.rs`.
#[derive(Clone)]
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `database_path` and create tables.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, used by tests and previews.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS languages (
                id   TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pages (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                slug         TEXT NOT NULL UNIQUE,
                author_id    INTEGER NOT NULL,
                parent_id    INTEGER NULL REFERENCES pages(id),
                created_at   TEXT NOT NULL,
                published_at TEXT NULL,
                status       INTEGER NOT NULL DEFAULT 0,
                template     TEXT NULL
            );

            CREATE TABLE IF NOT EXISTS contents (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                language_id TEXT NOT NULL REFERENCES languages(id),
                page_id     INTEGER NOT NULL REFERENCES pages(id),
                kind        INTEGER NOT NULL,
                body        TEXT NOT NULL,
                UNIQUE(page_id, language_id, kind)
            );",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().expect("Failed to create database");

        // Schema should exist: tables are queryable and empty
        let languages = db.languages().expect("Should list languages");
        assert!(languages.is_empty());

        let published = db.published().expect("Should list published");
        assert!(published.is_empty());
    }

    #[test]
    fn test_database_reopening() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("pages.db");
        let path_str = db_path.to_str().unwrap();

        // Create database and add a language
        {
            let db = Database::new(path_str).expect("Failed to create database");
            db.add_language("en", "english").expect("Should add");
        }

        // Reopen database
        {
            let db = Database::new(path_str).expect("Failed to reopen database");
            let lang = db.language("en").expect("Language should persist");
            assert_eq!(lang.name, "english");
        }
    }

    #[test]
    fn test_invalid_database_path() {
        let result = Database::new("/non/existent/path/pages.db");
        assert!(result.is_err());
    }

    #[test]
    fn test_database_clone_shares_connection() {
        let db = Database::in_memory().expect("create");
        let db_clone = db.clone();

        db.add_language("en", "english").expect("add");

        let lang = db_clone.language("en").expect("Should see via clone");
        assert_eq!(lang.id, "en");
    }
}
