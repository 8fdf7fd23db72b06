//! @acp:module "Database"
//! @acp:summary "SQLite store for the versioned documentation graph"
//! @acp:domain storage
//! @acp:layer data
//!
//! Uses rusqlite with bundled SQLite, WAL mode and embedded migrations.

pub mod migrations;
pub mod models;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

pub use migrations::MigrationStatus;
pub use models::*;

use crate::error::Result;

/// @acp:summary "Connection to the documentation store"
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Self::connect(path)?;
        db.migrate()?;
        Ok(db)
    }

    /// Open without migrating.
    pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        Ok(Self { conn })
    }

    /// Open a migrated in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Apply pending migrations, returning how many ran.
    pub fn migrate(&self) -> Result<usize> {
        migrations::run_migrations(&self.conn)
    }

    pub fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        migrations::migration_status(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_and_migrates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apidoc.sqlite");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert!(db.migration_status().unwrap().iter().all(|s| s.applied_at.is_some()));

        let fk: i64 = db
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn connect_leaves_migrations_pending() {
        let dir = TempDir::new().unwrap();
        let db = Database::connect(dir.path().join("fresh.sqlite")).unwrap();
        assert!(db.migration_status().unwrap().iter().all(|s| s.applied_at.is_none()));
        assert_eq!(db.migrate().unwrap(), 3);
    }
}
