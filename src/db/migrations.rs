//! @acp:module "Migrations"
//! @acp:summary "Embedded, versioned schema migrations"
//! @acp:domain storage
//! @acp:layer data

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::Result;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Software and versions",
        sql: include_str!("migrations/001_software_versions.sql"),
    },
    Migration {
        version: 2,
        description: "Code elements, members, arguments and deprecations",
        sql: include_str!("migrations/002_code_elements.sql"),
    },
    Migration {
        version: 3,
        description: "Class aliases",
        sql: include_str!("migrations/003_class_aliases.sql"),
    },
];

/// One row of `migrate --status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: u32,
    pub description: &'static str,
    /// Unix timestamp, `None` while pending
    pub applied_at: Option<i64>,
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )?;
    Ok(())
}

/// Run all pending migrations on the given connection. Returns how many were applied.
pub(crate) fn run_migrations(conn: &Connection) -> Result<usize> {
    ensure_version_table(conn)?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                "Applying migration {}: {}",
                migration.version, migration.description
            );
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(migration.sql)?;
            tx.execute(
                "INSERT INTO schema_version (version, description, applied_at) VALUES (?1, ?2, ?3)",
                params![
                    migration.version,
                    migration.description,
                    chrono::Utc::now().timestamp()
                ],
            )?;
            tx.commit()?;
            applied += 1;
        }
    }

    Ok(applied)
}

/// Applied and pending migrations, in order.
pub(crate) fn migration_status(conn: &Connection) -> Result<Vec<MigrationStatus>> {
    ensure_version_table(conn)?;

    let mut status = Vec::with_capacity(MIGRATIONS.len());
    for migration in MIGRATIONS {
        let applied_at: Option<i64> = conn
            .query_row(
                "SELECT applied_at FROM schema_version WHERE version = ?1",
                [migration.version],
                |row| row.get(0),
            )
            .optional()?;
        status.push(MigrationStatus {
            version: migration.version,
            description: migration.description,
            applied_at,
        });
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 3);

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);

        for table in ["software", "versions", "classes", "arguments", "deprecations", "class_aliases"] {
            assert!(
                conn.prepare(&format!("SELECT * FROM {} LIMIT 0", table)).is_ok(),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 0);

        let status = migration_status(&conn).unwrap();
        assert_eq!(status.len(), 3);
        assert!(status.iter().all(|s| s.applied_at.is_some()));
    }

    #[test]
    fn status_before_migrating_is_pending() {
        let conn = Connection::open_in_memory().unwrap();
        let status = migration_status(&conn).unwrap();
        assert!(status.iter().all(|s| s.applied_at.is_none()));
    }
}
