//! @acp:module "Class Alias Repository"
//! @acp:summary "Reconciles classmap aliases within a version"
//! @acp:domain import
//! @acp:layer data

use rusqlite::{params, Connection, OptionalExtension};

use super::support::ensure_owner;
use super::Repository;
use crate::db::ClassAliasRecord;
use crate::error::Result;
use crate::ir::AliasNode;

/// Natural key: `(old_class, new_class)` inside the version.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassAliasRepository;

impl ClassAliasRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<ClassAliasRecord> {
        let sql = format!("SELECT {} FROM class_aliases WHERE id = ?1", ClassAliasRecord::COLUMNS);
        Ok(conn.query_row(&sql, [id], ClassAliasRecord::from_row)?)
    }
}

impl Repository for ClassAliasRepository {
    type Node = AliasNode;
    type Record = ClassAliasRecord;

    fn reconcile(&self, conn: &Connection, node: &AliasNode, version_id: i64) -> Result<ClassAliasRecord> {
        ensure_owner(conn, "versions", version_id, "class alias", &node.alias)?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM class_aliases WHERE version_id = ?1 AND old_class = ?2 AND new_class = ?3",
                params![version_id, node.alias, node.original],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE class_aliases SET deprecation_version = ?1 WHERE id = ?2",
                    params![node.version, id],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO class_aliases (old_class, new_class, deprecation_version, version_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![node.alias, node.original, node.version, version_id],
                )?;
                conn.last_insert_rowid()
            }
        };

        self.find(conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::import::repository::fixtures::seed_version;

    #[test]
    fn test_alias_version_updates_in_place() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "3.9.8");
        let repository = ClassAliasRepository::new();

        let mut node = AliasNode {
            alias: "JTable".into(),
            original: "Joomla\\CMS\\Table\\Table".into(),
            version: "4.0".into(),
        };
        let first = repository.reconcile(db.conn(), &node, version_id).unwrap();

        node.version = "5.0".into();
        let second = repository.reconcile(db.conn(), &node, version_id).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.deprecation_version, "5.0");
        assert_eq!(second.old_class, "JTable");
    }
}
