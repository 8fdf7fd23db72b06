//! @acp:module "Interface Repository"
//! @acp:summary "Reconciles interface nodes and their parent set"
//! @acp:domain import
//! @acp:layer data

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::support::{ensure_owner, qualified_name, stored_namespace, sync_deprecation};
use super::Repository;
use crate::db::{Deprecatable, InterfaceRecord};
use crate::error::Result;
use crate::ir::InterfaceNode;

#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceRepository;

impl InterfaceRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<InterfaceRecord> {
        let sql = format!("SELECT {} FROM interfaces WHERE id = ?1", InterfaceRecord::COLUMNS);
        Ok(conn.query_row(&sql, [id], InterfaceRecord::from_row)?)
    }

    pub fn find_by_name(
        &self,
        conn: &Connection,
        version_id: i64,
        name: &str,
    ) -> Result<Option<InterfaceRecord>> {
        let sql = format!(
            "SELECT {} FROM interfaces WHERE version_id = ?1 AND name = ?2",
            InterfaceRecord::COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![version_id, name.trim_start_matches('\\')], InterfaceRecord::from_row)
            .optional()?)
    }

    /// Qualified names of the interfaces `id` extends
    pub fn parents(&self, conn: &Connection, id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT i.name FROM interface_parent p JOIN interfaces i ON i.id = p.parent_id
             WHERE p.interface_id = ?1 ORDER BY i.name",
        )?;
        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Qualified names of the interfaces extending `id`
    pub fn children(&self, conn: &Connection, id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT i.name FROM interface_parent p JOIN interfaces i ON i.id = p.interface_id
             WHERE p.parent_id = ?1 ORDER BY i.name",
        )?;
        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// @acp:summary "Replace the parent set of a persisted interface with the resolved `extends` names"
    pub fn link(&self, conn: &Connection, record: &InterfaceRecord, node: &InterfaceNode) -> Result<()> {
        let parents: Vec<i64> = resolve_interfaces(conn, record.version_id, &node.extends, &record.name)?
            .into_iter()
            .filter(|id| *id != record.id)
            .collect();

        conn.execute("DELETE FROM interface_parent WHERE interface_id = ?1", [record.id])?;
        for parent_id in parents {
            conn.execute(
                "INSERT OR IGNORE INTO interface_parent (interface_id, parent_id) VALUES (?1, ?2)",
                params![record.id, parent_id],
            )?;
        }
        Ok(())
    }
}

/// Ids of the named interfaces that exist in `version_id`; unknown names are dropped.
pub(crate) fn resolve_interfaces(
    conn: &Connection,
    version_id: i64,
    names: &[String],
    referrer: &str,
) -> Result<Vec<i64>> {
    let repository = InterfaceRepository::new();
    let mut ids = Vec::with_capacity(names.len());

    for name in names {
        match repository.find_by_name(conn, version_id, name)? {
            Some(interface) => ids.push(interface.id),
            None => debug!("Interface {} referenced by {} is not in this version", name, referrer),
        }
    }
    Ok(ids)
}

impl Repository for InterfaceRepository {
    type Node = InterfaceNode;
    type Record = InterfaceRecord;

    fn reconcile(&self, conn: &Connection, node: &InterfaceNode, version_id: i64) -> Result<InterfaceRecord> {
        ensure_owner(conn, "versions", version_id, "interface", &node.name)?;

        let namespace = stored_namespace(&node.namespace);
        let name = qualified_name(namespace, &node.name);

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM interfaces
                 WHERE version_id = ?1 AND IFNULL(namespace, '') = IFNULL(?2, '') AND shortname = ?3",
                params![version_id, namespace, node.name],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE interfaces SET name = ?1, summary = ?2, description = ?3 WHERE id = ?4",
                    params![name, node.docblock.summary, node.docblock.description, id],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO interfaces (name, namespace, shortname, summary, description, version_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        name,
                        namespace,
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        version_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::Interface(id), &node.docblock)?;
        self.find(conn, id)
    }
}
