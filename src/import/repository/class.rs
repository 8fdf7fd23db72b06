//! @acp:module "Class Repository"
//! @acp:summary "Reconciles class nodes and their parent/implements links"
//! @acp:domain import
//! @acp:layer data

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::interface::resolve_interfaces;
use super::support::{ensure_owner, qualified_name, stored_namespace, sync_deprecation};
use super::Repository;
use crate::db::{ClassRecord, Deprecatable};
use crate::error::Result;
use crate::ir::ClassNode;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassRepository;

impl ClassRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<ClassRecord> {
        let sql = format!("SELECT {} FROM classes WHERE id = ?1", ClassRecord::COLUMNS);
        Ok(conn.query_row(&sql, [id], ClassRecord::from_row)?)
    }

    /// Look a class up by qualified name within a version.
    pub fn find_by_name(&self, conn: &Connection, version_id: i64, name: &str) -> Result<Option<ClassRecord>> {
        let sql = format!(
            "SELECT {} FROM classes WHERE version_id = ?1 AND name = ?2",
            ClassRecord::COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![version_id, name.trim_start_matches('\\')], ClassRecord::from_row)
            .optional()?)
    }

    /// @acp:summary "Resolve the parent class and implemented interfaces of a persisted class"
    ///
    /// Names that do not match anything in the same version leave the link
    /// unset. The implements set is replaced, not extended.
    pub fn link(&self, conn: &Connection, record: &ClassRecord, node: &ClassNode) -> Result<()> {
        let parent_id = if node.extends.is_empty() {
            None
        } else {
            match self.find_by_name(conn, record.version_id, &node.extends)? {
                Some(parent) if parent.id != record.id => Some(parent.id),
                _ => {
                    debug!("Parent {} of {} is not in this version", node.extends, record.name);
                    None
                }
            }
        };

        conn.execute(
            "UPDATE classes SET parent_id = ?1 WHERE id = ?2",
            params![parent_id, record.id],
        )?;

        let interfaces = resolve_interfaces(conn, record.version_id, &node.implements, &record.name)?;
        conn.execute("DELETE FROM class_interface WHERE class_id = ?1", [record.id])?;
        for interface_id in interfaces {
            conn.execute(
                "INSERT OR IGNORE INTO class_interface (class_id, interface_id) VALUES (?1, ?2)",
                params![record.id, interface_id],
            )?;
        }
        Ok(())
    }
}

impl Repository for ClassRepository {
    type Node = ClassNode;
    type Record = ClassRecord;

    fn reconcile(&self, conn: &Connection, node: &ClassNode, version_id: i64) -> Result<ClassRecord> {
        ensure_owner(conn, "versions", version_id, "class", &node.name)?;

        let namespace = stored_namespace(&node.namespace);
        let name = qualified_name(namespace, &node.name);

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM classes
                 WHERE version_id = ?1 AND IFNULL(namespace, '') = IFNULL(?2, '') AND shortname = ?3",
                params![version_id, namespace, node.name],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE classes SET name = ?1, summary = ?2, description = ?3, final = ?4, abstract = ?5
                     WHERE id = ?6",
                    params![
                        name,
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#final,
                        node.r#abstract,
                        id
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO classes (name, namespace, shortname, summary, description, final, abstract, version_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        name,
                        namespace,
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#final,
                        node.r#abstract,
                        version_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::Class(id), &node.docblock)?;
        self.find(conn, id)
    }
}
