//! @acp:module "Function Repository"
//! @acp:summary "Reconciles top-level functions with their arguments and deprecation"
//! @acp:domain import
//! @acp:layer data

use rusqlite::{params, Connection, OptionalExtension};

use super::support::{
    ensure_owner, qualified_name, return_info, stored_namespace, sync_arguments, sync_deprecation, to_json,
};
use super::Repository;
use crate::db::{Argumented, Deprecatable, FunctionRecord};
use crate::error::Result;
use crate::ir::FunctionNode;

#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionRepository;

impl FunctionRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<FunctionRecord> {
        let sql = format!("SELECT {} FROM functions WHERE id = ?1", FunctionRecord::COLUMNS);
        Ok(conn.query_row(&sql, [id], FunctionRecord::from_row)?)
    }
}

impl Repository for FunctionRepository {
    type Node = FunctionNode;
    type Record = FunctionRecord;

    fn reconcile(&self, conn: &Connection, node: &FunctionNode, version_id: i64) -> Result<FunctionRecord> {
        ensure_owner(conn, "versions", version_id, "function", &node.name)?;

        let namespace = stored_namespace(&node.namespace);
        let name = qualified_name(namespace, &node.name);
        let (return_types, return_description) = return_info(&node.docblock);
        let return_types = to_json(&return_types)?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM functions
                 WHERE version_id = ?1 AND IFNULL(namespace, '') = IFNULL(?2, '') AND shortname = ?3",
                params![version_id, namespace, node.name],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE functions SET name = ?1, summary = ?2, description = ?3, return_types = ?4,
                     return_description = ?5 WHERE id = ?6",
                    params![
                        name,
                        node.docblock.summary,
                        node.docblock.description,
                        return_types,
                        return_description,
                        id
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO functions (name, namespace, shortname, summary, description, return_types,
                     return_description, version_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        name,
                        namespace,
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        return_types,
                        return_description,
                        version_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::Function(id), &node.docblock)?;
        sync_arguments(conn, Argumented::Function(id), &node.arguments, &node.docblock)?;
        self.find(conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ArgumentRecord, Database};
    use crate::import::repository::fixtures::seed_version;
    use crate::ir::{ArgumentNode, DocBlock, Tag};
    use pretty_assertions::assert_eq;

    fn arguments(db: &Database, function_id: i64) -> Vec<ArgumentRecord> {
        let sql = format!(
            "SELECT {} FROM arguments WHERE argumented_type = 'function' AND argumented_id = ?1 ORDER BY id",
            ArgumentRecord::COLUMNS
        );
        db.conn()
            .prepare(&sql)
            .unwrap()
            .query_map([function_id], ArgumentRecord::from_row)
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_param_tag_enriches_argument() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "3.9.8");

        let mut param = Tag::new("param", "The foo value.");
        param.variable = Some("foo".into());
        param.types = Some(vec!["string".into()]);

        let node = FunctionNode {
            name: "jimport".into(),
            namespace: "global".into(),
            arguments: vec![ArgumentNode {
                name: "foo".into(),
                default: Some("'bar'".into()),
                r#type: "int".into(),
            }],
            docblock: DocBlock {
                tags: vec![param],
                ..Default::default()
            },
            ..Default::default()
        };

        let repository = FunctionRepository::new();
        let record = repository.reconcile(db.conn(), &node, version_id).unwrap();
        assert_eq!(record.name, "jimport");
        assert_eq!(record.namespace, None);

        let args = arguments(&db, record.id);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].types, vec!["string".to_string(), "int".to_string()]);
        assert_eq!(args[0].description, "The foo value.");
        assert_eq!(args[0].default_value.as_deref(), Some("'bar'"));
        assert_eq!(args[0].owner(), Some(Argumented::Function(record.id)));

        let again = repository.reconcile(db.conn(), &node, version_id).unwrap();
        assert_eq!(again.id, record.id);
        assert_eq!(arguments(&db, record.id), args);
    }

    #[test]
    fn test_namespaced_function_name() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "framework", "2.0.0");
        let node = FunctionNode {
            name: "helper".into(),
            namespace: "Joomla\\Utilities".into(),
            ..Default::default()
        };
        let record = FunctionRepository::new()
            .reconcile(db.conn(), &node, version_id)
            .unwrap();
        assert_eq!(record.name, "Joomla\\Utilities\\helper");
        assert_eq!(record.shortname, "helper");
    }
}
