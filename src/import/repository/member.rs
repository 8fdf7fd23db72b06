//! @acp:module "Member Repositories"
//! @acp:summary "Reconciles methods and properties within their owning class or interface"
//! @acp:domain import
//! @acp:layer data
//!
//! A member's natural key is its name inside the owner. Reconciling against
//! an owner id that is not in the store is an ordering bug and fails with
//! `OwnerAssociation` before anything is written.

use rusqlite::{params, Connection, OptionalExtension};

use super::support::{ensure_owner, return_info, sync_arguments, sync_deprecation, to_json};
use super::Repository;
use crate::db::{
    Argumented, ClassMethodRecord, ClassPropertyRecord, Deprecatable, InterfaceMethodRecord,
};
use crate::error::Result;
use crate::ir::{MethodNode, PropertyNode};

fn existing_member(conn: &Connection, table: &str, parent_id: i64, name: &str) -> Result<Option<i64>> {
    let sql = format!("SELECT id FROM {} WHERE parent_id = ?1 AND name = ?2", table);
    Ok(conn
        .query_row(&sql, params![parent_id, name], |row| row.get(0))
        .optional()?)
}

/// @acp:summary "Repository for methods declared on classes"
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassMethodRepository;

impl ClassMethodRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<ClassMethodRecord> {
        let sql = format!("SELECT {} FROM class_methods WHERE id = ?1", ClassMethodRecord::COLUMNS);
        Ok(conn.query_row(&sql, [id], ClassMethodRecord::from_row)?)
    }
}

impl Repository for ClassMethodRepository {
    type Node = MethodNode;
    type Record = ClassMethodRecord;

    fn reconcile(&self, conn: &Connection, node: &MethodNode, class_id: i64) -> Result<ClassMethodRecord> {
        ensure_owner(conn, "classes", class_id, "class method", &node.name)?;

        let (return_types, return_description) = return_info(&node.docblock);
        let return_types = to_json(&return_types)?;
        let is_final = node.r#final.unwrap_or(false);
        let is_abstract = node.r#abstract.unwrap_or(false);

        let id = match existing_member(conn, "class_methods", class_id, &node.name)? {
            Some(id) => {
                conn.execute(
                    "UPDATE class_methods SET summary = ?1, description = ?2, final = ?3, abstract = ?4,
                     static = ?5, visibility = ?6, return_types = ?7, return_description = ?8
                     WHERE id = ?9",
                    params![
                        node.docblock.summary,
                        node.docblock.description,
                        is_final,
                        is_abstract,
                        node.r#static,
                        node.visibility,
                        return_types,
                        return_description,
                        id
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO class_methods (name, summary, description, final, abstract, static,
                     visibility, return_types, return_description, parent_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        is_final,
                        is_abstract,
                        node.r#static,
                        node.visibility,
                        return_types,
                        return_description,
                        class_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::ClassMethod(id), &node.docblock)?;
        sync_arguments(conn, Argumented::ClassMethod(id), &node.arguments, &node.docblock)?;
        self.find(conn, id)
    }
}

/// @acp:summary "Repository for methods declared on interfaces"
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceMethodRepository;

impl InterfaceMethodRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<InterfaceMethodRecord> {
        let sql = format!(
            "SELECT {} FROM interface_methods WHERE id = ?1",
            InterfaceMethodRecord::COLUMNS
        );
        Ok(conn.query_row(&sql, [id], InterfaceMethodRecord::from_row)?)
    }
}

impl Repository for InterfaceMethodRepository {
    type Node = MethodNode;
    type Record = InterfaceMethodRecord;

    fn reconcile(
        &self,
        conn: &Connection,
        node: &MethodNode,
        interface_id: i64,
    ) -> Result<InterfaceMethodRecord> {
        ensure_owner(conn, "interfaces", interface_id, "interface method", &node.name)?;

        let (return_types, return_description) = return_info(&node.docblock);
        let return_types = to_json(&return_types)?;

        let id = match existing_member(conn, "interface_methods", interface_id, &node.name)? {
            Some(id) => {
                conn.execute(
                    "UPDATE interface_methods SET summary = ?1, description = ?2, static = ?3,
                     visibility = ?4, return_types = ?5, return_description = ?6
                     WHERE id = ?7",
                    params![
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#static,
                        node.visibility,
                        return_types,
                        return_description,
                        id
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO interface_methods (name, summary, description, static, visibility,
                     return_types, return_description, parent_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#static,
                        node.visibility,
                        return_types,
                        return_description,
                        interface_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::InterfaceMethod(id), &node.docblock)?;
        sync_arguments(conn, Argumented::InterfaceMethod(id), &node.arguments, &node.docblock)?;
        self.find(conn, id)
    }
}

/// @acp:summary "Repository for class properties"
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassPropertyRepository;

impl ClassPropertyRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn find(&self, conn: &Connection, id: i64) -> Result<ClassPropertyRecord> {
        let sql = format!(
            "SELECT {} FROM class_properties WHERE id = ?1",
            ClassPropertyRecord::COLUMNS
        );
        Ok(conn.query_row(&sql, [id], ClassPropertyRecord::from_row)?)
    }
}

impl Repository for ClassPropertyRepository {
    type Node = PropertyNode;
    type Record = ClassPropertyRecord;

    fn reconcile(&self, conn: &Connection, node: &PropertyNode, class_id: i64) -> Result<ClassPropertyRecord> {
        ensure_owner(conn, "classes", class_id, "class property", &node.name)?;

        let id = match existing_member(conn, "class_properties", class_id, &node.name)? {
            Some(id) => {
                conn.execute(
                    "UPDATE class_properties SET summary = ?1, description = ?2, static = ?3, visibility = ?4
                     WHERE id = ?5",
                    params![
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#static,
                        node.visibility,
                        id
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO class_properties (name, summary, description, static, visibility, parent_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        node.name,
                        node.docblock.summary,
                        node.docblock.description,
                        node.r#static,
                        node.visibility,
                        class_id
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        sync_deprecation(conn, Deprecatable::ClassProperty(id), &node.docblock)?;
        self.find(conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::ApidocError;
    use crate::import::repository::fixtures::{seed_class, seed_version};
    use crate::ir::{ArgumentNode, DocBlock, Tag};
    use pretty_assertions::assert_eq;

    fn method(name: &str, docblock: DocBlock, arguments: Vec<ArgumentNode>) -> MethodNode {
        MethodNode {
            name: name.into(),
            visibility: "public".into(),
            r#final: Some(false),
            r#abstract: Some(false),
            arguments,
            docblock,
            ..Default::default()
        }
    }

    fn deprecated(version: &str, description: &str) -> Tag {
        let mut tag = Tag::new("deprecated", description);
        tag.version = Some(version.into());
        tag
    }

    fn deprecation_rows(db: &Database) -> Vec<(String, Option<String>)> {
        let mut stmt = db
            .conn()
            .prepare("SELECT description, removal_version FROM deprecations ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_unknown_owner_is_fatal() {
        let db = Database::open_in_memory().unwrap();
        let err = ClassMethodRepository::new()
            .reconcile(db.conn(), &method("load", DocBlock::default(), vec![]), 42)
            .unwrap_err();
        assert!(matches!(
            err,
            ApidocError::OwnerAssociation { owner: "classes", owner_id: 42, .. }
        ));

        let err = InterfaceMethodRepository::new()
            .reconcile(db.conn(), &method("count", DocBlock::default(), vec![]), 7)
            .unwrap_err();
        assert!(matches!(err, ApidocError::OwnerAssociation { owner: "interfaces", .. }));
    }

    #[test]
    fn test_method_reconcile_updates_in_place() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "3.9.8");
        let class_id = seed_class(&db, version_id, "Joomla\\CMS", "Table");
        let repository = ClassMethodRepository::new();

        let mut ret = Tag::new("return", "True on success.");
        ret.types = Some(vec!["boolean".into()]);
        let docblock = DocBlock {
            summary: "Load a row.".into(),
            tags: vec![ret, deprecated("5.0", "Use find().")],
            ..Default::default()
        };
        let first = repository
            .reconcile(db.conn(), &method("load", docblock, vec![]), class_id)
            .unwrap();
        assert_eq!(first.return_types, vec!["boolean".to_string()]);
        assert_eq!(first.return_description, "True on success.");

        let docblock = DocBlock {
            summary: "Load a row by key.".into(),
            tags: vec![deprecated("6.0", "Use find() instead.")],
            ..Default::default()
        };
        let second = repository
            .reconcile(db.conn(), &method("load", docblock, vec![]), class_id)
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.summary, "Load a row by key.");
        assert!(second.return_types.is_empty());
        assert_eq!(second.return_description, "");
        assert_eq!(
            deprecation_rows(&db),
            vec![("Use find() instead.".to_string(), Some("6.0".to_string()))]
        );

        repository
            .reconcile(db.conn(), &method("load", DocBlock::default(), vec![]), class_id)
            .unwrap();
        assert!(deprecation_rows(&db).is_empty());
    }

    #[test]
    fn test_arguments_follow_declaration() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "3.9.8");
        let class_id = seed_class(&db, version_id, "global", "JTable");
        let repository = ClassMethodRepository::new();

        let arg = |name: &str| ArgumentNode {
            name: name.into(),
            default: Some("null".into()),
            r#type: String::new(),
        };

        let record = repository
            .reconcile(
                db.conn(),
                &method("bind", DocBlock::default(), vec![arg("src"), arg("ignore")]),
                class_id,
            )
            .unwrap();
        repository
            .reconcile(db.conn(), &method("bind", DocBlock::default(), vec![arg("src")]), class_id)
            .unwrap();

        let names: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM arguments WHERE argumented_type = 'class_method' AND argumented_id = ?1")
            .unwrap()
            .query_map([record.id], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(names, vec!["src".to_string()]);
    }

    #[test]
    fn test_property_reconcile() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "3.9.8");
        let class_id = seed_class(&db, version_id, "Joomla\\CMS", "Table");

        let node = PropertyNode {
            name: "_tbl".into(),
            r#static: false,
            visibility: "protected".into(),
            docblock: DocBlock {
                summary: "Name of the table.".into(),
                tags: vec![deprecated("4.0", "")],
                ..Default::default()
            },
        };
        let record = ClassPropertyRepository::new()
            .reconcile(db.conn(), &node, class_id)
            .unwrap();
        assert_eq!(record.visibility, "protected");
        assert_eq!(record.summary, "Name of the table.");
        assert_eq!(deprecation_rows(&db), vec![(String::new(), Some("4.0".to_string()))]);
    }
}
