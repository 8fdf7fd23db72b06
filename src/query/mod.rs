//! @acp:module "Query"
//! @acp:summary "Read-side queries behind the browsable version dashboard"
//! @acp:domain query
//! @acp:layer service
//!
//! Namespaces are stored without leading separators; the global namespace is
//! NULL and never appears in namespace listings.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};

use crate::db::{ClassRecord, FunctionRecord, Version};
use crate::error::Result;

/// @acp:summary "Headline numbers for one version"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub class_count: usize,
    pub interface_count: usize,
    pub function_count: usize,
    pub deprecation_count: usize,
    pub namespaces: Vec<String>,
}

/// @acp:summary "Queries scoped to one version"
pub struct VersionQuery<'c> {
    conn: &'c Connection,
    version_id: i64,
}

impl<'c> VersionQuery<'c> {
    pub fn new(conn: &'c Connection, version: &Version) -> Self {
        Self::for_id(conn, version.id)
    }

    pub fn for_id(conn: &'c Connection, version_id: i64) -> Self {
        Self { conn, version_id }
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        Ok(Dashboard {
            class_count: self.count("classes")?,
            interface_count: self.count("interfaces")?,
            function_count: self.count("functions")?,
            deprecation_count: self.count_deprecations()?,
            namespaces: self.root_namespaces()?,
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE version_id = ?1", table);
        let count: i64 = self.conn.query_row(&sql, [self.version_id], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn class_count(&self) -> Result<usize> {
        self.count("classes")
    }

    pub fn interface_count(&self) -> Result<usize> {
        self.count("interfaces")
    }

    pub fn function_count(&self) -> Result<usize> {
        self.count("functions")
    }

    /// Deprecated classes, class methods, class properties, functions,
    /// interfaces and interface methods of the version.
    pub fn count_deprecations(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM deprecations d JOIN classes c
                    ON d.deprecatable_type = 'class' AND d.deprecatable_id = c.id
                    WHERE c.version_id = ?1)
              + (SELECT COUNT(*) FROM deprecations d JOIN class_methods m
                    ON d.deprecatable_type = 'class_method' AND d.deprecatable_id = m.id
                    JOIN classes c ON c.id = m.parent_id WHERE c.version_id = ?1)
              + (SELECT COUNT(*) FROM deprecations d JOIN class_properties p
                    ON d.deprecatable_type = 'class_property' AND d.deprecatable_id = p.id
                    JOIN classes c ON c.id = p.parent_id WHERE c.version_id = ?1)
              + (SELECT COUNT(*) FROM deprecations d JOIN functions f
                    ON d.deprecatable_type = 'function' AND d.deprecatable_id = f.id
                    WHERE f.version_id = ?1)
              + (SELECT COUNT(*) FROM deprecations d JOIN interfaces i
                    ON d.deprecatable_type = 'interface' AND d.deprecatable_id = i.id
                    WHERE i.version_id = ?1)
              + (SELECT COUNT(*) FROM deprecations d JOIN interface_methods m
                    ON d.deprecatable_type = 'interface_method' AND d.deprecatable_id = m.id
                    JOIN interfaces i ON i.id = m.parent_id WHERE i.version_id = ?1)",
            [self.version_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn namespaces(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT namespace FROM classes WHERE version_id = ?1 AND namespace IS NOT NULL
             UNION SELECT namespace FROM interfaces WHERE version_id = ?1 AND namespace IS NOT NULL
             UNION SELECT namespace FROM functions WHERE version_id = ?1 AND namespace IS NOT NULL",
        )?;
        let namespaces = stmt
            .query_map([self.version_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(namespaces)
    }

    /// First segment of every namespace in use, sorted.
    pub fn root_namespaces(&self) -> Result<Vec<String>> {
        let roots: BTreeSet<String> = self
            .namespaces()?
            .iter()
            .filter_map(|ns| ns.split('\\').next())
            .filter(|root| !root.is_empty())
            .map(String::from)
            .collect();
        Ok(roots.into_iter().collect())
    }

    /// Namespaces exactly one level below `namespace` (which may itself be
    /// only an intermediate segment).
    pub fn child_namespaces(&self, namespace: &str) -> Result<Vec<String>> {
        let namespace = namespace.trim_matches('\\');
        let prefix = format!("{}\\", namespace);

        let children: BTreeSet<String> = self
            .namespaces()?
            .iter()
            .filter_map(|ns| ns.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('\\').next())
            .filter(|child| !child.is_empty())
            .map(|child| format!("{}{}", prefix, child))
            .collect();
        Ok(children.into_iter().collect())
    }

    /// Classes declared directly in `namespace`, ordered by short name.
    pub fn classes_in_namespace(&self, namespace: &str) -> Result<Vec<ClassRecord>> {
        let sql = format!(
            "SELECT {} FROM classes WHERE version_id = ?1 AND namespace = ?2 ORDER BY shortname",
            ClassRecord::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![self.version_id, namespace.trim_matches('\\')], ClassRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Functions declared directly in `namespace`, ordered by short name.
    pub fn functions_in_namespace(&self, namespace: &str) -> Result<Vec<FunctionRecord>> {
        let sql = format!(
            "SELECT {} FROM functions WHERE version_id = ?1 AND namespace = ?2 ORDER BY shortname",
            FunctionRecord::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![self.version_id, namespace.trim_matches('\\')], FunctionRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Classes whose namespace is NULL.
    pub fn global_namespace_classes(&self) -> Result<Vec<ClassRecord>> {
        let sql = format!(
            "SELECT {} FROM classes WHERE version_id = ?1 AND namespace IS NULL ORDER BY shortname",
            ClassRecord::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([self.version_id], ClassRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn global_namespace_functions(&self) -> Result<Vec<FunctionRecord>> {
        let sql = format!(
            "SELECT {} FROM functions WHERE version_id = ?1 AND namespace IS NULL ORDER BY shortname",
            FunctionRecord::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([self.version_id], FunctionRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::import::repository::fixtures::{seed_class, seed_version};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_namespace_listings() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "4.0.0");
        seed_class(&db, version_id, "Joomla\\CMS\\Table", "Table");
        seed_class(&db, version_id, "Joomla\\CMS\\Table", "Asset");
        seed_class(&db, version_id, "Joomla\\CMS\\Router", "Router");
        seed_class(&db, version_id, "Psr\\Log", "LoggerInterface");
        seed_class(&db, version_id, "global", "JTable");

        let other = seed_version(&db, "cms", "3.9.8");
        seed_class(&db, other, "Legacy", "Thing");

        let query = VersionQuery::for_id(db.conn(), version_id);
        assert_eq!(query.root_namespaces().unwrap(), vec!["Joomla", "Psr"]);
        assert_eq!(query.child_namespaces("Joomla").unwrap(), vec!["Joomla\\CMS"]);
        assert_eq!(
            query.child_namespaces("Joomla\\CMS").unwrap(),
            vec!["Joomla\\CMS\\Router", "Joomla\\CMS\\Table"]
        );

        let shortnames: Vec<_> = query
            .classes_in_namespace("Joomla\\CMS\\Table")
            .unwrap()
            .into_iter()
            .map(|c| c.shortname)
            .collect();
        assert_eq!(shortnames, vec!["Asset", "Table"]);

        let global = query.global_namespace_classes().unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].name, "JTable");
        assert_eq!(query.class_count().unwrap(), 5);
    }

    #[test]
    fn test_deprecations_counted_across_kinds() {
        let db = Database::open_in_memory().unwrap();
        let version_id = seed_version(&db, "cms", "4.0.0");
        let class_id = seed_class(&db, version_id, "global", "JTable");
        db.conn()
            .execute(
                "INSERT INTO class_methods (name, parent_id) VALUES ('load', ?1)",
                [class_id],
            )
            .unwrap();
        let method_id = db.conn().last_insert_rowid();
        for (kind, id) in [("class", class_id), ("class_method", method_id)] {
            db.conn()
                .execute(
                    "INSERT INTO deprecations (deprecatable_type, deprecatable_id) VALUES (?1, ?2)",
                    params![kind, id],
                )
                .unwrap();
        }

        let dashboard = VersionQuery::for_id(db.conn(), version_id).dashboard().unwrap();
        assert_eq!(dashboard.deprecation_count, 2);
        assert_eq!(dashboard.class_count, 1);
        assert!(dashboard.namespaces.is_empty());
    }
}
