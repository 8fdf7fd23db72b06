//! @acp:module "Software Repository"
//! @acp:summary "Administration of tracked software and their versions"
//! @acp:domain import
//! @acp:layer data
//!
//! Imports never create versions; a version must be registered here before
//! data can be imported into it.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::db::{Software, Version};
use crate::error::{ApidocError, Result};

static SLUG_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// @acp:summary "URL-safe identifier derived from a display name"
///
/// # Examples
/// ```
/// use apidoc::import::repository::slugify;
///
/// assert_eq!(slugify("Joomla! CMS"), "joomla-cms");
/// assert_eq!(slugify("  Framework 2.x "), "framework-2-x");
/// ```
pub fn slugify(name: &str) -> String {
    SLUG_SEPARATORS
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRepository;

impl SoftwareRepository {
    pub fn new() -> Self {
        Self
    }

    /// @acp:summary "Register a software package"
    ///
    /// Returns `None` (and logs a warning) when the name or slug is taken.
    pub fn create(&self, conn: &Connection, name: &str, slug: Option<&str>) -> Result<Option<Software>> {
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => slugify(name),
        };
        if slug.is_empty() {
            return Err(ApidocError::Other(format!("Cannot derive a slug from '{}'", name)));
        }

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM software WHERE name = ?1 OR slug = ?2",
                params![name, slug],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            warn!("Software '{}' ({}) already exists", name, slug);
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO software (name, slug) VALUES (?1, ?2)",
            params![name, slug],
        )?;
        info!("Added software '{}' ({})", name, slug);

        Ok(Some(Software {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug,
        }))
    }

    pub fn find_by_slug(&self, conn: &Connection, slug: &str) -> Result<Option<Software>> {
        let sql = format!("SELECT {} FROM software WHERE slug = ?1", Software::COLUMNS);
        Ok(conn.query_row(&sql, [slug], Software::from_row).optional()?)
    }

    pub fn find_by_slug_or_fail(&self, conn: &Connection, slug: &str) -> Result<Software> {
        self.find_by_slug(conn, slug)?
            .ok_or_else(|| ApidocError::SoftwareNotFound(slug.to_string()))
    }

    pub fn list(&self, conn: &Connection) -> Result<Vec<Software>> {
        let sql = format!("SELECT {} FROM software ORDER BY name", Software::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Software::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionRepository;

impl VersionRepository {
    pub fn new() -> Self {
        Self
    }

    /// @acp:summary "Register a version of a software package"
    ///
    /// The display name defaults to the version string. Returns `None` when
    /// the version already exists.
    pub fn create(
        &self,
        conn: &Connection,
        software: &Software,
        version: &str,
        display_name: Option<&str>,
    ) -> Result<Option<Version>> {
        let display_name = display_name
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(version)
            .to_string();

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM versions WHERE software_id = ?1 AND version = ?2",
                params![software.id, version],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            warn!("Version {} of '{}' already exists", version, software.name);
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO versions (software_id, version, display_name) VALUES (?1, ?2, ?3)",
            params![software.id, version, display_name],
        )?;
        info!("Added version {} of '{}'", version, software.name);

        Ok(Some(Version {
            id: conn.last_insert_rowid(),
            software_id: software.id,
            version: version.to_string(),
            display_name,
        }))
    }

    /// @acp:summary "Find a version by software slug and version string"
    pub fn find_software_version(&self, conn: &Connection, software: &str, version: &str) -> Result<Version> {
        let sql = "SELECT v.id, v.software_id, v.version, v.display_name
                   FROM versions v JOIN software s ON s.id = v.software_id
                   WHERE s.slug = ?1 AND v.version = ?2";
        conn.query_row(sql, params![software, version], Version::from_row)
            .optional()?
            .ok_or_else(|| ApidocError::VersionNotFound {
                software: software.to_string(),
                version: version.to_string(),
            })
    }

    pub fn list_for(&self, conn: &Connection, software_id: i64) -> Result<Vec<Version>> {
        let sql = format!(
            "SELECT {} FROM versions WHERE software_id = ?1 ORDER BY id",
            Version::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([software_id], Version::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Delete a version and everything it owns. Returns whether a row was removed.
    pub fn delete(&self, conn: &Connection, version_id: i64) -> Result<bool> {
        Ok(conn.execute("DELETE FROM versions WHERE id = ?1", [version_id])? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slug_generation() {
        assert_eq!(slugify("CMS"), "cms");
        assert_eq!(slugify("Joomla Framework"), "joomla-framework");
        assert_eq!(slugify("Ünïcode Tööls"), "ünïcode-tööls");
    }

    #[test]
    fn test_duplicates_are_noops() {
        let db = Database::open_in_memory().unwrap();
        let software = SoftwareRepository::new();
        let versions = VersionRepository::new();

        let cms = software.create(db.conn(), "Joomla CMS", Some("cms")).unwrap().unwrap();
        assert!(software.create(db.conn(), "Joomla CMS", None).unwrap().is_none());
        assert!(software.create(db.conn(), "Other", Some("cms")).unwrap().is_none());

        let v = versions.create(db.conn(), &cms, "3.9.8", None).unwrap().unwrap();
        assert_eq!(v.display_name, "3.9.8");
        assert!(versions.create(db.conn(), &cms, "3.9.8", Some("3.9")).unwrap().is_none());

        assert_eq!(software.list(db.conn()).unwrap(), vec![cms.clone()]);
        assert_eq!(versions.list_for(db.conn(), cms.id).unwrap(), vec![v]);
    }

    #[test]
    fn test_find_software_version() {
        let db = Database::open_in_memory().unwrap();
        let cms = SoftwareRepository::new()
            .create(db.conn(), "CMS", None)
            .unwrap()
            .unwrap();
        let created = VersionRepository::new()
            .create(db.conn(), &cms, "4.0.0", Some("4.0"))
            .unwrap()
            .unwrap();

        let found = VersionRepository::new()
            .find_software_version(db.conn(), "cms", "4.0.0")
            .unwrap();
        assert_eq!(found, created);

        let err = VersionRepository::new()
            .find_software_version(db.conn(), "cms", "9.9.9")
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot find entry for \"cms\" at version \"9.9.9\"");

        assert!(matches!(
            SoftwareRepository::new().find_by_slug_or_fail(db.conn(), "nope"),
            Err(ApidocError::SoftwareNotFound(_))
        ));
    }
}
