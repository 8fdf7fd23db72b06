//! @acp:module "Repositories"
//! @acp:summary "Find-or-create-then-update reconciliation of IR nodes against the store"
//! @acp:domain import
//! @acp:layer data
//!
//! Every repository looks its row up by natural key inside the owning scope
//! (a version, a class or an interface), starts a fresh row when nothing
//! matches, fills the plain attributes from the node and writes exactly
//! once. Sub-records (deprecations, arguments) are synchronised afterwards.
//! Cross-references between code elements are resolved in a separate
//! [`link`](ClassRepository::link) pass once every element of the batch has
//! an identity.

mod alias;
mod class;
mod function;
mod interface;
mod member;
mod software;
mod support;

pub use alias::ClassAliasRepository;
pub use class::ClassRepository;
pub use function::FunctionRepository;
pub use interface::InterfaceRepository;
pub use member::{ClassMethodRepository, ClassPropertyRepository, InterfaceMethodRepository};
pub use software::{slugify, SoftwareRepository, VersionRepository};
pub use support::{qualified_name, stored_namespace};

use rusqlite::Connection;

use crate::error::Result;

/// @acp:summary "Reconciliation unit for one entity kind"
pub trait Repository {
    /// IR node consumed by this repository
    type Node;
    /// Persisted row handed back to the caller
    type Record;

    /// Reconcile `node` under the owning row `owner_id`.
    ///
    /// The owner is a version for code elements and aliases, a class or an
    /// interface for members.
    fn reconcile(&self, conn: &Connection, node: &Self::Node, owner_id: i64) -> Result<Self::Record>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rusqlite::params;

    use super::{SoftwareRepository, VersionRepository};
    use crate::db::Database;

    /// Create `software` (slug = name) and one version of it, returning the version id.
    pub fn seed_version(db: &Database, software: &str, version: &str) -> i64 {
        let software = match SoftwareRepository::new().find_by_slug(db.conn(), software).unwrap() {
            Some(existing) => existing,
            None => SoftwareRepository::new()
                .create(db.conn(), software, Some(software))
                .unwrap()
                .unwrap(),
        };
        VersionRepository::new()
            .create(db.conn(), &software, version, None)
            .unwrap()
            .unwrap()
            .id
    }

    /// Insert a bare class row, returning its id.
    pub fn seed_class(db: &Database, version_id: i64, namespace: &str, shortname: &str) -> i64 {
        let namespace = super::stored_namespace(namespace);
        db.conn()
            .execute(
                "INSERT INTO classes (name, namespace, shortname, version_id) VALUES (?1, ?2, ?3, ?4)",
                params![super::qualified_name(namespace, shortname), namespace, shortname, version_id],
            )
            .unwrap();
        db.conn().last_insert_rowid()
    }
}
