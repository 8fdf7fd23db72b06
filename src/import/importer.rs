//! @acp:module "Importer"
//! @acp:summary "Runs the reconciliation passes for one version inside a single transaction"
//! @acp:domain import
//! @acp:layer service
//!
//! Pass order:
//! 1. classes and interfaces (identity)
//! 2. parent, implements and interface-parent links (cross references)
//! 3. methods, properties and functions with their arguments and deprecations
//! 4. class aliases
//!
//! Any error rolls the whole version back to its previous state.

use rusqlite::Connection;
use tracing::info;

use super::repository::{
    ClassAliasRepository, ClassMethodRepository, ClassPropertyRepository, ClassRepository,
    FunctionRepository, InterfaceMethodRepository, InterfaceRepository, Repository,
};
use crate::db::{ClassRecord, Database, InterfaceRecord, Version};
use crate::error::Result;
use crate::ir::{ClassNode, ImportData, InterfaceNode};

/// @acp:summary "Row counts touched by one import run"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub classes: usize,
    pub interfaces: usize,
    pub class_methods: usize,
    pub class_properties: usize,
    pub interface_methods: usize,
    pub functions: usize,
    pub aliases: usize,
}

/// @acp:summary "Import orchestrator"
#[derive(Debug, Clone, Copy, Default)]
pub struct Importer {
    classes: ClassRepository,
    interfaces: InterfaceRepository,
    class_methods: ClassMethodRepository,
    class_properties: ClassPropertyRepository,
    interface_methods: InterfaceMethodRepository,
    functions: FunctionRepository,
    aliases: ClassAliasRepository,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    /// @acp:summary "Import `data` into `version` atomically"
    pub fn import(&self, db: &mut Database, data: &ImportData, version: &Version) -> Result<ImportStats> {
        let tx = db.conn_mut().transaction()?;
        let stats = self.import_into(&tx, data, version.id)?;
        tx.commit()?;

        info!(
            "Imported version {} ({} classes, {} interfaces, {} functions)",
            version.version, stats.classes, stats.interfaces, stats.functions
        );
        Ok(stats)
    }

    /// Run every pass on `conn` without managing a transaction.
    pub fn import_into(&self, conn: &Connection, data: &ImportData, version_id: i64) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        let mut classes: Vec<(ClassRecord, &ClassNode)> = Vec::new();
        for node in data.classes() {
            classes.push((self.classes.reconcile(conn, node, version_id)?, node));
        }
        let mut interfaces: Vec<(InterfaceRecord, &InterfaceNode)> = Vec::new();
        for node in data.interfaces() {
            interfaces.push((self.interfaces.reconcile(conn, node, version_id)?, node));
        }
        stats.classes = classes.len();
        stats.interfaces = interfaces.len();
        info!("Reconciled {} classes and {} interfaces", stats.classes, stats.interfaces);

        for (record, node) in &classes {
            self.classes.link(conn, record, node)?;
        }
        for (record, node) in &interfaces {
            self.interfaces.link(conn, record, node)?;
        }
        info!("Linked class and interface hierarchies");

        for (record, node) in &classes {
            for method in &node.methods {
                self.class_methods.reconcile(conn, method, record.id)?;
                stats.class_methods += 1;
            }
            for property in &node.properties {
                self.class_properties.reconcile(conn, property, record.id)?;
                stats.class_properties += 1;
            }
        }
        for (record, node) in &interfaces {
            for method in &node.methods {
                self.interface_methods.reconcile(conn, method, record.id)?;
                stats.interface_methods += 1;
            }
        }
        for node in data.functions() {
            self.functions.reconcile(conn, node, version_id)?;
            stats.functions += 1;
        }
        info!(
            "Reconciled {} class methods, {} properties, {} interface methods and {} functions",
            stats.class_methods, stats.class_properties, stats.interface_methods, stats.functions
        );

        for alias in &data.aliases {
            self.aliases.reconcile(conn, alias, version_id)?;
            stats.aliases += 1;
        }
        info!("Reconciled {} class aliases", stats.aliases);

        Ok(stats)
    }
}
