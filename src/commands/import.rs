//! @acp:module "Import Command"
//! @acp:summary "Import an IR document into a registered version"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `apidoc import-data`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::db::Database;
use crate::import::repository::VersionRepository;
use crate::import::Importer;
use crate::ir::ImportData;

/// Options for the import command
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Software slug
    pub software: String,
    /// Version string the data belongs to
    pub version: String,
    /// IR document to import (defaults to the configured data file)
    pub data: Option<PathBuf>,
}

/// Execute the import command
pub fn execute_import(options: ImportOptions, config: &Config) -> Result<()> {
    let data_path = options.data.unwrap_or_else(|| config.data_file.clone());
    let data = ImportData::from_json(&data_path)?;

    let mut db = Database::open(&config.database)?;
    let version =
        VersionRepository::new().find_software_version(db.conn(), &options.software, &options.version)?;

    println!(
        "{} Importing {} into {} {}",
        style("→").cyan(),
        data_path.display(),
        options.software,
        version.display_name
    );

    let stats = Importer::new().import(&mut db, &data, &version)?;

    println!("{} Import complete", style("✓").green());
    println!("  Classes: {}", stats.classes);
    println!("  Interfaces: {}", stats.interfaces);
    println!("  Class methods: {}", stats.class_methods);
    println!("  Class properties: {}", stats.class_properties);
    println!("  Interface methods: {}", stats.interface_methods);
    println!("  Functions: {}", stats.functions);
    println!("  Aliases: {}", stats.aliases);

    Ok(())
}
