//! @acp:module "Migrate Command"
//! @acp:summary "Apply or list database schema migrations"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use chrono::DateTime;
use console::style;

use crate::config::Config;
use crate::db::Database;

/// Options for the migrate command
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// List migrations instead of applying them
    pub status: bool,
}

/// Execute the migrate command
pub fn execute_migrate(options: MigrateOptions, config: &Config) -> Result<()> {
    let db = Database::connect(&config.database)?;

    if options.status {
        for migration in db.migration_status()? {
            match migration.applied_at.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
                Some(applied) => println!(
                    "{} {:03} {} (applied {})",
                    style("✓").green(),
                    migration.version,
                    migration.description,
                    applied.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!(
                    "{} {:03} {} (pending)",
                    style("•").yellow(),
                    migration.version,
                    migration.description
                ),
            }
        }
        return Ok(());
    }

    let applied = db.migrate()?;
    if applied == 0 {
        println!("{} Database is up to date", style("✓").green());
    } else {
        println!(
            "{} Applied {} migration(s) to {}",
            style("✓").green(),
            applied,
            config.database.display()
        );
    }
    Ok(())
}
