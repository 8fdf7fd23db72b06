//! @acp:module "Dashboard Command"
//! @acp:summary "Print the overview of an imported version"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::db::Database;
use crate::import::repository::VersionRepository;
use crate::query::VersionQuery;

/// Options for the dashboard command
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub software: String,
    pub version: String,
    /// Also list the classes of this namespace (`global` for the global namespace)
    pub namespace: Option<String>,
}

/// Execute the dashboard command
pub fn execute_dashboard(options: DashboardOptions, config: &Config) -> Result<()> {
    let db = Database::open(&config.database)?;
    let version =
        VersionRepository::new().find_software_version(db.conn(), &options.software, &options.version)?;
    let query = VersionQuery::new(db.conn(), &version);
    let dashboard = query.dashboard()?;

    println!("{} {}", style(&options.software).bold(), style(&version.display_name).bold());
    println!("  Classes: {}", dashboard.class_count);
    println!("  Interfaces: {}", dashboard.interface_count);
    println!("  Functions: {}", dashboard.function_count);
    println!("  Deprecations: {}", dashboard.deprecation_count);

    if !dashboard.namespaces.is_empty() {
        println!("  Namespaces:");
        for namespace in &dashboard.namespaces {
            println!("    {}", namespace);
        }
    }

    if let Some(namespace) = options.namespace {
        let classes = if namespace == crate::ir::GLOBAL_NAMESPACE {
            query.global_namespace_classes()?
        } else {
            for child in query.child_namespaces(&namespace)? {
                println!("  {} {}\\", style("›").dim(), child);
            }
            query.classes_in_namespace(&namespace)?
        };

        println!("  Classes in {}:", namespace);
        for class in classes {
            let summary = if class.summary.is_empty() {
                String::new()
            } else {
                format!("  {}", style(class.summary.lines().next().unwrap_or("")).dim())
            };
            println!("    {}{}", class.shortname, summary);
        }
    }

    Ok(())
}
