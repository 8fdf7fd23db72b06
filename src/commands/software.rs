//! @acp:module "Software Commands"
//! @acp:summary "Register software packages and their versions"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `apidoc add-software` and `apidoc add-software-version`.
//! Missing values are prompted for interactively.

use anyhow::{bail, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::config::Config;
use crate::db::{Database, Software};
use crate::import::repository::{SoftwareRepository, VersionRepository};

/// Options for the add-software command
#[derive(Debug, Clone, Default)]
pub struct AddSoftwareOptions {
    pub name: Option<String>,
    /// Generated from the name when omitted
    pub slug: Option<String>,
}

/// Options for the add-software-version command
#[derive(Debug, Clone, Default)]
pub struct AddVersionOptions {
    pub version: String,
    /// Software slug; prompted for when omitted
    pub software: Option<String>,
    /// Defaults to the version string
    pub display_name: Option<String>,
}

/// Execute the add-software command
pub fn execute_add_software(options: AddSoftwareOptions, config: &Config) -> Result<()> {
    let theme = ColorfulTheme::default();

    let name = match options.name {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("What is the name of the software package?")
            .interact_text()?,
    };
    let slug = match options.slug {
        Some(slug) => Some(slug),
        None => {
            let slug: String = Input::with_theme(&theme)
                .with_prompt("What is the slug (unique identifier) for this software package? [blank to auto-generate]")
                .allow_empty(true)
                .interact_text()?;
            Some(slug).filter(|s| !s.trim().is_empty())
        }
    };

    let db = Database::open(&config.database)?;
    match SoftwareRepository::new().create(db.conn(), &name, slug.as_deref())? {
        Some(software) => println!(
            "{} Added software {} ({})",
            style("✓").green(),
            software.name,
            software.slug
        ),
        None => println!("{} Software {} already exists", style("⚠").yellow(), name),
    }

    Ok(())
}

/// Execute the add-software-version command
pub fn execute_add_version(options: AddVersionOptions, config: &Config) -> Result<()> {
    let db = Database::open(&config.database)?;
    let repository = SoftwareRepository::new();

    let software = match options.software {
        Some(slug) => repository.find_by_slug_or_fail(db.conn(), &slug)?,
        None => choose_software(repository.list(db.conn())?)?,
    };

    match VersionRepository::new().create(
        db.conn(),
        &software,
        &options.version,
        options.display_name.as_deref(),
    )? {
        Some(version) => println!(
            "{} Added {} version {}",
            style("✓").green(),
            software.name,
            version.display_name
        ),
        None => println!(
            "{} {} version {} already exists",
            style("⚠").yellow(),
            software.name,
            options.version
        ),
    }

    Ok(())
}

fn choose_software(mut available: Vec<Software>) -> Result<Software> {
    if available.is_empty() {
        bail!("No software registered yet, run add-software first");
    }

    let labels: Vec<String> = available
        .iter()
        .map(|s| format!("{} ({})", s.name, s.slug))
        .collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which software package is this version for?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(available.swap_remove(selection))
}
