//! @acp:module "Parse Command"
//! @acp:summary "Parse a release checkout into an IR document"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `apidoc parse-files`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::git::GitRepository;
use crate::parse::Parser;

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Software slug, also the checkout directory name under `repos`
    pub software: String,
    /// Branch key in the stable release table
    pub branch: String,
    /// Explicit release tag, bypassing the stable release table
    pub release: Option<String>,
    /// Check the release out before parsing
    pub checkout: bool,
    /// Output IR document (defaults to the configured data file)
    pub output: Option<PathBuf>,
}

/// Execute the parse command
pub fn execute_parse(options: ParseOptions, config: &Config) -> Result<()> {
    let release = match options.release {
        Some(release) => release,
        None => config.resolve_release(&options.software, &options.branch)?,
    };
    let checkout = config.repo_path(&options.software);
    let parser = Parser::new(config)?;

    println!(
        "{} Parsing {} {} in {}",
        style("→").cyan(),
        options.software,
        release,
        checkout.display()
    );

    if options.checkout {
        let repo = GitRepository::open(&checkout)?;
        let commit = repo.checkout_release(&release)?;
        println!("{} Checked out {} ({})", style("✓").green(), release, &commit[..commit.len().min(10)]);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message("Parsing source files...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = parser.parse_release(&checkout, &release);
    spinner.finish_and_clear();
    let report = result?;

    for path in &report.missing_paths {
        println!("{} Configured path {} not found", style("⚠").yellow(), path);
    }
    for skipped in &report.skipped {
        eprintln!("{} Skipped {}: {}", style("✗").red(), skipped.path, skipped.error);
    }

    let output = options.output.unwrap_or_else(|| config.data_file.clone());
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    report.data.write_json(&output)?;

    println!("{} Data written to {}", style("✓").green(), output.display());
    println!("  Files: {}", report.data.files.len());
    println!("  Classes: {}", report.data.classes().count());
    println!("  Interfaces: {}", report.data.interfaces().count());
    println!("  Functions: {}", report.data.functions().count());
    println!("  Aliases: {}", report.data.aliases.len());

    Ok(())
}
