#![forbid(unsafe_code)]
//! apidoc Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use apidoc::commands::{
    execute_add_software, execute_add_version, execute_dashboard, execute_import, execute_migrate,
    execute_parse, AddSoftwareOptions, AddVersionOptions, DashboardOptions, ImportOptions,
    MigrateOptions, ParseOptions,
};
use apidoc::Config;

#[derive(Parser)]
#[command(name = "apidoc")]
#[command(about = "PHP API documentation extraction and import")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".apidoc.config.json")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a release of a software package into a data file
    ParseFiles {
        /// Software slug
        software: String,

        /// Branch in the stable release table (e.g. 3.x)
        branch: String,

        /// Parse this release instead of the stable one
        #[arg(long)]
        release: Option<String>,

        /// Check the release out in the software's repository first
        #[arg(long)]
        checkout: bool,

        /// Output data file (default: configured data_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a data file into a registered version
    ImportData {
        /// Software slug
        software: String,

        /// Version to import into
        version: String,

        /// Data file to import (default: configured data_file)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Register a software package
    AddSoftware {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Unique identifier (generated from the name when omitted)
        #[arg(long)]
        slug: Option<String>,
    },

    /// Register a version of a software package
    AddSoftwareVersion {
        /// Version string
        version: String,

        /// Software slug
        #[arg(long)]
        software: Option<String>,

        /// Display name (default: the version string)
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Show counts and namespaces of an imported version
    Dashboard {
        /// Software slug
        software: String,

        /// Version
        version: String,

        /// List classes in this namespace (`global` for the global namespace)
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Apply database migrations
    Migrate {
        /// List migrations and whether they are applied
        #[arg(long)]
        status: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,apidoc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::ParseFiles { software, branch, release, checkout, output } => {
            let options = ParseOptions { software, branch, release, checkout, output };
            execute_parse(options, &config)?;
        }

        Commands::ImportData { software, version, data } => {
            let options = ImportOptions { software, version, data };
            execute_import(options, &config)?;
        }

        Commands::AddSoftware { name, slug } => {
            execute_add_software(AddSoftwareOptions { name, slug }, &config)?;
        }

        Commands::AddSoftwareVersion { version, software, display_name } => {
            let options = AddVersionOptions { version, software, display_name };
            execute_add_version(options, &config)?;
        }

        Commands::Dashboard { software, version, namespace } => {
            let options = DashboardOptions { software, version, namespace };
            execute_dashboard(options, &config)?;
        }

        Commands::Migrate { status } => {
            execute_migrate(MigrateOptions { status }, &config)?;
        }
    }

    Ok(())
}
