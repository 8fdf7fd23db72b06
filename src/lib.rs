#![forbid(unsafe_code)]

//! @acp:module "apidoc Library"
//! @acp:summary "Static reflection of PHP source trees into a versioned API documentation store"
//! @acp:domain core
//! @acp:layer api
//! @acp:stability stable
//!
//! # apidoc
//!
//! Extracts classes, interfaces, methods, properties, functions, deprecations
//! and class aliases from a PHP code base and reconciles them into a SQLite
//! database, one software version at a time.
//!
//! ## Pipeline
//!
//! - **Parse**: tree-sitter reflection and docblock interpretation produce an
//!   [`ImportData`] document (`data.json`) without touching the database
//! - **Import**: repositories reconcile the document into a registered
//!   [`Version`](db::Version) by natural key, so re-running is safe
//! - **Query**: per-version counts and namespace listings
//!
//! ## Example
//!
//! ```rust,no_run
//! use apidoc::{Config, Database, Importer, Parser};
//! use apidoc::import::repository::VersionRepository;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(".apidoc.config.json")?;
//!     let report = Parser::new(&config)?.parse_release("repos/cms", "3.9.8")?;
//!
//!     let mut db = Database::open(&config.database)?;
//!     let version = VersionRepository::new().find_software_version(db.conn(), "cms", "3.9.8")?;
//!     Importer::new().import(&mut db, &report.data, &version)?;
//!
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod git;
pub mod import;
pub mod ir;
pub mod parse;
pub mod query;

// Re-exports
pub use ast::{reflect_file, Documented, FileReflection};
pub use config::{BranchConfig, Config, ErrorHandling, Strictness};
pub use db::Database;
pub use error::{ApidocError, Result};
pub use git::GitRepository;
pub use import::{ImportStats, Importer, Repository};
pub use ir::{DocBlock, ImportData, Tag};
pub use parse::{ClassmapParser, DirectoryParser, DocBlockParser, FileParser, ParseReport, Parser};
pub use query::{Dashboard, VersionQuery};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
