//! @acp:module "Parser"
//! @acp:summary "Release-level parse phase: configured paths, files and classmap into one document"
//! @acp:domain parsing
//! @acp:layer service
//!
//! The parse phase is pure with respect to the database: it produces a
//! complete [`ImportData`] document before anything is persisted. Strict
//! mode aborts on the first file that fails to parse; permissive mode skips
//! failing files until `max_errors` is exceeded.

pub mod classmap;
pub mod directory;
pub mod docblock;
pub mod element;
pub mod file;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

pub use classmap::ClassmapParser;
pub use directory::{normalize_path, relative_key, DirectoryParser};
pub use docblock::DocBlockParser;
pub use file::FileParser;

use crate::config::{Config, ErrorHandling, Strictness};
use crate::error::{ApidocError, Result};
use crate::ir::{FileNode, ImportData};

/// @acp:summary "A file left out of the document in permissive mode"
#[derive(Debug)]
pub struct SkippedFile {
    pub path: String,
    pub error: ApidocError,
}

/// @acp:summary "Result of parsing one release"
#[derive(Debug, Default)]
pub struct ParseReport {
    pub data: ImportData,
    pub skipped: Vec<SkippedFile>,
    /// Configured paths that do not exist in the checkout
    pub missing_paths: Vec<String>,
}

/// @acp:summary "Parser for a whole release checkout"
pub struct Parser<'c> {
    config: &'c Config,
    directory: DirectoryParser,
    classmap: ClassmapParser,
}

impl<'c> Parser<'c> {
    /// Fails when the configured `exclude` patterns are not valid globs.
    pub fn new(config: &'c Config) -> Result<Self> {
        Ok(Self {
            config,
            directory: DirectoryParser::from_config(config)?,
            classmap: ClassmapParser::new(),
        })
    }

    fn error_handling(&self) -> &ErrorHandling {
        &self.config.error_handling
    }

    /// @acp:summary "Parse the configured sources of `release` inside `checkout`"
    /// @acp:ai-careful "This processes many files in parallel"
    ///
    /// Fails with `ConfigurationMissing` before touching the filesystem when
    /// the release's major branch has nothing to scan.
    pub fn parse_release<P: AsRef<Path>>(&self, checkout: P, release: &str) -> Result<ParseReport> {
        let checkout = checkout.as_ref();
        let branch = self.config.branch_for(release)?;
        let mut report = ParseReport::default();

        for path in &branch.paths {
            let dir = checkout.join(path);
            if !dir.is_dir() {
                warn!("Configured path {} does not exist, skipping", dir.display());
                report.missing_paths.push(path.clone());
                continue;
            }

            info!("Parsing directory {}", dir.display());
            match self.error_handling().strictness {
                Strictness::Strict => {
                    let files = self.directory.parse(&dir, checkout)?;
                    report.data.files.extend(files);
                }
                Strictness::Permissive => {
                    let files = self.directory.list_files(&dir)?;
                    self.parse_recovering(&files, checkout, &mut report)?;
                }
            }
        }

        for file in &branch.files {
            let path = checkout.join(file);
            if !path.is_file() {
                warn!("Configured file {} does not exist, skipping", path.display());
                report.missing_paths.push(file.clone());
                continue;
            }

            let key = normalize_path(file);
            match self.directory.file_parser().parse(&path) {
                Ok(node) => {
                    report.data.files.insert(key, node);
                }
                Err(e) => self.record_failure(&mut report, key, e)?,
            }
        }

        if let Some(classmap) = &branch.classmap {
            let path = checkout.join(classmap);
            if path.is_file() {
                report.data.aliases = self.classmap.parse(&path)?;
                info!("Found {} class aliases in {}", report.data.aliases.len(), classmap);
            } else {
                debug!("No classmap at {}", path.display());
            }
        }

        Ok(report)
    }

    fn parse_recovering(
        &self,
        files: &[PathBuf],
        checkout: &Path,
        report: &mut ParseReport,
    ) -> Result<()> {
        let parser = self.directory.file_parser();
        let results: Vec<(String, Result<FileNode>)> = files
            .par_iter()
            .map(|path| (relative_key(path, checkout), parser.parse(path)))
            .collect();

        for (key, result) in results {
            match result {
                Ok(node) => {
                    report.data.files.insert(key, node);
                }
                Err(e) => self.record_failure(report, key, e)?,
            }
        }
        Ok(())
    }

    fn record_failure(&self, report: &mut ParseReport, path: String, error: ApidocError) -> Result<()> {
        if self.error_handling().strictness == Strictness::Strict {
            return Err(error);
        }

        warn!("Skipping {}: {}", path, error);
        report.skipped.push(SkippedFile { path, error });

        if report.skipped.len() > self.error_handling().max_errors {
            return Err(ApidocError::TooManyParseFailures(report.skipped.len()));
        }
        Ok(())
    }
}
