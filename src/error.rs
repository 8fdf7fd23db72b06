//! @acp:module "Errors"
//! @acp:summary "Crate-wide error type and result alias"
//! @acp:domain core
//! @acp:layer model
//!
//! Parse-phase failures carry the offending file and line so the operator can
//! locate them. Malformed classmap lines and unresolved `extends` names are
//! recovered where they occur and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Errors raised by the parse and import pipeline"
#[derive(Debug, Error)]
pub enum ApidocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// A source file could not be reflected
    #[error("Failed to parse {}{}: {message}", path.display(), line.map(|l| format!(" (line {})", l)).unwrap_or_default())]
    ParseFailure {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Permissive parsing gave up after too many failing files
    #[error("Aborting after {0} files failed to parse")]
    TooManyParseFailures(usize),

    /// No source paths are configured for the requested release
    #[error("There is no configuration for version '{release}' (branch '{branch}')")]
    ConfigurationMissing { release: String, branch: String },

    /// An `exclude` entry in the configuration is not a valid glob
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Unknown {software} version '{version}'")]
    UnknownRelease { software: String, version: String },

    #[error("Software not found: {0}")]
    SoftwareNotFound(String),

    #[error("Cannot find entry for \"{software}\" at version \"{version}\"")]
    VersionNotFound { software: String, version: String },

    /// A member was reconciled against an owner that is not in the store.
    /// Indicates an ordering bug in the importer and aborts the run.
    #[error("Cannot associate {kind} '{name}' with {owner} #{owner_id}: owner is not persisted")]
    OwnerAssociation {
        kind: &'static str,
        name: String,
        owner: &'static str,
        owner_id: i64,
    },

    #[error("{0}")]
    Other(String),
}

impl ApidocError {
    pub fn parse_failure(path: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        ApidocError::ParseFailure {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApidocError>;
