//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ApidocError, Result};

pub const DEFAULT_CONFIG_FILE: &str = ".apidoc.config.json";

/// @acp:summary "Main apidoc configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Where `parse-files` writes and `import-data` reads the IR document
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Directory holding one source checkout per software slug
    #[serde(default = "default_repos")]
    pub repos: PathBuf,

    /// Extension of the files the directory walker picks up
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File patterns to exclude (glob syntax, relative to the scan root)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Software slug → branch → release tag
    #[serde(default = "default_stable_releases")]
    pub stable_releases: BTreeMap<String, BTreeMap<String, String>>,

    /// Major branch key → source paths to scan
    #[serde(default)]
    pub branches: BTreeMap<String, BranchConfig>,

    /// Error handling configuration
    #[serde(default)]
    pub error_handling: ErrorHandling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            data_file: default_data_file(),
            repos: default_repos(),
            extension: default_extension(),
            exclude: Vec::new(),
            stable_releases: default_stable_releases(),
            branches: BTreeMap::new(),
            error_handling: ErrorHandling::default(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a .apidoc.config.json file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or create default config"
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// @acp:summary "Map a software branch to its stable release tag"
    pub fn resolve_release(&self, software: &str, branch: &str) -> Result<String> {
        self.stable_releases
            .get(software)
            .and_then(|branches| branches.get(branch))
            .cloned()
            .ok_or_else(|| ApidocError::UnknownRelease {
                software: software.to_string(),
                version: branch.to_string(),
            })
    }

    /// @acp:summary "Source paths for a release, keyed by its major branch"
    ///
    /// The major branch is the first character of the release string, so
    /// `3.9.8` and `3.x` both select `branches["3"]`. An entry that lists
    /// neither directories nor files counts as missing.
    pub fn branch_for(&self, release: &str) -> Result<&BranchConfig> {
        let major = major_branch(release);
        match self.branches.get(&major) {
            Some(branch) if !branch.is_empty() => Ok(branch),
            _ => Err(ApidocError::ConfigurationMissing {
                release: release.to_string(),
                branch: major,
            }),
        }
    }

    /// Checkout directory of a software
    pub fn repo_path(&self, software: &str) -> PathBuf {
        self.repos.join(software)
    }
}

pub fn major_branch(release: &str) -> String {
    release.chars().next().map(String::from).unwrap_or_default()
}

/// @acp:summary "Paths scanned for one major branch"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Directories walked recursively, relative to the checkout
    #[serde(default)]
    pub paths: Vec<String>,

    /// Individual files parsed as-is, relative to the checkout
    #[serde(default)]
    pub files: Vec<String>,

    /// Legacy alias registration file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classmap: Option<String>,
}

impl BranchConfig {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.files.is_empty()
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("apidoc.sqlite")
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_repos() -> PathBuf {
    PathBuf::from("repos")
}

fn default_extension() -> String {
    "php".to_string()
}

fn default_stable_releases() -> BTreeMap<String, BTreeMap<String, String>> {
    let mut cms = BTreeMap::new();
    cms.insert("2.5".to_string(), "2.5.28".to_string());
    cms.insert("3.x".to_string(), "3.9.8".to_string());

    let mut releases = BTreeMap::new();
    releases.insert("cms".to_string(), cms);
    releases
}

/// @acp:summary "Error handling configuration"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandling {
    /// Error handling strictness mode
    #[serde(default = "default_strictness")]
    pub strictness: Strictness,

    /// Maximum number of skipped files before aborting (permissive mode only)
    #[serde(default = "default_max_errors")]
    pub max_errors: usize,
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self {
            strictness: default_strictness(),
            max_errors: default_max_errors(),
        }
    }
}

fn default_strictness() -> Strictness {
    Strictness::Strict
}

fn default_max_errors() -> usize {
    100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Permissive,
    Strict,
}
