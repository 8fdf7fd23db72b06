//! @acp:module "Directory Parser"
//! @acp:summary "Walks a source tree and parses every matching file in parallel"
//! @acp:domain parsing
//! @acp:layer service
//!
//! Dot-files, dot-directories and version control metadata are never
//! visited. Results are keyed by path relative to a display root, using `/`
//! separators on every platform.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use super::file::FileParser;
use crate::config::Config;
use crate::error::{ApidocError, Result};
use crate::ir::FileNode;

const VCS_DIRECTORIES: &[&str] = &[
    ".git", ".svn", "_svn", "CVS", "_darcs", ".arch-params", ".monotone", ".bzr", ".hg",
];

/// @acp:summary "Parser for a directory of source files"
#[derive(Debug, Clone)]
pub struct DirectoryParser {
    files: FileParser,
    extension: String,
    exclude: Vec<Pattern>,
}

impl DirectoryParser {
    /// Fails with `InvalidPattern` on the first malformed `exclude` glob.
    pub fn new(files: FileParser, extension: impl Into<String>, exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ApidocError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            files,
            extension: extension.into().trim_start_matches('.').to_string(),
            exclude,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(FileParser::new(), config.extension.clone(), &config.exclude)
    }

    pub fn file_parser(&self) -> &FileParser {
        &self.files
    }

    /// @acp:summary "Find all files with the configured extension, sorted by path"
    pub fn list_files<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        let match_opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let matches_extension = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == self.extension);
            if !matches_extension {
                continue;
            }

            let relative = relative_key(path, root);
            if self.exclude.iter().any(|p| p.matches_with(&relative, match_opts)) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// @acp:summary "Parse every file under `root`, keyed relative to `display_root`"
    /// @acp:ai-careful "This processes many files in parallel"
    ///
    /// The first failing file aborts the walk.
    pub fn parse<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        root: P,
        display_root: Q,
    ) -> Result<BTreeMap<String, FileNode>> {
        let display_root = display_root.as_ref();
        let files = self.list_files(root)?;

        let parsed: Vec<(String, FileNode)> = files
            .par_iter()
            .map(|path| -> Result<(String, FileNode)> {
                let node = self.files.parse(path)?;
                Ok((relative_key(path, display_root), node))
            })
            .collect::<Result<_>>()?;

        Ok(parsed.into_iter().collect())
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && VCS_DIRECTORIES.contains(&name.as_ref()))
}

/// @acp:summary "Path relative to `root` with forward slashes"
pub fn relative_key(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_path(&relative.to_string_lossy())
}

/// @acp:summary "Normalize a file path for cross-platform compatibility"
///
/// # Examples
/// ```
/// use apidoc::parse::directory::normalize_path;
///
/// assert_eq!(normalize_path("./libraries/cms.php"), "libraries/cms.php");
/// assert_eq!(normalize_path("libraries\\cms.php"), "libraries/cms.php");
/// assert_eq!(normalize_path("libraries/../libraries/cms.php"), "libraries/cms.php");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut components: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                components.pop();
            }
            component => components.push(component),
        }
    }

    components.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn parser() -> DirectoryParser {
        DirectoryParser::new(FileParser::new(), "php", &["**/tmpl/**".to_string()]).unwrap()
    }

    #[test]
    fn test_malformed_exclude_pattern_is_rejected() {
        let err = DirectoryParser::new(FileParser::new(), "php", &["libraries/[abc".to_string()])
            .unwrap_err();
        match err {
            ApidocError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "libraries/[abc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_walk_skips_hidden_vcs_and_other_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "libraries/joomla/b.php", "<?php\nclass B {}\n");
        write(root, "libraries/joomla/a.php", "<?php\nclass A {}\n");
        write(root, "libraries/joomla/README.md", "# readme");
        write(root, "libraries/.hidden.php", "<?php\nclass Hidden {}\n");
        write(root, "libraries/.cache/c.php", "<?php\nclass C {}\n");
        write(root, "libraries/CVS/d.php", "<?php\nclass D {}\n");
        write(root, ".git/hooks/e.php", "<?php\nclass E {}\n");
        write(root, "libraries/tmpl/default.php", "<?php\nclass F {}\n");

        let files = parser().parse(root.join("libraries"), root).unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["libraries/joomla/a.php".to_string(), "libraries/joomla/b.php".to_string()]
        );
        assert_eq!(files["libraries/joomla/a.php"].classes[0].name, "A");
    }

    #[test]
    fn test_list_files_is_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "z.php", "<?php\n");
        write(dir.path(), "a/b.php", "<?php\n");
        write(dir.path(), "m.php", "<?php\n");

        let files = parser().list_files(dir.path()).unwrap();
        let keys: Vec<_> = files.iter().map(|p| relative_key(p, dir.path())).collect();
        assert_eq!(keys, vec!["a/b.php", "m.php", "z.php"]);
    }

    #[test]
    fn test_one_failure_aborts_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.php", "<?php\nclass Good {}\n");
        write(dir.path(), "bad.php", "<?php\nclass {\n");

        let err = parser().parse(dir.path(), dir.path()).unwrap_err();
        match err {
            ApidocError::ParseFailure { path, .. } => assert!(path.ends_with("bad.php")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
