//! @acp:module "Git"
//! @acp:summary "Checks out release tags in the scanned source repositories"
//! @acp:domain vcs
//! @acp:layer integration
//!
//! Built without network transports: fetching works for local and file
//! remotes, anything else fails and is reported as a warning.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::Repository;
use tracing::{info, warn};

use crate::error::Result;

/// @acp:summary "Source repository of one software package"
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.as_ref().to_path_buf());
        Ok(Self { repo, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current HEAD commit id
    pub fn head_commit(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Fetch tags from `origin`. Returns false (after logging) when that is not possible.
    pub fn fetch_tags(&self) -> bool {
        let result = self
            .repo
            .find_remote("origin")
            .and_then(|mut remote| remote.fetch(&["+refs/tags/*:refs/tags/*"], None, None));

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not fetch tags in {}: {}", self.root.display(), e.message());
                false
            }
        }
    }

    /// @acp:summary "Force-checkout `release` (tag, branch or commit) and return the commit id"
    pub fn checkout(&self, release: &str) -> Result<String> {
        let (object, reference) = self.repo.revparse_ext(release)?;
        let commit = object.peel_to_commit()?;

        let mut options = CheckoutBuilder::new();
        options.force();
        self.repo.checkout_tree(commit.as_object(), Some(&mut options))?;

        match reference.as_ref().filter(|r| r.is_branch()).and_then(|r| r.name()) {
            Some(branch) => self.repo.set_head(branch)?,
            None => self.repo.set_head_detached(commit.id())?,
        }

        info!("Checked out {} ({}) in {}", release, commit.id(), self.root.display());
        Ok(commit.id().to_string())
    }

    /// Fetch tags, then check out `release`.
    pub fn checkout_release(&self, release: &str) -> Result<String> {
        self.fetch_tags();
        self.checkout(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
        let root = repo.workdir().unwrap();
        fs::write(root.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("Release Bot", "release@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parents: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_checkout_tag_restores_tree() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let first = commit_file(&repo, "version.php", "<?php\nconst RELEASE = '3.9.8';\n", "3.9.8");
        let target = repo.find_object(first, None).unwrap();
        repo.tag_lightweight("3.9.8", &target, false).unwrap();
        commit_file(&repo, "version.php", "<?php\nconst RELEASE = '4.0.0';\n", "4.0.0");

        let git = GitRepository::open(dir.path()).unwrap();
        assert!(!git.fetch_tags());
        let id = git.checkout_release("3.9.8").unwrap();

        assert_eq!(id, first.to_string());
        assert_eq!(git.head_commit().unwrap(), first.to_string());
        let content = fs::read_to_string(dir.path().join("version.php")).unwrap();
        assert!(content.contains("3.9.8"));
    }

    #[test]
    fn test_unknown_release_fails() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.php", "<?php\n", "init");

        let git = GitRepository::open(dir.path()).unwrap();
        assert!(git.checkout("no-such-tag").is_err());
    }
}
