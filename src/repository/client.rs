// file: src/repository/client.rs
// description: Working directory management and branch tracking using git2
// reference: https://docs.rs/git2

use crate::config::RepositoryConfig;
use crate::error::{MirrorError, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, RemoteCallbacks, Repository};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Tracking state of the local checkout. The repository handle only exists
/// once the first clone has completed.
enum RepoState {
    Uninitialized,
    Tracking(Repository),
}

/// Maintains one exclusively-owned working directory holding a checkout of
/// the tracked branch. `advance` converges it to the branch tip, cloning on
/// first use and fetching afterwards.
pub struct GitClient {
    config: RepositoryConfig,
    work_dir: TempDir,
    state: RepoState,
}

impl GitClient {
    /// Creates the client and its working directory. The directory lives for
    /// the lifetime of the client and is removed best-effort on drop.
    pub fn new(config: RepositoryConfig) -> Result<Self> {
        let work_dir = tempfile::Builder::new()
            .prefix("git-mirror-work-")
            .tempdir()?;

        debug!("Created working directory: {}", work_dir.path().display());

        Ok(Self {
            config,
            work_dir,
            state: RepoState::Uninitialized,
        })
    }

    /// Brings the working directory to the current tip of the tracked branch
    /// and returns its commit id. An unchanged remote is a success and still
    /// returns the current revision.
    pub fn advance(&mut self) -> Result<String> {
        match &self.state {
            RepoState::Uninitialized => {
                let repo = self.clone_branch()?;
                let revision = Self::head_revision(&repo)?;
                self.state = RepoState::Tracking(repo);
                Ok(revision)
            }
            RepoState::Tracking(repo) => self.fast_forward(repo),
        }
    }

    /// Read-only access for the mirror. Callers must not mutate the tree.
    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    /// Resolves the configured subtree against the working directory. A
    /// leading slash addresses the repository root, not the filesystem root.
    pub fn source_root(&self, source_path: &str) -> PathBuf {
        let relative = source_path.trim_start_matches('/');
        if relative.is_empty() {
            self.work_dir.path().to_path_buf()
        } else {
            self.work_dir.path().join(relative)
        }
    }

    fn clone_branch(&self) -> Result<Repository> {
        info!(
            "Cloning repository: {} (branch: {})",
            self.config.url, self.config.branch
        );

        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options(true));
        builder.branch(&self.config.branch);

        let repo = builder
            .clone(&self.config.url, self.work_dir.path())
            .map_err(|e| MirrorError::Checkout(format!("Clone failed: {}", e)))?;

        info!("Repository cloned successfully");
        Ok(repo)
    }

    fn fast_forward(&self, repo: &Repository) -> Result<String> {
        info!("Fetching latest changes from branch: {}", self.config.branch);

        let mut remote = repo
            .find_remote("origin")
            .map_err(|e| MirrorError::Update(format!("Failed to find remote: {}", e)))?;

        remote
            .fetch(
                &[&self.config.branch],
                Some(&mut self.fetch_options(false)),
                None,
            )
            .map_err(|e| MirrorError::Update(format!("Fetch failed: {}", e)))?;

        let fetch_head = repo
            .find_reference("FETCH_HEAD")
            .map_err(|e| MirrorError::Update(format!("Failed to find FETCH_HEAD: {}", e)))?;

        let fetch_commit = repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(|e| MirrorError::Update(format!("Failed to get commit: {}", e)))?;

        let analysis = repo
            .merge_analysis(&[&fetch_commit])
            .map_err(|e| MirrorError::Update(format!("Merge analysis failed: {}", e)))?;

        if analysis.0.is_up_to_date() {
            info!("Repository is up to date");
            return Self::head_revision(repo);
        }

        if !analysis.0.is_fast_forward() {
            return Err(MirrorError::Update(format!(
                "Branch {} has diverged from the local checkout",
                self.config.branch
            )));
        }

        info!("Fast-forward merge");
        let refname = format!("refs/heads/{}", self.config.branch);
        let mut reference = repo
            .find_reference(&refname)
            .map_err(|e| MirrorError::Update(format!("Failed to find reference: {}", e)))?;

        reference
            .set_target(fetch_commit.id(), "fast-forward")
            .map_err(|e| MirrorError::Update(format!("Failed to set target: {}", e)))?;

        repo.set_head(&refname)
            .map_err(|e| MirrorError::Update(format!("Failed to set HEAD: {}", e)))?;

        repo.checkout_head(Some(CheckoutBuilder::default().force()))
            .map_err(|e| MirrorError::Update(format!("Checkout failed: {}", e)))?;

        info!("Repository updated successfully");
        Self::head_revision(repo)
    }

    /// Depth applies to the initial clone only. An incremental fetch must
    /// bring the commits linking the old tip to the new one, or fast-forward
    /// analysis cannot see the ancestry.
    fn fetch_options(&self, shallow: bool) -> FetchOptions<'_> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|stats| {
            if stats.received_objects() == stats.total_objects() {
                debug!(
                    "Resolving deltas {}/{}",
                    stats.indexed_deltas(),
                    stats.total_deltas()
                );
            } else if stats.total_objects() > 0 {
                debug!(
                    "Received {}/{} objects",
                    stats.received_objects(),
                    stats.total_objects()
                );
            }
            true
        });

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        if shallow && self.config.depth > 0 {
            fetch_options.depth(self.config.depth as i32);
        }

        fetch_options
    }

    fn head_revision(repo: &Repository) -> Result<String> {
        let head = repo.head()?;
        let commit = head.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RepositoryConfig {
        RepositoryConfig {
            url: "https://example.invalid/repo.git".to_string(),
            branch: "main".to_string(),
            source_path: "/".to_string(),
            depth: 1,
        }
    }

    #[test]
    fn test_client_creates_working_directory() {
        let client = GitClient::new(test_config()).unwrap();
        assert!(client.work_dir().is_dir());
    }

    #[test]
    fn test_source_root_resolution() {
        let client = GitClient::new(test_config()).unwrap();

        assert_eq!(client.source_root("/"), client.work_dir());
        assert_eq!(client.source_root(""), client.work_dir());
        assert_eq!(client.source_root("/docs"), client.work_dir().join("docs"));
        assert_eq!(client.source_root("docs"), client.work_dir().join("docs"));
    }

    #[test]
    fn test_unreachable_remote_is_checkout_error() {
        let mut client = GitClient::new(test_config()).unwrap();

        let err = client.advance().unwrap_err();
        assert!(matches!(err, MirrorError::Checkout(_)));
        assert_eq!(err.phase(), "fetch");
    }
}
