// file: src/sync/engine.rs
// description: Sync cycle orchestration and shared status ownership

use crate::config::Config;
use crate::error::Result;
use crate::mirror::TreeMirror;
use crate::repository::GitClient;
use crate::sync::status::SyncStatus;
use chrono::Utc;
use std::sync::{Mutex, RwLock};
use tracing::{error, info};

/// Runs synchronization cycles and owns the authoritative status snapshot.
/// Cycles are serialized through the client mutex; status readers only ever
/// contend with the brief write at the end of a cycle.
pub struct SyncEngine {
    config: Config,
    client: Mutex<GitClient>,
    mirror: TreeMirror,
    status: RwLock<SyncStatus>,
}

impl SyncEngine {
    pub fn new(config: Config) -> Result<Self> {
        let client = GitClient::new(config.repository.clone())?;
        let status = SyncStatus::new(&config);

        Ok(Self {
            config,
            client: Mutex::new(client),
            mirror: TreeMirror::new(),
            status: RwLock::new(status),
        })
    }

    /// Performs one cycle: advance the checkout, mirror the subtree, record
    /// the outcome. Blocking; async callers should use `spawn_blocking`. A
    /// concurrent trigger waits on the client lock rather than interleaving.
    pub fn run_cycle(&self) -> Result<String> {
        let mut client = self.client.lock().unwrap_or_else(|e| e.into_inner());

        info!(
            "Starting sync from {} (branch: {})",
            self.config.repository.url, self.config.repository.branch
        );

        let outcome = self.advance_and_mirror(&mut client);

        // Single critical section per terminal transition; readers never see
        // a half-updated status.
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        match outcome {
            Ok(revision) => {
                status.record_success(revision.clone(), Utc::now());
                info!(
                    "Sync completed successfully (commit: {})",
                    &revision[..revision.len().min(7)]
                );
                Ok(revision)
            }
            Err(e) => {
                status.record_failure();
                error!("Sync failed in {} phase: {}", e.phase(), e);
                Err(e)
            }
        }
    }

    fn advance_and_mirror(&self, client: &mut GitClient) -> Result<String> {
        let revision = client.advance()?;
        let source = client.source_root(&self.config.repository.source_path);
        self.mirror.copy(&source, &self.config.mirror.target_path)?;
        Ok(revision)
    }

    /// Consistent copy of the current status for external readers.
    pub fn snapshot(&self) -> SyncStatus {
        self.status.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_healthy(&self) -> bool {
        self.status.read().unwrap_or_else(|e| e.into_inner()).healthy
    }
}
