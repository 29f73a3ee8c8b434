// file: src/sync/status.rs
// description: Shared sync outcome snapshot consumed by health endpoints

use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Last-known outcome of the sync loop. Written only by the engine at cycle
/// boundaries; everything else sees cloned snapshots. `healthy` stays false
/// until the first cycle completes end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub healthy: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_revision: Option<String>,
    pub success_count: u64,
    pub error_count: u64,
    pub repo_url: String,
    pub branch: String,
    pub target_path: PathBuf,
}

impl SyncStatus {
    pub fn new(config: &Config) -> Self {
        Self {
            healthy: false,
            last_sync: None,
            last_revision: None,
            success_count: 0,
            error_count: 0,
            repo_url: config.repository.url.clone(),
            branch: config.repository.branch.clone(),
            target_path: config.mirror.target_path.clone(),
        }
    }

    pub(crate) fn record_success(&mut self, revision: String, completed_at: DateTime<Utc>) {
        self.healthy = true;
        self.last_revision = Some(revision);
        self.last_sync = Some(completed_at);
        self.success_count += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.healthy = false;
        self.error_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fresh_status() -> SyncStatus {
        SyncStatus::new(&Config::default_config())
    }

    #[test]
    fn test_starts_unhealthy() {
        let status = fresh_status();

        assert!(!status.healthy);
        assert_eq!(status.success_count, 0);
        assert_eq!(status.error_count, 0);
        assert_eq!(status.last_revision, None);
    }

    #[test]
    fn test_outcome_transitions() {
        let mut status = fresh_status();

        status.record_failure();
        assert!(!status.healthy);
        assert_eq!(status.error_count, 1);

        let now = Utc::now();
        status.record_success("a".repeat(40), now);
        assert!(status.healthy);
        assert_eq!(status.success_count, 1);
        assert_eq!(status.error_count, 1);
        assert_eq!(status.last_sync, Some(now));

        status.record_failure();
        assert!(!status.healthy);
        // The revision of the last good sync is kept for operators.
        assert_eq!(status.last_revision, Some("a".repeat(40)));
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut status = fresh_status();
        status.record_success("b".repeat(40), Utc::now());

        let value = serde_json::to_value(&status).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "healthy",
            "lastSync",
            "lastRevision",
            "successCount",
            "errorCount",
            "repoUrl",
            "branch",
            "targetPath",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }

        assert_eq!(value["healthy"], true);
        assert_eq!(value["successCount"], 1);
    }
}
