// file: src/sync/scheduler.rs
// description: Cron trigger wiring for periodic sync cycles
// reference: https://docs.rs/tokio-cron-scheduler

use crate::error::{MirrorError, Result};
use crate::sync::SyncEngine;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Registers the sync job and starts the scheduler. The returned handle must
/// be kept alive; dropping it stops the trigger. Each firing runs the cycle
/// on a blocking task; an overlapping firing waits on the engine's cycle
/// lock instead of interleaving.
pub async fn start(engine: Arc<SyncEngine>, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| MirrorError::Schedule(e.to_string()))?;

    let job_engine = Arc::clone(&engine);
    let job = Job::new_async(cron, move |_id, _scheduler| {
        let engine = Arc::clone(&job_engine);
        Box::pin(async move { run_scheduled_cycle(engine).await })
    })
    .map_err(|e| MirrorError::Schedule(e.to_string()))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| MirrorError::Schedule(e.to_string()))?;

    scheduler
        .start()
        .await
        .map_err(|e| MirrorError::Schedule(e.to_string()))?;

    info!("Sync scheduled with cron expression: {}", cron);
    Ok(scheduler)
}

async fn run_scheduled_cycle(engine: Arc<SyncEngine>) {
    match tokio::task::spawn_blocking(move || engine.run_cycle()).await {
        // run_cycle logs its own outcome either way.
        Ok(_) => {}
        Err(e) => error!("Sync task panicked: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_invalid_cron_expression_is_a_schedule_error() {
        let target = TempDir::new().unwrap();
        let mut config = Config::default_config();
        config.mirror.target_path = target.path().to_path_buf();

        let engine = Arc::new(SyncEngine::new(config).unwrap());
        let err = match start(engine, "not a cron expression").await {
            Ok(_) => panic!("expected a schedule error"),
            Err(e) => e,
        };

        assert!(matches!(err, MirrorError::Schedule(_)));
    }
}
