use std::sync::Arc;

use chrono::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::AppError;
use crate::service::alert_log::AlertLog;

/// Starts the alert log pruning scheduler
///
/// Runs once a day at midnight UTC and drops log blocks older than the retention window.
/// Pruning also runs once at startup, outside this scheduler.
///
/// # Arguments
/// - `alert_log`: Alert log whose local file is pruned
/// - `retention`: Age beyond which blocks are removed
pub async fn start_scheduler(alert_log: Arc<AlertLog>, retention: Duration) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job_log = alert_log.clone();

    // Schedule job to run daily at midnight
    let job = Job::new_async("0 0 0 * * *", move |_uuid, _lock| {
        let alert_log = job_log.clone();

        Box::pin(async move {
            if let Err(e) = alert_log.prune(retention).await {
                tracing::error!("Error pruning alert log: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Alert log pruning scheduler started");

    Ok(())
}
