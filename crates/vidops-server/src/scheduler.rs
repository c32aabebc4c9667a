//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring link-reconciliation sweep.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::run_reconcile_sweep;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<vidops_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_reconcile_job(&scheduler, pool, &config.reconcile_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring reconciliation sweep (hourly by default,
/// overridable via `VIDOPS_RECONCILE_CRON`).
///
/// Each run walks every account and clears links whose content item was
/// deleted or whose titles no longer overlap.
async fn register_reconcile_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            tracing::info!("scheduler: starting link-reconciliation sweep");
            run_reconcile_all(&pool).await;
            tracing::info!("scheduler: link-reconciliation sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drive the reconciliation sweep for every account with a channel.
async fn run_reconcile_all(pool: &PgPool) {
    let accounts = match vidops_db::list_account_ids(pool).await {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load account ids");
            return;
        }
    };

    for account_id in accounts {
        match run_reconcile_sweep(pool, account_id).await {
            Ok(summary) if summary.cleared > 0 => {
                tracing::info!(
                    %account_id,
                    cleared = summary.cleared,
                    "scheduler: account sweep cleared links"
                );
            }
            Ok(_) => {}
            Err(e) => {
                // One bad account must not stop the rest of the sweep.
                tracing::error!(error = %e, %account_id, "scheduler: account sweep failed");
            }
        }
    }
}
