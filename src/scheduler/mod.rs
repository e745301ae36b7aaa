//! Periodic delivery job
//!
//! At most one job exists at a time. Each firing spawns the cycle in its own
//! task and waits for it, so scheduled cycles never overlap each other, and
//! aborting the job (disable, interval change) leaves an in-flight cycle to
//! run to completion, cleanup included.

use crate::pipeline::{CycleTrigger, DeliveryPipeline};
use crate::utils::config::{Settings, MAX_INTERVAL_MINUTES};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// The installed periodic job
struct ScheduledJob {
    interval_minutes: u64,
    installed_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    pipeline: Arc<DeliveryPipeline>,
    job: Mutex<Option<ScheduledJob>>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<DeliveryPipeline>) -> Self {
        Self {
            pipeline,
            job: Mutex::new(None),
        }
    }

    /// Replace the current job according to `settings`.
    ///
    /// Installs a job only when `enabled` and at least one playlist is set.
    /// Intervals outside 1..=[`MAX_INTERVAL_MINUTES`] are clamped into range.
    pub async fn reconfigure(&self, settings: &Settings) {
        let mut job = self.job.lock().await;
        if let Some(old) = job.take() {
            old.handle.abort();
        }

        if !settings.should_schedule() {
            info!("Scheduler idle (disabled or no playlists)");
            return;
        }

        let interval_minutes = settings.interval_minutes.clamp(1, MAX_INTERVAL_MINUTES);
        let handle = tokio::spawn(run_job(self.pipeline.clone(), interval_minutes));
        *job = Some(ScheduledJob {
            interval_minutes,
            installed_at: Utc::now(),
            handle,
        });

        info!(
            "Scheduler started - sending music every {} minute(s)",
            interval_minutes
        );
    }

    /// Cancel the job, if any. A running cycle is not interrupted.
    pub async fn clear(&self) {
        if let Some(old) = self.job.lock().await.take() {
            old.handle.abort();
            info!("Scheduled job removed");
        }
    }

    pub async fn is_scheduled(&self) -> bool {
        self.job.lock().await.is_some()
    }

    pub async fn interval_minutes(&self) -> Option<u64> {
        self.job.lock().await.as_ref().map(|job| job.interval_minutes)
    }

    /// Wall-clock time of the next firing, `None` when idle or not representable
    pub async fn next_run(&self) -> Option<DateTime<Utc>> {
        let job = self.job.lock().await;
        let job = job.as_ref()?;
        next_firing(job.installed_at, job.interval_minutes, Utc::now())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.handle.abort();
        }
    }
}

/// First firing strictly after `now` for a job installed at `installed_at`
fn next_firing(
    installed_at: DateTime<Utc>,
    interval_minutes: u64,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let period = TimeDelta::try_minutes(i64::try_from(interval_minutes).ok()?)?;
    let period_secs = period.num_seconds().max(1);
    let fired = (now - installed_at).num_seconds().max(0) / period_secs;
    let offset = TimeDelta::try_seconds(fired.checked_add(1)?.checked_mul(period_secs)?)?;
    installed_at.checked_add_signed(offset)
}

async fn run_job(pipeline: Arc<DeliveryPipeline>, interval_minutes: u64) {
    let period = Duration::from_secs(interval_minutes.saturating_mul(60));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let cycle_pipeline = pipeline.clone();
        let cycle = tokio::spawn(async move { cycle_pipeline.run(CycleTrigger::Scheduled).await });
        if let Err(e) = cycle.await {
            error!("Scheduled cycle panicked: {}", e);
        }
    }
}
