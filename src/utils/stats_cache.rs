//! Short-TTL cache for the dashboard statistics endpoint.
//!
//! Admin dashboards poll statistics every few seconds; the numbers only
//! change on a clock mutation, so handlers invalidate on every successful
//! clock-in/out and the TTL covers everything else.

use anyhow::Result;
use chrono::NaiveDate;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

use crate::engine::{AttendanceEngine, DashboardStats};

static STATS_CACHE: Lazy<Cache<NaiveDate, DashboardStats>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(8)
        .time_to_live(Duration::from_secs(5))
        .build()
});

pub async fn lookup(date: NaiveDate) -> Option<DashboardStats> {
    STATS_CACHE.get(&date).await
}

pub async fn store(date: NaiveDate, stats: DashboardStats) {
    STATS_CACHE.insert(date, stats).await;
}

/// Called after every successful clock mutation so the dashboard never
/// serves numbers from before the write.
pub fn invalidate() {
    STATS_CACHE.invalidate_all();
}

/// Compute and cache today's statistics once at startup.
pub async fn warmup(engine: &AttendanceEngine) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let stats = engine.statistics().await?;
    store(today, stats).await;
    tracing::info!("Statistics cache warmup complete");
    Ok(())
}
