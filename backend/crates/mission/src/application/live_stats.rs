//! Live dashboard statistics
//!
//! One background task per process listens to row-change notifications and
//! re-fetches [`DashboardStats`] on every change. The latest snapshot is held
//! in a `watch` channel; dashboards subscribe to it and see every refresh.

use crate::domain::entities::DashboardStats;
use crate::domain::repository::{ChangeFeed, StatsRepository};
use crate::domain::value_objects::Actor;
use crate::error::{MissionError, MissionResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Ceiling for the backoff between failed feed reads
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

pub struct LiveStats {
    receiver: watch::Receiver<DashboardStats>,
    refresher: JoinHandle<()>,
}

impl LiveStats {
    /// Load the first snapshot, then keep it fresh from `feed`
    ///
    /// Feed errors are retried after `retry_delay`, doubling while they
    /// persist; only the end of the feed stops the refresher.
    pub async fn start<R, F>(
        stats_repo: Arc<R>,
        feed: F,
        retry_delay: Duration,
    ) -> MissionResult<Self>
    where
        R: StatsRepository + Send + Sync + 'static,
        F: ChangeFeed + Send + 'static,
    {
        let initial = stats_repo.dashboard_stats().await?;
        let (sender, receiver) = watch::channel(initial);
        let refresher = tokio::spawn(refresh_loop(stats_repo, feed, sender, retry_delay));

        tracing::info!("Live stats refresher started");

        Ok(Self {
            receiver,
            refresher,
        })
    }

    /// New subscription starting at the current snapshot
    pub fn subscribe(&self) -> watch::Receiver<DashboardStats> {
        self.receiver.clone()
    }

    pub fn snapshot(&self) -> DashboardStats {
        self.receiver.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.refresher.is_finished()
    }

    /// Stop listening for changes; subscribers keep the last snapshot
    pub fn shutdown(self) {
        self.refresher.abort();
        tracing::info!("Live stats refresher stopped");
    }
}

async fn refresh_loop<R, F>(
    stats_repo: Arc<R>,
    mut feed: F,
    sender: watch::Sender<DashboardStats>,
    retry_delay: Duration,
) where
    R: StatsRepository + Send + Sync + 'static,
    F: ChangeFeed + Send + 'static,
{
    let mut delay = retry_delay;

    loop {
        match feed.next_change().await {
            Ok(Some(change)) => {
                delay = retry_delay;
                tracing::debug!(
                    table = %change.table,
                    op = ?change.op,
                    "Refreshing dashboard stats"
                );
            }
            Ok(None) => {
                tracing::info!("Change feed ended");
                break;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Change feed failed"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
                // Changes may have been missed meanwhile
                tracing::debug!("Resyncing dashboard stats");
            }
        }

        match stats_repo.dashboard_stats().await {
            Ok(stats) => {
                // send_replace: keep updating even with no live subscribers
                sender.send_replace(stats);
            }
            Err(e) => {
                // Keep the previous snapshot; the next change retries
                tracing::warn!(error = %e, "Dashboard stats refresh failed");
            }
        }
    }
}

/// Admin gate shared by the snapshot and stream endpoints
pub fn ensure_can_view_stats(actor: &Actor) -> MissionResult<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(MissionError::Forbidden)
    }
}
