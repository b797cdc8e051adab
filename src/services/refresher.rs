use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use actix_web::web;
use log::{debug, error, info, warn};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::time::interval;

use crate::db::store::{QrStore, StoreError};
use crate::models::stats::DashboardStats;
use crate::services::change_feed::ChangeEvent;
use crate::services::stats::recompute;
use crate::state::app_state::AppState;

/// Latest computed dashboard stats. Each refresh replaces the whole value.
#[derive(Default)]
pub struct StatsHub {
    latest: RwLock<Option<Arc<DashboardStats>>>,
}

impl StatsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<DashboardStats>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn publish(&self, stats: Arc<DashboardStats>) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(stats);
    }
}

/// Snapshot the store, recompute and publish. Every trigger goes through here.
pub async fn refresh_stats<S: QrStore>(
    store: &S,
    hub: &StatsHub,
    recent_limit: usize,
) -> Result<Arc<DashboardStats>, StoreError> {
    let snapshot = store.snapshot().await?;
    let now = chrono::Utc::now().timestamp_millis();
    let stats = Arc::new(recompute(&snapshot, now, recent_limit));
    hub.publish(stats.clone());
    Ok(stats)
}

/// Consume every event already queued, returning how many were skipped.
fn drain_pending(changes: &mut Receiver<ChangeEvent>) -> u64 {
    let mut skipped = 0;
    loop {
        match changes.try_recv() {
            Ok(_) => skipped += 1,
            Err(TryRecvError::Lagged(n)) => skipped += n,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return skipped,
        }
    }
}

/// Recompute on every tick of `every` and on every change event.
///
/// Events queued while a refresh runs are folded into the next one. The two
/// triggers are independent; whichever refresh finishes last wins.
pub async fn run_refresher<S: QrStore + 'static>(
    state: web::Data<AppState<S>>,
    every: Duration,
) {
    info!("Stats refresher started (every {:?})", every);

    let mut changes = state.changes.subscribe();
    let mut tick = interval(every);
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            event = changes.recv() => match event {
                Ok(event) => debug!("Refreshing stats after {:?}", event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Stats refresher lagged, {} change events skipped", skipped);
                }
                Err(RecvError::Closed) => {
                    info!("Change feed closed, stopping stats refresher");
                    return;
                }
            },
        }

        let coalesced = drain_pending(&mut changes);
        if coalesced > 0 {
            debug!("Folded {} queued change events into this refresh", coalesced);
        }

        let recent_limit = state.settings.stats_recent_limit;
        if let Err(e) = refresh_stats(&state.store, &state.stats, recent_limit).await {
            error!("Stats refresh failed: {}", e);
        }
    }
}
