use crate::config::settings::Settings;
use crate::db::store::QrStore;
use crate::services::change_feed::ChangeFeed;
use crate::services::refresher::StatsHub;

/// Shared across all workers through `web::Data`
pub struct AppState<S: QrStore> {
    pub store: S,
    pub settings: Settings,
    pub changes: ChangeFeed,
    pub stats: StatsHub,
}

impl<S: QrStore> AppState<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            store,
            settings,
            changes: ChangeFeed::new(),
            stats: StatsHub::new(),
        }
    }
}
