use serde::Deserialize;

use crate::models::stats::StatsFilter;

#[derive(Deserialize)]
pub struct StatsQuery {
    pub filter: Option<StatsFilter>, // all (default), scanned, unscanned
}
