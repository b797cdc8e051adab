use actix_web::{HttpResponse, Result, error, web};
use log::info;

use crate::db::store::QrStore;
use crate::services::refresher::refresh_stats;
use crate::services::stats::filter_view;
use crate::state::app_state::AppState;
use crate::structs::stats_request::StatsQuery;
use crate::utils::jwt::Claims;

/// Dashboard stats from the last refresh, computing them if none exist yet
pub async fn get_stats<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse> {
    let stats = match app_state.stats.latest() {
        Some(stats) => stats,
        None => refresh_stats(
            &app_state.store,
            &app_state.stats,
            app_state.settings.stats_recent_limit,
        )
        .await
        .map_err(error::ErrorInternalServerError)?,
    };

    let view = filter_view(&stats, query.filter.unwrap_or_default());
    Ok(HttpResponse::Ok().json(view))
}

/// Recompute now instead of waiting for the next tick
pub async fn force_refresh<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    query: web::Query<StatsQuery>,
    claims: Option<web::ReqData<Claims>>,
) -> Result<HttpResponse> {
    match claims {
        Some(claims) => info!("Stats refresh requested by {}", claims.sub),
        None => info!("Stats refresh requested"),
    }

    let stats = refresh_stats(
        &app_state.store,
        &app_state.stats,
        app_state.settings.stats_recent_limit,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    let view = filter_view(&stats, query.filter.unwrap_or_default());
    Ok(HttpResponse::Ok().json(view))
}
