use actix_web::{HttpResponse, web};

use crate::db::store::QrStore;
use crate::state::app_state::AppState;

pub async fn health_check<S: QrStore + 'static>(state: web::Data<AppState<S>>) -> HttpResponse {
    // Round-trip to the store so a dead database reports unhealthy
    match state.store.ping().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(_) => HttpResponse::InternalServerError()
            .json(serde_json::json!({ "success": false, "error": "Database connection failed" })),
    }
}
