use actix_web::{HttpResponse, Result, error, web};
use bcrypt::verify;
use log::{info, warn};
use validator::Validate;

use crate::db::store::QrStore;
use crate::state::app_state::AppState;
use crate::structs::auth_request::{LoginRequest, LoginResponse};
use crate::utils::jwt::create_token;

/// Exchange admin credentials for a bearer token
pub async fn login<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let Some(admin) = app_state.settings.admin.as_ref() else {
        return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "Admin login is not configured"
        })));
    };

    let password_matches = req.username == admin.username
        && verify(&req.password, &admin.password_hash)
            .map_err(|_| error::ErrorInternalServerError("Password verification failed"))?;

    if !password_matches {
        warn!("Failed admin login for '{}'", req.username);
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        })));
    }

    let token = create_token(&admin.username, &admin.jwt_secret).map_err(|e| {
        error::ErrorInternalServerError(format!("Token generation failed: {}", e))
    })?;

    info!("Admin '{}' logged in", admin.username);
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        username: admin.username.clone(),
    }))
}
