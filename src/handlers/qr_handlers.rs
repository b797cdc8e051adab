use actix_web::{HttpResponse, Responder, Result, error, web};
use validator::Validate;

use crate::db::store::QrStore;
use crate::services::change_feed::ChangeEvent;
use crate::services::generator::{generate_code, scan_url};
use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    GenerateQrRequest, GenerateQrResponse, QrImageFormat, QrImageParams,
};
use crate::utils::render::{DEFAULT_SIZE, render_png, render_svg};

/// Generate a new two-minute QR code. The body is optional; an empty one means
/// default rendering.
pub async fn generate_qr<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    body: web::Bytes,
) -> Result<impl Responder> {
    let req = if body.is_empty() {
        GenerateQrRequest::default()
    } else {
        match serde_json::from_slice::<GenerateQrRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Invalid request body: {}", e)
                })));
            }
        }
    };
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let now = chrono::Utc::now().timestamp_millis();
    let generated = generate_code(&app_state.store, &app_state.settings.public_base_url, now)
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("{:#}", e)))?;

    let svg = render_svg(&generated.scan_url, req.size.unwrap_or(DEFAULT_SIZE))
        .map_err(|e| error::ErrorInternalServerError(format!("{:#}", e)))?;

    app_state.changes.publish(ChangeEvent::CodeCreated {
        code: generated.qr.code.clone(),
    });

    Ok(HttpResponse::Created().json(GenerateQrResponse {
        id: generated.qr.id_hex(),
        code: generated.qr.code,
        scan_url: generated.scan_url,
        created_at: generated.qr.created_at,
        expires_at: generated.qr.expires_at,
        svg,
    }))
}

/// Render the image of an existing, still valid code
pub async fn get_qr_image<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    path: web::Path<String>,
    query: web::Query<QrImageParams>,
) -> Result<impl Responder> {
    if let Err(errors) = query.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let code = path.into_inner();
    let qr = app_state
        .store
        .find_code(&code)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let Some(qr) = qr else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "QR code not found"
        })));
    };

    if qr.is_expired_at(chrono::Utc::now().timestamp_millis()) {
        return Ok(HttpResponse::Gone().json(serde_json::json!({
            "error": "This QR code has expired"
        })));
    }

    let url = scan_url(&app_state.settings.public_base_url, &qr.code);
    let size = query.size.unwrap_or(DEFAULT_SIZE);

    match query.format.unwrap_or_default() {
        QrImageFormat::Svg => {
            let svg = render_svg(&url, size)
                .map_err(|e| error::ErrorInternalServerError(format!("{:#}", e)))?;
            Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
        }
        QrImageFormat::Png => {
            let png = render_png(&url, size)
                .map_err(|e| error::ErrorInternalServerError(format!("{:#}", e)))?;
            Ok(HttpResponse::Ok().content_type("image/png").body(png))
        }
    }
}
