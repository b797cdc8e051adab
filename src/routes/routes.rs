use actix_web::web;

use crate::db::store::QrStore;
use crate::handlers::auth_handlers::login;
use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{generate_qr, get_qr_image};
use crate::handlers::scan_handlers::{scan_api, scan_page};
use crate::handlers::stats_handlers::{force_refresh, get_stats};
use crate::middlewares::authmw::JwtAuth;

/// Configure the routes
pub fn init_routes<S: QrStore + 'static>(cfg: &mut web::ServiceConfig, jwt_secret: Option<String>) {
    // The URL encoded in every QR code
    cfg.route("/scan/{code}", web::get().to(scan_page::<S>));
    // Authentication routes - no auth required
    cfg.service(web::scope("/api/auth").route("/login", web::post().to(login::<S>)));
    // Admin dashboard - requires a bearer token when admin credentials are configured
    cfg.service(
        web::scope("/api/admin")
            .wrap(JwtAuth { secret: jwt_secret })
            .route("/stats", web::get().to(get_stats::<S>))
            .route("/stats/refresh", web::post().to(force_refresh::<S>)),
    );
    // Public API
    cfg.service(
        web::scope("/api")
            .route("/scan/{code}", web::get().to(scan_api::<S>))
            .route("/qr", web::post().to(generate_qr::<S>))
            .route("/qr/{code}/image", web::get().to(get_qr_image::<S>))
            .route("/health/check", web::get().to(health_check::<S>)),
    );
}
