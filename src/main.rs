use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};

use qrpass::config::settings::{Settings, StoreBackend};
use qrpass::db::memory::MemoryStore;
use qrpass::db::mongodb::{MongoStore, get_database};
use qrpass::db::store::QrStore;
use qrpass::routes::init_routes;
use qrpass::services::refresher::run_refresher;
use qrpass::state::app_state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env()?;
    info!("Using {} store backend", settings.store_backend);

    match settings.store_backend {
        StoreBackend::MongoDb => {
            let db = get_database(&settings.mongodb_uri, &settings.mongodb_db).await?;
            let store = MongoStore::new(db);
            store.ensure_indexes().await?;
            serve(store, settings).await?;
        }
        StoreBackend::Memory => {
            warn!("In-memory store selected, data is lost on restart");
            serve(MemoryStore::new(), settings).await?;
        }
    }

    Ok(())
}

async fn serve<S: QrStore + 'static>(store: S, settings: Settings) -> std::io::Result<()> {
    let bind = (settings.bind_addr.clone(), settings.port);
    let refresh_every = Duration::from_secs(settings.stats_refresh_secs);
    let cors_origins = settings.cors_origins.clone();
    let jwt_secret = settings.admin.as_ref().map(|admin| admin.jwt_secret.clone());

    // Create shared state
    let app_state = web::Data::new(AppState::new(store, settings));

    // Timer- and change-driven dashboard refresh
    actix_web::rt::spawn(run_refresher(app_state.clone(), refresh_every));

    info!("Listening on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        let jwt_secret = jwt_secret.clone();

        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(move |cfg| init_routes::<S>(cfg, jwt_secret))
    })
    .bind(bind)?
    .run()
    .await
}
