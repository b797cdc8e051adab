use actix_web::web;
use qrpass::config::settings::{AdminSettings, Settings};
use qrpass::db::memory::MemoryStore;
use qrpass::state::app_state::AppState;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const JWT_SECRET: &str = "test-secret";

/// Shared state over a fresh in-memory store
pub fn test_state(settings: Settings) -> web::Data<AppState<MemoryStore>> {
    web::Data::new(AppState::new(MemoryStore::new(), settings))
}

/// Settings with admin login enabled
pub fn admin_settings() -> Settings {
    Settings {
        admin: Some(AdminSettings {
            username: ADMIN_USERNAME.to_string(),
            password_hash: bcrypt::hash(ADMIN_PASSWORD, 4).expect("Failed to hash password"),
            jwt_secret: JWT_SECRET.to_string(),
        }),
        ..Settings::default()
    }
}

pub fn jwt_secret(settings: &Settings) -> Option<String> {
    settings.admin.as_ref().map(|admin| admin.jwt_secret.clone())
}

/// Build the full app under test
macro_rules! test_app {
    ($state:expr) => {{
        let secret = helpers::jwt_secret(&$state.settings);
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(move |cfg| {
                    qrpass::routes::init_routes::<qrpass::db::memory::MemoryStore>(cfg, secret)
                }),
        )
        .await
    }};
}
