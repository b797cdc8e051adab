use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown store backend '{}'", other)),
        }
    }
}

/// Credentials guarding the admin dashboard
#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub username: String,
    pub password_hash: String, // bcrypt
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub bind_addr: String,
    pub public_base_url: String, // Prefix of the URL encoded in each QR code
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub redirect_url: String, // Where a successful scan lands
    pub redirect_delay_secs: u64,
    pub stats_refresh_secs: u64,
    pub stats_recent_limit: usize,
    pub fingerprint_salt: String,
    pub cors_origins: Vec<String>,
    pub admin: Option<AdminSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: "127.0.0.1".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            store_backend: StoreBackend::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "qrpass".to_string(),
            redirect_url: "http://www.hellomealsonme.com".to_string(),
            redirect_delay_secs: 3,
            stats_refresh_secs: 10,
            stats_recent_limit: 50,
            fingerprint_salt: "qrpass_salt".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:4173".to_string(),
            ],
            admin: None,
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to development defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        let settings = Self {
            port: parse_or("PORT", defaults.port)?,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            store_backend: parse_or("STORE_BACKEND", StoreBackend::MongoDb)?,
            mongodb_uri: env::var("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_db: env::var("MONGODB_DB").unwrap_or(defaults.mongodb_db),
            redirect_url: env::var("REDIRECT_URL").unwrap_or(defaults.redirect_url),
            redirect_delay_secs: parse_or("REDIRECT_DELAY_SECS", defaults.redirect_delay_secs)?,
            stats_refresh_secs: parse_or("STATS_REFRESH_SECS", defaults.stats_refresh_secs)?,
            stats_recent_limit: parse_or("STATS_RECENT_LIMIT", defaults.stats_recent_limit)?,
            fingerprint_salt: env::var("FINGERPRINT_SALT").unwrap_or(defaults.fingerprint_salt),
            cors_origins,
            admin: admin_from_env()?,
        };

        if settings.stats_refresh_secs == 0 {
            bail!("STATS_REFRESH_SECS must be greater than zero");
        }

        Ok(settings)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid {} value '{}': {}", key, raw, e)),
        Err(_) => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

fn admin_from_env() -> Result<Option<AdminSettings>> {
    let username = env::var("ADMIN_USERNAME").ok();
    let password_hash = env::var("ADMIN_PASSWORD_HASH").ok();

    match (username, password_hash) {
        (Some(username), Some(password_hash)) => {
            let jwt_secret = env::var("JWT_SECRET")
                .context("JWT_SECRET must be set when admin credentials are configured")?;
            Ok(Some(AdminSettings {
                username,
                password_hash,
                jwt_secret,
            }))
        }
        (None, None) => {
            warn!("ADMIN_USERNAME/ADMIN_PASSWORD_HASH not set, admin routes are unauthenticated");
            Ok(None)
        }
        _ => bail!("ADMIN_USERNAME and ADMIN_PASSWORD_HASH must be set together"),
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::MongoDb => write!(f, "mongodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}
