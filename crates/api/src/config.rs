use dossier_core::autosave::{
    SyncPolicy, DEFAULT_AUTOSAVE_DEBOUNCE_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_JITTER_MS,
};
use dossier_core::promo::{TrackPricing, DEFAULT_PRICE_PP_EUR, DEFAULT_PRICE_SRL_EUR};

use crate::auth::jwt::JwtConfig;

/// Which [`DossierStore`](dossier_core::store::DossierStore) backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local maps. State is lost on restart.
    Memory,
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to drain after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT verification settings.
    pub jwt: JwtConfig,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    /// Shared secret for payment notifications. Without it the payment
    /// webhook rejects every call.
    pub payment_webhook_secret: Option<String>,
    pub pricing: TrackPricing,
    /// Polling and autosave timings served to clients.
    pub sync_policy: SyncPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                 |
    /// | `PORT`                   | `3000`                                    |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                   |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                                      |
    /// | `STORE_BACKEND`          | `postgres` if `DATABASE_URL` is set, else `memory` |
    /// | `DATABASE_URL`           | --                                        |
    /// | `PAYMENT_WEBHOOK_SECRET` | --                                        |
    /// | `PRICE_SRL_EUR`          | `1250`                                    |
    /// | `PRICE_PP_EUR`           | `450`                                     |
    /// | `POLL_INTERVAL_MS`       | `4000`                                    |
    /// | `POLL_JITTER_MS`         | `500`                                     |
    /// | `AUTOSAVE_DEBOUNCE_MS`   | `400`                                     |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values, and when `STORE_BACKEND=postgres` is
    /// requested without `DATABASE_URL`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => StoreBackend::parse(&value)
                .unwrap_or_else(|| panic!("STORE_BACKEND must be 'memory' or 'postgres', got '{value}'")),
            Err(_) if database_url.is_some() => StoreBackend::Postgres,
            Err(_) => StoreBackend::Memory,
        };
        assert!(
            store_backend == StoreBackend::Memory || database_url.is_some(),
            "DATABASE_URL must be set when STORE_BACKEND=postgres"
        );

        let payment_webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let pricing = TrackPricing {
            srl_eur: env_or("PRICE_SRL_EUR", DEFAULT_PRICE_SRL_EUR),
            pp_eur: env_or("PRICE_PP_EUR", DEFAULT_PRICE_PP_EUR),
        };

        let sync_policy = SyncPolicy {
            poll_interval_ms: env_or("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            poll_jitter_ms: env_or("POLL_JITTER_MS", DEFAULT_POLL_JITTER_MS),
            autosave_debounce_ms: env_or("AUTOSAVE_DEBOUNCE_MS", DEFAULT_AUTOSAVE_DEBOUNCE_MS),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            store_backend,
            database_url,
            payment_webhook_secret,
            pricing,
            sync_policy,
        }
    }
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number")),
        Err(_) => default,
    }
}
