//! API configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown store backend '{0}' (expected 'postgres' or 'memory')")]
pub struct UnknownStoreKind(pub String);

impl FromStr for StoreKind {
    type Err = UnknownStoreKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            other => Err(UnknownStoreKind(other.to_string())),
        }
    }
}

/// Interpret an environment flag. Accepts `true`, `1` and `yes`.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| parse_flag(&s))
        .unwrap_or(default)
}

/// Service-level settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Create the record table on startup
    pub db_auto_migrate: bool,
    /// Rebuild the search index once on startup
    pub repopulate_on_start: bool,
    /// Mount the operator rebuild route
    pub admin_repopulate: bool,
    /// Store backend
    pub store: StoreKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            db_auto_migrate: false,
            repopulate_on_start: false,
            admin_repopulate: true,
            store: StoreKind::Postgres,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// `PORT` wins over `TESSERA_API_PORT` so the binary runs unchanged on
    /// platforms that inject it. An unrecognised `TESSERA_STORE` falls back to
    /// Postgres with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("TESSERA_API_PORT"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let store = match std::env::var("TESSERA_STORE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: UnknownStoreKind| {
                tracing::warn!(error = %e, "falling back to postgres store");
                StoreKind::Postgres
            }),
            Err(_) => defaults.store,
        };

        Self {
            bind: std::env::var("TESSERA_API_BIND").unwrap_or(defaults.bind),
            port,
            db_auto_migrate: env_flag("TESSERA_DB_AUTO_MIGRATE", defaults.db_auto_migrate),
            repopulate_on_start: env_flag(
                "TESSERA_REPOPULATE_ON_START",
                defaults.repopulate_on_start,
            ),
            admin_repopulate: env_flag("TESSERA_ADMIN_REPOPULATE", defaults.admin_repopulate),
            store,
        }
    }

    /// `bind:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Search backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Elasticsearch base URL; `None` selects the in-process index
    pub elasticsearch_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            elasticsearch_url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self {
            elasticsearch_url: std::env::var("TESSERA_ELASTICSEARCH_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            timeout: Duration::from_secs(
                std::env::var("TESSERA_SEARCH_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}
