//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Output format for the fmt layer
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("TESSERA_SERVICE_NAME")
                .unwrap_or_else(|_| "tessera-api".to_string()),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_format: match std::env::var("TESSERA_LOG_FORMAT") {
                Ok(s) if s.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Must be called once, before any
/// spans are entered.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    result.map_err(|e| ApiError::internal_error(format!("Failed to init tracing: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Tracing initialized"
    );
    Ok(())
}
