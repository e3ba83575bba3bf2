//! Logging setup and server lifecycle events.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::parse_bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tarkov_board=debug`.
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// `TARKOV_LOG_LEVEL`, `TARKOV_LOG_FORMAT` (`json`/`pretty`) and
/// `TARKOV_LOG_TARGET`; unreadable values keep the default.
pub fn logging_config_from_env() -> LoggingConfig {
    let defaults = LoggingConfig::default();
    let var = |key: &str| env::var(key).ok().filter(|raw| !raw.trim().is_empty());

    LoggingConfig {
        level: var("TARKOV_LOG_LEVEL")
            .map(|raw| raw.trim().to_string())
            .unwrap_or(defaults.level),
        format: var("TARKOV_LOG_FORMAT")
            .and_then(|raw| LogFormat::parse(&raw))
            .unwrap_or(defaults.format),
        include_target: var("TARKOV_LOG_TARGET")
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(defaults.include_target),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_ansi(matches!(config.format, LogFormat::Pretty));

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

pub fn log_app_start(config: &LoggingConfig) {
    info!(
        component = "dashboard_server",
        event = "app.start",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        log_format = ?config.format,
        include_target = config.include_target
    );
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "dashboard_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        routes = "/dashboard,/dashboard/snapshot,/dashboard/timers"
    );
}

/// `refresh_interval_ms` is `None` when no refresh loop runs (demo data).
pub fn log_source_selected(source: &str, reason: Option<&str>, refresh_interval_ms: Option<u64>) {
    info!(
        component = "dashboard_server",
        event = "source.selected",
        source,
        reason,
        refresh_interval_ms
    );
}

pub fn log_timers_started(refresh_interval_ms: Option<u64>, clock_interval_ms: u64) {
    info!(
        component = "dashboard_server",
        event = "timers.start",
        refresh_enabled = refresh_interval_ms.is_some(),
        refresh_interval_ms,
        clock_interval_ms
    );
}
