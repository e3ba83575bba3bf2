//! Server configuration from `TARKOV_*` environment variables.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use crate::clock::ClockSettings;
use crate::dashboard::BoardSettings;
use crate::tarkov_api::ApiConfig;
use crate::valuation::MissingPricePolicy;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub bind_addr: SocketAddr,
    pub api: ApiConfig,
    pub refresh_interval_ms: u64,
    pub clock_interval_ms: u64,
    pub use_demo: bool,
    pub board: BoardSettings,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api: ApiConfig::default(),
            refresh_interval_ms: 60_000,
            clock_interval_ms: 1_000,
            use_demo: false,
            board: BoardSettings::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid TARKOV_DASHBOARD_ADDR {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Reads the environment. Only an unparseable bind address is fatal; other
/// bad values are logged and replaced by their defaults.
pub fn board_config_from_env() -> Result<BoardConfig, ConfigError> {
    let mut config = BoardConfig::default();

    if let Some(raw) = non_empty_var("TARKOV_DASHBOARD_ADDR") {
        config.bind_addr = raw
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidBindAddr {
                value: raw.clone(),
                message: err.to_string(),
            })?;
    }

    if let Some(raw) = non_empty_var("TARKOV_API_URL") {
        config.api.endpoint = raw;
    }

    if let Some(items) = non_empty_var("TARKOV_MARKET_ITEMS").map(|raw| parse_name_list(&raw)) {
        if !items.is_empty() {
            config.api.market_items = items;
        }
    }

    if let Some(value) = parsed_var("TARKOV_HTTP_TIMEOUT_MS", parse_positive_u64) {
        config.api.http_timeout_ms = value;
    }
    if let Some(value) = parsed_var("TARKOV_REFRESH_INTERVAL_MS", parse_positive_u64) {
        config.refresh_interval_ms = value;
    }
    if let Some(value) = parsed_var("TARKOV_CLOCK_INTERVAL_MS", parse_positive_u64) {
        config.clock_interval_ms = value;
    }
    if let Some(value) = parsed_var("TARKOV_MIN_PROFIT", |raw| raw.parse::<i64>().ok()) {
        config.board.min_profit = value;
    }
    if let Some(value) = parsed_var("TARKOV_MISSING_PRICE_PENALTY", |raw| {
        raw.parse::<i64>().ok()
    }) {
        config.board.missing_price_policy = MissingPricePolicy::Penalty(value);
    }
    if let Some(value) = parsed_var("TARKOV_CLOCK_DILATION", parse_finite_f64) {
        config.board.clock = ClockSettings {
            dilation_factor: value,
            ..config.board.clock
        };
    }
    if let Some(value) = parsed_var("TARKOV_CLOCK_OFFSET_S", parse_finite_f64) {
        config.board.clock = ClockSettings {
            offset_seconds: value,
            ..config.board.clock
        };
    }
    if let Some(value) = parsed_var("TARKOV_DASHBOARD_USE_DEMO", parse_bool) {
        config.use_demo = value;
    }

    Ok(config)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parsed_var<T>(key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = non_empty_var(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(
            component = "config",
            event = "config.invalid_value",
            key,
            value = %raw
        );
    }
    parsed
}

fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive_u64(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|value| *value > 0)
}

fn parse_finite_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
