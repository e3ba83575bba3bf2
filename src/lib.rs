//! Escape from Tarkov market board.
//!
//! Polls the tarkov.dev GraphQL API into immutable snapshots and derives:
//! - barter/craft profitability rankings
//! - trader restock countdowns and the dilated raid clock
//! - ammo penetration rankings
//!
//! and serves them as an HTML dashboard plus JSON endpoints.

mod ammo;
mod clock;
mod config;
mod dashboard;
mod observability;
mod refresh;
mod snapshot;
mod tarkov_api;
mod valuation;

pub use ammo::{search_ammo, top_penetration, Ammo};
pub use clock::{
    build_clock_frame, dilated_clock, paired_clocks, remaining_time, trader_countdowns,
    ClockFrame, ClockSettings, Countdown, RemainingTime, TimeOfDay, TraderCountdown,
    DEFAULT_CLOCK_OFFSET_SECONDS, DEFAULT_DILATION_FACTOR, IMMINENT_THRESHOLD_MS,
};
pub use config::{board_config_from_env, BoardConfig, ConfigError, DEFAULT_BIND_ADDR};
pub use dashboard::{
    build_board_view, dashboard_router, format_countdown, format_profit_short, format_roubles,
    format_time_of_day, render_dashboard_html, BoardQuery, BoardSettings, BoardSource, BoardView,
    BoardViewKind,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_selected, log_timers_started,
    logging_config_from_env, LogFormat, LoggingConfig, LoggingInitError,
};
pub use refresh::{refresh_once, spawn_clock_loop, spawn_refresh_loop};
pub use snapshot::{
    demo_snapshot, fingerprint_bytes, MarketSnapshot, RefreshOutcome, ServerStatus,
    SnapshotStore, TraderResetEvent,
};
pub use tarkov_api::{
    build_query, parse_graphql_response, ApiConfig, FetchError, SnapshotFetcher,
    TarkovApiClient, DEFAULT_API_URL, DEFAULT_MARKET_ITEMS,
};
pub use valuation::{
    compute_profit, compute_profit_with_policy, rank_profitable, rank_profitable_with_policy,
    Item, ItemStack, MissingPricePolicy, OfferKind, ProfitResult, TradeOffer,
};
