use std::{sync::Arc, time::Duration};

use tarkov_board::{
    board_config_from_env, dashboard_router, init_logging, log_app_bind, log_app_start,
    log_source_selected, log_timers_started, logging_config_from_env, spawn_clock_loop,
    spawn_refresh_loop, BoardConfig, BoardSource, SnapshotStore, TarkovApiClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let cfg = board_config_from_env()?;
    let store = store_from_config(&cfg)?;

    spawn_clock_loop(
        Arc::clone(&store),
        Duration::from_millis(cfg.clock_interval_ms),
        cfg.board.clock,
    );
    log_timers_started(
        (!cfg.use_demo).then_some(cfg.refresh_interval_ms),
        cfg.clock_interval_ms,
    );

    let source: Arc<dyn BoardSource> = store;
    let app = dashboard_router(source, cfg.board.clone());
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn store_from_config(cfg: &BoardConfig) -> std::io::Result<Arc<SnapshotStore>> {
    if cfg.use_demo {
        log_source_selected("demo", Some("TARKOV_DASHBOARD_USE_DEMO"), None);
        return Ok(Arc::new(SnapshotStore::demo(&cfg.board.clock)));
    }

    log_source_selected("tarkov_api", None, Some(cfg.refresh_interval_ms));
    let store = Arc::new(SnapshotStore::empty(&cfg.board.clock));
    let api_cfg = cfg.api.clone();
    spawn_refresh_loop(
        Arc::clone(&store),
        Duration::from_millis(cfg.refresh_interval_ms),
        move || TarkovApiClient::new(&api_cfg),
    )?;

    Ok(store)
}
