use std::io;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use tarkov_board::{
    dashboard_router, demo_snapshot, log_app_bind, log_app_start, log_source_selected,
    log_timers_started, refresh_once, BoardSettings, FetchError, LoggingConfig, MarketSnapshot,
    SnapshotStore,
};
use tower::util::ServiceExt;
use tracing::dispatcher::with_default;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    fn output_string(&self) -> String {
        let bytes = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedWriterGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let writer = SharedWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_max_level(max_level)
        .with_writer(writer.clone())
        .finish();
    let dispatch = tracing::Dispatch::new(subscriber);

    with_default(&dispatch, f);
    writer.output_string()
}

fn snapshot_with(fingerprint: &str) -> MarketSnapshot {
    MarketSnapshot {
        fingerprint: fingerprint.to_string(),
        ..MarketSnapshot::empty(Utc::now())
    }
}

#[test]
fn refresh_failure_is_logged_as_warning_with_retained_fingerprint() {
    let store = SnapshotStore::new(snapshot_with("previous"));
    let logs = capture_logs(Level::INFO, || {
        let fetcher = || -> Result<MarketSnapshot, FetchError> {
            Err(FetchError::Transport("simulated api outage".to_string()))
        };
        refresh_once(&store, &fetcher);
    });

    assert!(logs.contains("\"event\":\"snapshot.refresh.error\""));
    assert!(logs.contains("\"level\":\"WARN\""));
    assert!(logs.contains("simulated api outage"));
    assert!(logs.contains("\"retained_fingerprint\":\"previous\""));
    assert_eq!(store.current().fingerprint, "previous");
}

#[test]
fn refresh_success_and_repeat_are_distinguished() {
    let store = SnapshotStore::new(snapshot_with("a"));
    let logs = capture_logs(Level::INFO, || {
        let fetcher = || -> Result<MarketSnapshot, FetchError> { Ok(snapshot_with("b")) };
        refresh_once(&store, &fetcher);
        refresh_once(&store, &fetcher);
    });

    assert!(logs.contains("\"event\":\"snapshot.refresh.ok\""));
    assert!(logs.contains("\"event\":\"snapshot.refresh.unchanged\""));
}

#[test]
fn server_lifecycle_helpers_emit_baseline_events() {
    let logs = capture_logs(Level::INFO, || {
        let cfg = LoggingConfig::default();
        log_app_start(&cfg);
        log_source_selected("demo", Some("TARKOV_DASHBOARD_USE_DEMO"), None);
        log_timers_started(Some(60_000), 1_000);
        log_app_bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
    });

    assert!(logs.contains("\"event\":\"app.start\""));
    assert!(logs.contains("\"event\":\"source.selected\""));
    assert!(logs.contains("\"event\":\"timers.start\""));
    assert!(logs.contains("\"event\":\"app.bind\""));
}

#[test]
fn snapshot_route_emits_http_snapshot_event() {
    let logs = capture_logs(Level::INFO, || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("single-thread runtime should build");

        rt.block_on(async {
            let store = Arc::new(SnapshotStore::new(demo_snapshot()));
            let app = dashboard_router(store, BoardSettings::default());

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/dashboard/snapshot")
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("snapshot request should succeed");

            assert_eq!(response.status(), StatusCode::OK);
        });
    });

    assert!(logs.contains("\"event\":\"http.snapshot.request\""));
    assert!(logs.contains("\"fingerprint\":\"demo\""));
}
