//! The two board timers: a coarse data refresh and a fast clock redraw.
//!
//! They share nothing but the [`SnapshotStore`]. The refresh runs on its own
//! OS thread because the HTTP client blocks; the redraw is a tokio task and
//! keeps ticking while a refresh is in flight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::ClockSettings;
use crate::snapshot::{RefreshOutcome, SnapshotStore};
use crate::tarkov_api::{FetchError, SnapshotFetcher};

/// Fetches once and applies the result. Failures are logged and leave the
/// previous snapshot in place; the next tick is the retry.
pub fn refresh_once<F>(store: &SnapshotStore, fetcher: &F) -> RefreshOutcome
where
    F: SnapshotFetcher + ?Sized,
{
    let started = Instant::now();
    let outcome = store.apply_refresh(fetcher.fetch());
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &outcome {
        RefreshOutcome::Updated {
            fingerprint,
            previous_fingerprint,
        } => {
            let snapshot = store.current();
            info!(
                component = "refresh",
                event = "snapshot.refresh.ok",
                fingerprint = %fingerprint,
                previous_fingerprint = %previous_fingerprint,
                traders = snapshot.traders.len(),
                market_items = snapshot.market_items.len(),
                ammo = snapshot.ammo.len(),
                offers = snapshot.offers.len(),
                elapsed_ms
            );
        }
        RefreshOutcome::Unchanged { fingerprint } => info!(
            component = "refresh",
            event = "snapshot.refresh.unchanged",
            fingerprint = %fingerprint,
            elapsed_ms
        ),
        RefreshOutcome::Failed {
            error,
            retained_fingerprint,
        } => warn!(
            component = "refresh",
            event = "snapshot.refresh.error",
            error = %error,
            retained_fingerprint = %retained_fingerprint,
            elapsed_ms
        ),
    }

    outcome
}

/// Starts the refresh thread. The fetcher is built on that thread, then a
/// fetch runs immediately and every `interval` after.
pub fn spawn_refresh_loop<F, B>(
    store: Arc<SnapshotStore>,
    interval: Duration,
    make_fetcher: B,
) -> std::io::Result<JoinHandle<()>>
where
    F: SnapshotFetcher,
    B: FnOnce() -> Result<F, FetchError> + Send + 'static,
{
    thread::Builder::new()
        .name("snapshot-refresh".to_string())
        .spawn(move || {
            let fetcher = match make_fetcher() {
                Ok(fetcher) => fetcher,
                Err(err) => {
                    error!(
                        component = "refresh",
                        event = "refresh.init.error",
                        error = %err
                    );
                    return;
                }
            };

            loop {
                let started = Instant::now();
                refresh_once(&store, &fetcher);
                thread::sleep(interval.saturating_sub(started.elapsed()));
            }
        })
}

pub fn spawn_clock_loop(
    store: Arc<SnapshotStore>,
    period: Duration,
    settings: ClockSettings,
) -> tokio::task::JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let frame = store.redraw_clock(Utc::now(), &settings);
            debug!(
                component = "refresh",
                event = "clock.redraw",
                traders = frame.traders.len(),
                fingerprint = %frame.snapshot_fingerprint
            );
        }
    })
}
