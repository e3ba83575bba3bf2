//! Immutable market snapshots and the store that swaps them.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ammo::Ammo;
use crate::clock::{build_clock_frame, ClockFrame, ClockSettings};
use crate::tarkov_api::FetchError;
use crate::valuation::{Item, ItemStack, OfferKind, TradeOffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServerStatus {
    Online,
    Degraded { code: i64 },
    Unknown,
}

impl ServerStatus {
    /// Status code 0 is healthy; anything else is some kind of trouble.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::Online,
            Some(code) => Self::Degraded { code },
            None => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderResetEvent {
    pub name: String,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// SHA-256 of the response body the snapshot was decoded from.
    pub fingerprint: String,
    pub server_status: ServerStatus,
    pub traders: Vec<TraderResetEvent>,
    pub market_items: Vec<Item>,
    pub ammo: Vec<Ammo>,
    pub offers: Vec<TradeOffer>,
}

impl MarketSnapshot {
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            fingerprint: String::new(),
            server_status: ServerStatus::Unknown,
            traders: Vec::new(),
            market_items: Vec::new(),
            ammo: Vec::new(),
            offers: Vec::new(),
        }
    }
}

pub fn fingerprint_bytes(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated {
        fingerprint: String,
        previous_fingerprint: String,
    },
    Unchanged {
        fingerprint: String,
    },
    Failed {
        error: String,
        retained_fingerprint: String,
    },
}

/// Holds the latest completed snapshot and the latest clock frame. Readers
/// get an `Arc` and never observe a half-applied batch.
pub struct SnapshotStore {
    snapshot: RwLock<Arc<MarketSnapshot>>,
    clock: RwLock<Arc<ClockFrame>>,
}

impl SnapshotStore {
    /// Store whose first clock frame uses the default raid clock settings.
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self::with_clock_settings(snapshot, &ClockSettings::default())
    }

    /// The first clock frame is computed at `snapshot.fetched_at` with
    /// `settings`, so it agrees with what the clock loop will redraw.
    pub fn with_clock_settings(snapshot: MarketSnapshot, settings: &ClockSettings) -> Self {
        let frame = build_clock_frame(
            &snapshot.traders,
            &snapshot.fingerprint,
            snapshot.fetched_at,
            settings,
        );
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            clock: RwLock::new(Arc::new(frame)),
        }
    }

    pub fn empty(settings: &ClockSettings) -> Self {
        Self::with_clock_settings(MarketSnapshot::empty(Utc::now()), settings)
    }

    pub fn demo(settings: &ClockSettings) -> Self {
        Self::with_clock_settings(demo_snapshot(), settings)
    }

    pub fn current(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace(&self, snapshot: MarketSnapshot) -> Arc<MarketSnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Swaps in a successfully fetched batch. A failed fetch leaves the
    /// previous snapshot in place.
    pub fn apply_refresh(&self, result: Result<MarketSnapshot, FetchError>) -> RefreshOutcome {
        match result {
            Ok(snapshot) => {
                let fingerprint = snapshot.fingerprint.clone();
                let previous = self.replace(snapshot);
                if previous.fingerprint == fingerprint {
                    RefreshOutcome::Unchanged { fingerprint }
                } else {
                    RefreshOutcome::Updated {
                        fingerprint,
                        previous_fingerprint: previous.fingerprint.clone(),
                    }
                }
            }
            Err(err) => RefreshOutcome::Failed {
                error: err.to_string(),
                retained_fingerprint: self.current().fingerprint.clone(),
            },
        }
    }

    pub fn clock_frame(&self) -> Arc<ClockFrame> {
        Arc::clone(&self.clock.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn redraw_clock(&self, now: DateTime<Utc>, settings: &ClockSettings) -> Arc<ClockFrame> {
        let snapshot = self.current();
        let frame = Arc::new(build_clock_frame(
            &snapshot.traders,
            &snapshot.fingerprint,
            now,
            settings,
        ));
        let mut guard = self.clock.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&frame);
        frame
    }
}

/// Fixed offline data: four tracked items, a handful of rounds, barters and
/// crafts, and traders resetting at staggered times after now.
pub fn demo_snapshot() -> MarketSnapshot {
    let now = Utc::now();

    let traders = [
        ("Prapor", 95),
        ("Therapist", 3),
        ("Skier", 42),
        ("Peacekeeper", 130),
        ("Mechanic", 0),
        ("Ragman", 71),
        ("Jaeger", 188),
    ]
    .into_iter()
    .map(|(name, minutes)| TraderResetEvent {
        name: name.to_string(),
        reset_at: now + Duration::minutes(minutes),
    })
    .collect();

    let graphics_card = demo_item("Graphics card", Some(412_000));
    let bitcoin = demo_item("Physical bitcoin", Some(265_000));
    let ledx = demo_item("LedX Skin Transilluminator", Some(1_020_000));
    let moonshine = demo_item("Bottle of Fierce Hatchling moonshine", Some(185_000));

    let ammo = [
        ("5.45x39mm PS gs", 45, 28),
        ("5.45x39mm BS gs", 45, 54),
        ("5.56x45mm M855A1", 49, 44),
        ("7.62x39mm BP gzh", 58, 47),
        ("7.62x51mm M993", 70, 70),
        ("9x19mm PST gzh", 50, 20),
        ("12/70 flechette", 200, 31),
        ("26x75mm flare cartridge (Green)", 0, 0),
    ]
    .into_iter()
    .map(|(name, damage, pen)| Ammo {
        name: name.to_string(),
        icon_link: None,
        damage: Some(damage),
        penetration_power: Some(pen),
    })
    .collect();

    let offers = vec![
        TradeOffer {
            kind: OfferKind::Barter,
            source: Some("Mechanic".to_string()),
            level: Some(2),
            rewards: vec![ItemStack::new(graphics_card.clone(), 1)],
            required: vec![
                ItemStack::new(demo_item("Broken GPhone X smartphone", Some(48_000)), 2),
                ItemStack::new(demo_item("Military circuit board", Some(61_000)), 2),
            ],
        },
        TradeOffer {
            kind: OfferKind::Barter,
            source: Some("Therapist".to_string()),
            level: Some(3),
            rewards: vec![ItemStack::new(ledx.clone(), 1)],
            required: vec![
                ItemStack::new(bitcoin.clone(), 3),
                ItemStack::new(demo_item("Ophthalmoscope", None), 1),
            ],
        },
        TradeOffer {
            kind: OfferKind::Barter,
            source: Some("Peacekeeper".to_string()),
            level: Some(1),
            rewards: vec![ItemStack::new(demo_item("Quest-only key", None), 1)],
            required: vec![ItemStack::new(bitcoin.clone(), 1)],
        },
        TradeOffer {
            kind: OfferKind::Craft,
            source: Some("Booze generator".to_string()),
            level: Some(1),
            rewards: vec![ItemStack::new(moonshine.clone(), 1)],
            required: vec![
                ItemStack::new(demo_item("Pack of sugar", Some(42_000)), 2),
                ItemStack::new(demo_item("Purified water", Some(61_000)), 1),
            ],
        },
        TradeOffer {
            kind: OfferKind::Craft,
            source: Some("Workbench".to_string()),
            level: Some(3),
            rewards: vec![ItemStack::new(demo_item("Gunpowder \"Eagle\"", Some(31_000)), 1)],
            required: vec![ItemStack::new(demo_item("Gunpowder \"Kite\"", Some(38_000)), 1)],
        },
    ];

    MarketSnapshot {
        fetched_at: now,
        fingerprint: "demo".to_string(),
        server_status: ServerStatus::Online,
        traders,
        market_items: vec![graphics_card, bitcoin, ledx, moonshine],
        ammo,
        offers,
    }
}

fn demo_item(name: &str, unit_price: Option<i64>) -> Item {
    Item {
        name: name.to_string(),
        unit_price,
        icon_link: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{paired_clocks, TimeOfDay};
    use crate::valuation::rank_profitable;
    use chrono::TimeZone;

    fn snapshot_with(fingerprint: &str) -> MarketSnapshot {
        MarketSnapshot {
            fingerprint: fingerprint.to_string(),
            ..MarketSnapshot::empty(Utc::now())
        }
    }

    #[test]
    fn status_code_zero_is_online() {
        assert_eq!(ServerStatus::from_code(Some(0)), ServerStatus::Online);
        assert_eq!(
            ServerStatus::from_code(Some(2)),
            ServerStatus::Degraded { code: 2 }
        );
        assert_eq!(ServerStatus::from_code(None), ServerStatus::Unknown);
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let fp = fingerprint_bytes(b"{}");
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint_bytes(b"{}"));
        assert_ne!(fp, fingerprint_bytes(b"{ }"));
    }

    #[test]
    fn successful_refresh_swaps_snapshot() {
        let store = SnapshotStore::new(snapshot_with("old"));
        let outcome = store.apply_refresh(Ok(snapshot_with("new")));

        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                fingerprint: "new".to_string(),
                previous_fingerprint: "old".to_string(),
            }
        );
        assert_eq!(store.current().fingerprint, "new");
    }

    #[test]
    fn identical_body_reports_unchanged() {
        let store = SnapshotStore::new(snapshot_with("same"));
        let outcome = store.apply_refresh(Ok(snapshot_with("same")));
        assert_eq!(
            outcome,
            RefreshOutcome::Unchanged {
                fingerprint: "same".to_string()
            }
        );
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let store = SnapshotStore::new(snapshot_with("kept"));
        let before = store.current();

        let outcome = store.apply_refresh(Err(FetchError::Transport("timeout".to_string())));

        assert!(matches!(
            outcome,
            RefreshOutcome::Failed { ref retained_fingerprint, .. } if retained_fingerprint == "kept"
        ));
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[test]
    fn first_clock_frame_uses_configured_settings() {
        let settings = ClockSettings {
            dilation_factor: 7.0,
            offset_seconds: 0.0,
        };
        let epoch = Utc.timestamp_millis_opt(0).single().unwrap();
        let snapshot = MarketSnapshot::empty(epoch);

        let configured = SnapshotStore::with_clock_settings(snapshot.clone(), &settings);
        assert_eq!(
            configured.clock_frame().raid_clocks,
            [
                TimeOfDay::MIDNIGHT,
                TimeOfDay {
                    hour: 12,
                    minute: 0,
                    second: 0
                }
            ]
        );

        let defaulted = SnapshotStore::new(snapshot);
        assert_eq!(defaulted.clock_frame().raid_clocks[0].hour, 3);

        let demo = SnapshotStore::demo(&settings);
        let expected = paired_clocks(demo.current().fetched_at, 7.0, 0.0);
        assert_eq!(demo.clock_frame().raid_clocks, expected);
    }

    #[test]
    fn redraw_uses_latest_snapshot_traders() {
        let store = SnapshotStore::new(snapshot_with("a"));
        assert!(store.clock_frame().traders.is_empty());

        let now = Utc::now();
        let mut next = snapshot_with("b");
        next.traders.push(TraderResetEvent {
            name: "Fence".to_string(),
            reset_at: now + Duration::hours(1),
        });
        store.replace(next);

        let frame = store.redraw_clock(now, &ClockSettings::default());
        assert_eq!(frame.snapshot_fingerprint, "b");
        assert_eq!(frame.traders.len(), 1);
        assert_eq!(store.clock_frame().traders[0].trader, "Fence");
    }

    #[test]
    fn demo_snapshot_ranks_only_defined_offers() {
        let snapshot = demo_snapshot();
        assert_eq!(snapshot.market_items.len(), 4);
        assert_eq!(snapshot.traders.len(), 7);

        let ranked = rank_profitable(&snapshot.offers, 0);
        assert!(ranked.iter().all(|r| r.reward_name != "Quest-only key"));
        assert!(ranked.windows(2).all(|w| w[0].profit >= w[1].profit));
    }
}
