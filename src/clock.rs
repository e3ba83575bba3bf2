//! Trader reset countdowns and the dilated in-raid clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::TraderResetEvent;

pub const IMMINENT_THRESHOLD_MS: i64 = 5 * 60 * 1_000;
pub const DEFAULT_DILATION_FACTOR: f64 = 7.0;
/// In-raid time runs on Moscow wall-clock (UTC+3).
pub const DEFAULT_CLOCK_OFFSET_SECONDS: f64 = 3.0 * 3_600.0;

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;
const SECOND_MS: i64 = 1_000;
const DAY_MS_F64: f64 = 86_400_000.0;
const HALF_DAY_SECONDS: f64 = 43_200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub hours: i64,
    pub minutes: u32,
    pub seconds: u32,
    pub imminent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Countdown {
    Expired,
    Remaining(RemainingTime),
}

impl Countdown {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    pub fn is_imminent(&self) -> bool {
        matches!(self, Self::Remaining(remaining) if remaining.imminent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    fn from_seconds_of_day(total: u32) -> Self {
        Self {
            hour: total / 3_600,
            minute: (total % 3_600) / 60,
            second: total % 60,
        }
    }
}

/// Whole hours, minutes and seconds until `target`, truncated. A target at or
/// before `now` is expired.
pub fn remaining_time(now: DateTime<Utc>, target: DateTime<Utc>) -> Countdown {
    let diff_ms = target.signed_duration_since(now).num_milliseconds();
    if diff_ms <= 0 {
        return Countdown::Expired;
    }

    Countdown::Remaining(RemainingTime {
        hours: diff_ms / HOUR_MS,
        minutes: ((diff_ms % HOUR_MS) / MINUTE_MS) as u32,
        seconds: ((diff_ms % MINUTE_MS) / SECOND_MS) as u32,
        imminent: diff_ms < IMMINENT_THRESHOLD_MS,
    })
}

/// Maps real time to in-world time of day: `now_ms * factor + offset_s * 1000`
/// reduced modulo 24h. Not tied to any in-game calendar.
pub fn dilated_clock(now: DateTime<Utc>, dilation_factor: f64, offset_seconds: f64) -> TimeOfDay {
    let dilated_ms = now.timestamp_millis() as f64 * dilation_factor + offset_seconds * 1_000.0;
    if !dilated_ms.is_finite() {
        return TimeOfDay::MIDNIGHT;
    }

    let day_ms = dilated_ms.rem_euclid(DAY_MS_F64);
    let seconds = (day_ms / 1_000.0).floor();
    // rem_euclid may round up to exactly one day for tiny negative inputs.
    let seconds = if seconds.is_finite() {
        (seconds as u32).min(86_399)
    } else {
        0
    };
    TimeOfDay::from_seconds_of_day(seconds)
}

/// The two raid clocks shown in game, twelve hours apart.
pub fn paired_clocks(
    now: DateTime<Utc>,
    dilation_factor: f64,
    offset_seconds: f64,
) -> [TimeOfDay; 2] {
    [
        dilated_clock(now, dilation_factor, offset_seconds),
        dilated_clock(now, dilation_factor, offset_seconds + HALF_DAY_SECONDS),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderCountdown {
    pub trader: String,
    pub reset_at: DateTime<Utc>,
    pub countdown: Countdown,
}

pub fn trader_countdowns(traders: &[TraderResetEvent], now: DateTime<Utc>) -> Vec<TraderCountdown> {
    traders
        .iter()
        .map(|event| TraderCountdown {
            trader: event.name.clone(),
            reset_at: event.reset_at,
            countdown: remaining_time(now, event.reset_at),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockSettings {
    pub dilation_factor: f64,
    pub offset_seconds: f64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            dilation_factor: DEFAULT_DILATION_FACTOR,
            offset_seconds: DEFAULT_CLOCK_OFFSET_SECONDS,
        }
    }
}

/// Everything the fast timer redraws: countdowns and raid clocks at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockFrame {
    pub computed_at: DateTime<Utc>,
    pub snapshot_fingerprint: String,
    pub traders: Vec<TraderCountdown>,
    pub raid_clocks: [TimeOfDay; 2],
}

pub fn build_clock_frame(
    traders: &[TraderResetEvent],
    snapshot_fingerprint: &str,
    now: DateTime<Utc>,
    settings: &ClockSettings,
) -> ClockFrame {
    ClockFrame {
        computed_at: now,
        snapshot_fingerprint: snapshot_fingerprint.to_string(),
        traders: trader_countdowns(traders, now),
        raid_clocks: paired_clocks(now, settings.dilation_factor, settings.offset_seconds),
    }
}
