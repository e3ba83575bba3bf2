//! Board view assembly, display formatting and HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ammo::{search_ammo, top_penetration, Ammo};
use crate::clock::{
    paired_clocks, trader_countdowns, ClockFrame, ClockSettings, Countdown, TimeOfDay,
    TraderCountdown,
};
use crate::snapshot::{MarketSnapshot, ServerStatus, SnapshotStore};
use crate::valuation::{rank_profitable_with_policy, Item, MissingPricePolicy, ProfitResult};

#[derive(Debug, Clone, PartialEq)]
pub struct BoardSettings {
    pub min_profit: i64,
    pub missing_price_policy: MissingPricePolicy,
    pub clock: ClockSettings,
    pub trader_summary_limit: usize,
    pub ammo_summary_limit: usize,
    pub offer_summary_limit: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            min_profit: 0,
            missing_price_policy: MissingPricePolicy::Zero,
            clock: ClockSettings::default(),
            trader_summary_limit: 3,
            ammo_summary_limit: 5,
            offer_summary_limit: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoardQuery {
    pub view: Option<String>,
    pub ammo: Option<String>,
    pub min_profit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardViewKind {
    Main,
    Status,
    Market,
    Ammo,
    Barter,
}

impl BoardViewKind {
    pub const ALL: [Self; 5] = [
        Self::Main,
        Self::Status,
        Self::Market,
        Self::Ammo,
        Self::Barter,
    ];

    /// Unknown names fall back to the overview.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("status") => Self::Status,
            Some("market") => Self::Market,
            Some("ammo") => Self::Ammo,
            Some("barter") => Self::Barter,
            _ => Self::Main,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Status => "status",
            Self::Market => "market",
            Self::Ammo => "ammo",
            Self::Barter => "barter",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Main => "Overview",
            Self::Status => "Trader reset timers",
            Self::Market => "Live market prices",
            Self::Ammo => "Ammo penetration chart",
            Self::Barter => "Barter sniper (flea vs. trader)",
        }
    }
}

/// Everything a renderer needs, derived from one snapshot at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub generated_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub fingerprint: String,
    pub server_status: ServerStatus,
    pub traders: Vec<TraderCountdown>,
    pub raid_clocks: [TimeOfDay; 2],
    pub market_items: Vec<Item>,
    pub ammo_filter: Option<String>,
    pub ammo: Vec<Ammo>,
    pub min_profit: i64,
    pub offers: Vec<ProfitResult>,
}

pub fn build_board_view(
    snapshot: &MarketSnapshot,
    now: DateTime<Utc>,
    query: &BoardQuery,
    settings: &BoardSettings,
) -> BoardView {
    let ammo_filter = query
        .ammo
        .as_deref()
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .map(str::to_string);

    let ammo = match ammo_filter.as_deref() {
        Some(filter) => search_ammo(&snapshot.ammo, filter),
        None => top_penetration(&snapshot.ammo, settings.ammo_summary_limit),
    }
    .into_iter()
    .cloned()
    .collect();

    let min_profit = query.min_profit.unwrap_or(settings.min_profit);

    BoardView {
        generated_at: now,
        fetched_at: snapshot.fetched_at,
        fingerprint: snapshot.fingerprint.clone(),
        server_status: snapshot.server_status,
        traders: trader_countdowns(&snapshot.traders, now),
        raid_clocks: paired_clocks(
            now,
            settings.clock.dilation_factor,
            settings.clock.offset_seconds,
        ),
        market_items: snapshot.market_items.clone(),
        ammo_filter,
        ammo,
        min_profit,
        offers: rank_profitable_with_policy(
            &snapshot.offers,
            min_profit,
            settings.missing_price_policy,
        ),
    }
}

pub trait BoardSource: Send + Sync + 'static {
    fn snapshot(&self) -> Arc<MarketSnapshot>;
    fn clock_frame(&self) -> Arc<ClockFrame>;
}

impl BoardSource for SnapshotStore {
    fn snapshot(&self) -> Arc<MarketSnapshot> {
        self.current()
    }

    fn clock_frame(&self) -> Arc<ClockFrame> {
        SnapshotStore::clock_frame(self)
    }
}

pub fn dashboard_router(source: Arc<dyn BoardSource>, settings: BoardSettings) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard_html))
        .route("/dashboard/snapshot", get(get_dashboard_snapshot))
        .route("/dashboard/timers", get(get_dashboard_timers))
        .with_state(DashboardAppState {
            source,
            settings: Arc::new(settings),
        })
}

/// Thousands-grouped roubles, e.g. `1,234,567 ₽`.
pub fn format_roubles(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} ₽")
}

/// Compact signed profit in thousands, e.g. `+194k`.
pub fn format_profit_short(profit: i64) -> String {
    let thousands = (profit as f64 / 1_000.0).round() as i64;
    if thousands >= 0 {
        format!("+{thousands}k")
    } else {
        format!("{thousands}k")
    }
}

pub fn format_countdown(countdown: &Countdown) -> String {
    match countdown {
        Countdown::Expired => "RESETTING...".to_string(),
        Countdown::Remaining(remaining) => format!(
            "{:02}:{:02}:{:02}",
            remaining.hours, remaining.minutes, remaining.seconds
        ),
    }
}

pub fn format_time_of_day(time: &TimeOfDay) -> String {
    format!("{:02}:{:02}:{:02}", time.hour, time.minute, time.second)
}

fn countdown_class(countdown: &Countdown) -> &'static str {
    match countdown {
        Countdown::Expired => "timer expired",
        Countdown::Remaining(remaining) if remaining.imminent => "timer imminent",
        Countdown::Remaining(_) => "timer",
    }
}

fn status_badge(status: ServerStatus) -> (&'static str, String) {
    match status {
        ServerStatus::Online => ("online", "SERVER: ONLINE".to_string()),
        ServerStatus::Degraded { code } => ("issue", format!("SERVER: ISSUES (code {code})")),
        ServerStatus::Unknown => ("unknown", "SERVER: UNKNOWN".to_string()),
    }
}

fn price_or_dash(price: Option<i64>) -> String {
    price.map(format_roubles).unwrap_or_else(|| "-".to_string())
}

fn number_or_question(value: Option<i64>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Cuts at a character boundary, never inside a code point.
fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

pub fn render_dashboard_html(
    view: &BoardView,
    kind: BoardViewKind,
    settings: &BoardSettings,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Tarkov Board</title>\n");
    out.push_str("<style>:root{--bg:#0d0e0c;--panel:#171814;--line:#2d2e27;--ink:#d8d3c2;--dim:#8a8677;--tarkov-yellow:#c7b37a;--green:#6fbf5a;--red:#c45a4a}*{box-sizing:border-box}body{margin:0;background:var(--bg);color:var(--ink);font-family:\"Bender\",\"Rajdhani\",\"Segoe UI\",sans-serif}.shell{max-width:1280px;margin:0 auto;padding:18px}.hero{display:flex;justify-content:space-between;align-items:center;flex-wrap:wrap;gap:12px;border-bottom:1px solid var(--line);padding-bottom:12px}.hero h1{margin:0;font-size:1.4rem;letter-spacing:.08em;text-transform:uppercase;color:var(--tarkov-yellow)}.hero-meta{display:flex;gap:14px;font-size:.8rem;color:var(--dim)}nav a{color:var(--dim);text-decoration:none;margin-right:12px;text-transform:uppercase;font-size:.8rem}nav a.active{color:var(--tarkov-yellow)}.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(280px,1fr));gap:14px;margin-top:14px}.widget{background:var(--panel);border:1px solid var(--line);padding:12px}.widget h2{margin:0 0 10px;font-size:.85rem;text-transform:uppercase;letter-spacing:.06em;color:var(--dim)}.widget h2 a{color:inherit}.card{display:flex;justify-content:space-between;align-items:center;gap:8px;padding:6px 0;border-bottom:1px solid var(--line);font-size:.85rem}.card:last-child{border-bottom:none}.card img{width:24px;height:24px}.grow{flex-grow:1}.sub{display:block;font-size:.7rem;color:var(--dim)}.status-indicator{padding:8px;margin-bottom:8px;font-weight:700;text-align:center}.status-indicator.online{background:rgba(111,191,90,.15);color:var(--green)}.status-indicator.issue{background:rgba(196,90,74,.15);color:var(--red)}.status-indicator.unknown{background:var(--line);color:var(--dim)}.timer{font-family:\"IBM Plex Mono\",monospace;color:var(--tarkov-yellow)}.timer.imminent{font-weight:700;color:#f0c040}.timer.expired{color:var(--green)}.price-up{color:var(--green);font-family:\"IBM Plex Mono\",monospace}.price-down{color:var(--red);font-family:\"IBM Plex Mono\",monospace}.clock{font-family:\"IBM Plex Mono\",monospace;font-size:1.1rem;color:var(--tarkov-yellow)}form.filter input{width:100%;padding:8px;background:var(--bg);border:1px solid var(--line);color:var(--ink)}.empty{color:var(--dim);font-size:.8rem}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");

    out.push_str("<section class=\"hero\"><h1>Tarkov Board</h1><div class=\"hero-meta\">");
    out.push_str(&format!(
        "<span>Raid clocks: <span class=\"clock\" id=\"raid-clock-0\">{}</span> / <span class=\"clock\" id=\"raid-clock-1\">{}</span></span>",
        format_time_of_day(&view.raid_clocks[0]),
        format_time_of_day(&view.raid_clocks[1])
    ));
    out.push_str(&format!(
        "<span>Data: {}</span>",
        escape_html(&view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    ));
    out.push_str("</div></section>\n");

    out.push_str("<nav>");
    for entry in BoardViewKind::ALL {
        let class = if entry == kind { " class=\"active\"" } else { "" };
        out.push_str(&format!(
            "<a href=\"/dashboard?view={}\"{}>{}</a>",
            entry.as_str(),
            class,
            escape_html(entry.title())
        ));
    }
    out.push_str("</nav>\n");

    match kind {
        BoardViewKind::Main => render_main(&mut out, view, settings),
        BoardViewKind::Status => render_detail(&mut out, kind, |out| {
            render_status(out, view, None)
        }),
        BoardViewKind::Market => render_detail(&mut out, kind, |out| {
            render_market(out, view, true)
        }),
        BoardViewKind::Ammo => render_detail(&mut out, kind, |out| render_ammo(out, view, true)),
        BoardViewKind::Barter => render_detail(&mut out, kind, |out| {
            render_offers(out, view, None)
        }),
    }

    out.push_str("</main>\n");
    out.push_str(TIMER_SCRIPT);
    out.push_str("</body></html>\n");
    out
}

fn render_main(out: &mut String, view: &BoardView, settings: &BoardSettings) {
    out.push_str("<section class=\"grid\">\n");

    out.push_str("<div class=\"widget\" id=\"status-summary\"><h2><a href=\"/dashboard?view=status\">Status &amp; traders</a></h2>");
    render_status(out, view, Some(settings.trader_summary_limit));
    out.push_str("</div>\n");

    out.push_str("<div class=\"widget\" id=\"market-summary\"><h2><a href=\"/dashboard?view=market\">Market</a></h2>");
    render_market(out, view, false);
    out.push_str("</div>\n");

    out.push_str("<div class=\"widget\" id=\"ammo-summary\"><h2><a href=\"/dashboard?view=ammo\">Top penetration</a></h2>");
    render_ammo(out, view, false);
    out.push_str("</div>\n");

    out.push_str("<div class=\"widget\" id=\"barter-summary\"><h2><a href=\"/dashboard?view=barter\">Barter sniper</a></h2>");
    render_offers(out, view, Some(settings.offer_summary_limit));
    out.push_str("</div>\n");

    out.push_str("</section>\n");
}

fn render_detail(out: &mut String, kind: BoardViewKind, body: impl FnOnce(&mut String)) {
    out.push_str(&format!(
        "<section class=\"grid\"><div class=\"widget\" id=\"detail-view\"><h2>{}</h2>",
        escape_html(kind.title())
    ));
    body(out);
    out.push_str("</div></section>\n");
}

fn render_status(out: &mut String, view: &BoardView, limit: Option<usize>) {
    let (class, label) = status_badge(view.server_status);
    out.push_str(&format!(
        "<div class=\"status-indicator {class}\">{}</div>",
        escape_html(&label)
    ));

    let limit = limit.unwrap_or(view.traders.len());
    if view.traders.is_empty() {
        out.push_str("<div class=\"empty\">No trader data yet.</div>");
    }
    for trader in view.traders.iter().take(limit) {
        out.push_str(&format!(
            "<div class=\"card\"><span>{}</span><span class=\"{}\" data-trader=\"{}\">{}</span></div>",
            escape_html(&trader.trader),
            countdown_class(&trader.countdown),
            escape_html(&trader.trader),
            format_countdown(&trader.countdown)
        ));
    }
}

fn render_market(out: &mut String, view: &BoardView, detail: bool) {
    if view.market_items.is_empty() {
        out.push_str("<div class=\"empty\">No market data yet.</div>");
    }
    for item in &view.market_items {
        out.push_str("<div class=\"card\">");
        if let Some(icon) = &item.icon_link {
            out.push_str(&format!("<img src=\"{}\" alt=\"\">", escape_html(icon)));
        }
        let label = if detail {
            item.name.as_str()
        } else {
            item.name.rsplit(' ').next().unwrap_or(&item.name)
        };
        out.push_str(&format!(
            "<span class=\"grow\">{}</span><span class=\"price-up\">{}</span></div>",
            escape_html(label),
            escape_html(&price_or_dash(item.unit_price))
        ));
    }
}

fn render_ammo(out: &mut String, view: &BoardView, detail: bool) {
    if detail {
        out.push_str("<form class=\"filter\" method=\"get\" action=\"/dashboard\"><input type=\"hidden\" name=\"view\" value=\"ammo\">");
        out.push_str(&format!(
            "<input type=\"text\" name=\"ammo\" placeholder=\"Search...\" value=\"{}\"></form>",
            escape_html(view.ammo_filter.as_deref().unwrap_or(""))
        ));
    }
    if view.ammo.is_empty() {
        out.push_str("<div class=\"empty\">No ammo matches.</div>");
    }
    for round in &view.ammo {
        let name = if detail {
            round.name.as_str()
        } else {
            truncate_chars(&round.name, 15)
        };
        out.push_str(&format!(
            "<div class=\"card\"><span>{}</span><span>P: <b>{}</b> | D: {}</span></div>",
            escape_html(name),
            number_or_question(round.penetration_power),
            number_or_question(round.damage)
        ));
    }
}

fn render_offers(out: &mut String, view: &BoardView, limit: Option<usize>) {
    if view.offers.is_empty() {
        out.push_str("<div class=\"empty\">No profitable offers above threshold.</div>");
    }
    let summary = limit.is_some();
    for offer in view.offers.iter().take(limit.unwrap_or(view.offers.len())) {
        out.push_str("<div class=\"card\">");
        if let Some(icon) = &offer.reward_icon {
            out.push_str(&format!("<img src=\"{}\" alt=\"\">", escape_html(icon)));
        }
        let source = match (&offer.source, offer.level) {
            (Some(source), Some(level)) => format!("{source} LL{level}"),
            (Some(source), None) => source.clone(),
            (None, _) => "-".to_string(),
        };
        let estimate = if offer.unpriced_inputs > 0 { " *" } else { "" };
        out.push_str(&format!(
            "<div class=\"grow\">{}<span class=\"sub\">{} | cost {}{}</span></div>",
            escape_html(&offer.reward_name),
            escape_html(&source),
            escape_html(&format_roubles(offer.acquisition_cost)),
            estimate
        ));
        let class = if offer.profit >= 0 { "price-up" } else { "price-down" };
        let profit = if summary {
            format_profit_short(offer.profit)
        } else {
            format_roubles(offer.profit)
        };
        out.push_str(&format!(
            "<span class=\"{class}\">{}</span></div>",
            escape_html(&profit)
        ));
    }
}

const TIMER_SCRIPT: &str = r#"<script>
const pad2 = (n) => String(n).padStart(2, '0');
const hms = (t) => `${pad2(t.hour)}:${pad2(t.minute)}:${pad2(t.second)}`;
let lastFingerprint = null;
async function refreshTimers() {
  try {
    const res = await fetch('/dashboard/timers', { cache: 'no-store' });
    if (!res.ok) return;
    const frame = await res.json();
    if (lastFingerprint !== null && frame.snapshot_fingerprint !== lastFingerprint) {
      location.reload();
      return;
    }
    lastFingerprint = frame.snapshot_fingerprint;
    frame.raid_clocks.forEach((t, i) => {
      const el = document.getElementById(`raid-clock-${i}`);
      if (el) el.textContent = hms(t);
    });
    for (const entry of frame.traders) {
      document.querySelectorAll('.timer[data-trader]').forEach((el) => {
        if (el.dataset.trader !== entry.trader) return;
        const cd = entry.countdown;
        if (cd.state === 'expired') {
          el.textContent = 'RESETTING...';
          el.className = 'timer expired';
        } else {
          el.textContent = `${pad2(cd.hours)}:${pad2(cd.minutes)}:${pad2(cd.seconds)}`;
          el.className = cd.imminent ? 'timer imminent' : 'timer';
        }
      });
    }
  } catch (err) {
    console.error('timer refresh failed', err);
  }
}
setInterval(refreshTimers, 1000);
</script>
"#;

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Clone)]
struct DashboardAppState {
    source: Arc<dyn BoardSource>,
    settings: Arc<BoardSettings>,
}

async fn get_dashboard_html(
    State(state): State<DashboardAppState>,
    Query(query): Query<BoardQuery>,
) -> impl IntoResponse {
    let kind = BoardViewKind::parse(query.view.as_deref());
    let snapshot = state.source.snapshot();
    let view = build_board_view(&snapshot, Utc::now(), &query, &state.settings);
    info!(
        component = "dashboard",
        event = "http.dashboard.request",
        view = kind.as_str(),
        fingerprint = %view.fingerprint
    );
    Html(render_dashboard_html(&view, kind, &state.settings))
}

async fn get_dashboard_snapshot(
    State(state): State<DashboardAppState>,
    Query(query): Query<BoardQuery>,
) -> impl IntoResponse {
    let snapshot = state.source.snapshot();
    let view = build_board_view(&snapshot, Utc::now(), &query, &state.settings);
    info!(
        component = "dashboard",
        event = "http.snapshot.request",
        offers = view.offers.len(),
        ammo = view.ammo.len(),
        min_profit = view.min_profit,
        fingerprint = %view.fingerprint
    );
    Json(view)
}

async fn get_dashboard_timers(State(state): State<DashboardAppState>) -> impl IntoResponse {
    Json(state.source.clock_frame().as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::demo_snapshot;
    use crate::valuation::{ItemStack, OfferKind, TradeOffer};
    use chrono::Duration;

    #[test]
    fn roubles_are_grouped_by_thousands() {
        assert_eq!(format_roubles(0), "0 ₽");
        assert_eq!(format_roubles(999), "999 ₽");
        assert_eq!(format_roubles(1_000), "1,000 ₽");
        assert_eq!(format_roubles(1_234_567), "1,234,567 ₽");
        assert_eq!(format_roubles(-30_000), "-30,000 ₽");
        assert_eq!(format_roubles(i64::MIN), "-9,223,372,036,854,775,808 ₽");
    }

    #[test]
    fn short_profit_rounds_to_thousands() {
        assert_eq!(format_profit_short(194_000), "+194k");
        assert_eq!(format_profit_short(1_499), "+1k");
        assert_eq!(format_profit_short(-7_000), "-7k");
    }

    #[test]
    fn countdown_is_zero_padded_or_resetting() {
        let now = Utc::now();
        let running = crate::clock::remaining_time(now, now + Duration::milliseconds(5_401_000));
        assert_eq!(format_countdown(&running), "01:30:01");
        assert_eq!(format_countdown(&Countdown::Expired), "RESETTING...");
    }

    #[test]
    fn view_kind_parses_known_names_only() {
        assert_eq!(BoardViewKind::parse(Some("Barter")), BoardViewKind::Barter);
        assert_eq!(BoardViewKind::parse(Some("nope")), BoardViewKind::Main);
        assert_eq!(BoardViewKind::parse(None), BoardViewKind::Main);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("Патрон 7.62x39", 6), "Патрон");
        assert_eq!(truncate_chars("short", 15), "short");
    }

    #[test]
    fn board_view_uses_query_threshold_and_ammo_filter() {
        let snapshot = demo_snapshot();
        let settings = BoardSettings::default();

        let default_view =
            build_board_view(&snapshot, Utc::now(), &BoardQuery::default(), &settings);
        assert_eq!(default_view.ammo.len(), 5);
        assert_eq!(default_view.offers.len(), 3);

        let query = BoardQuery {
            view: None,
            ammo: Some("5.45".to_string()),
            min_profit: Some(100_000),
        };
        let filtered = build_board_view(&snapshot, Utc::now(), &query, &settings);
        assert_eq!(filtered.ammo.len(), 2);
        assert_eq!(filtered.ammo[0].name, "5.45x39mm BS gs");
        assert!(filtered.offers.iter().all(|offer| offer.profit > 100_000));
        assert_eq!(filtered.min_profit, 100_000);
    }

    #[test]
    fn board_view_honours_penalty_policy() {
        let mut snapshot = MarketSnapshot::empty(Utc::now());
        snapshot.offers.push(TradeOffer {
            kind: OfferKind::Barter,
            source: None,
            level: None,
            rewards: vec![ItemStack::new(Item::priced("A", 50_000), 1)],
            required: vec![ItemStack::new(Item::unpriced("C"), 1)],
        });

        let zero = build_board_view(
            &snapshot,
            Utc::now(),
            &BoardQuery::default(),
            &BoardSettings::default(),
        );
        assert_eq!(zero.offers.len(), 1);

        let penalty = build_board_view(
            &snapshot,
            Utc::now(),
            &BoardQuery::default(),
            &BoardSettings {
                missing_price_policy: MissingPricePolicy::Penalty(999_999),
                ..BoardSettings::default()
            },
        );
        assert!(penalty.offers.is_empty());
    }

    #[test]
    fn rendered_main_view_has_all_widgets_and_escapes_names() {
        let mut snapshot = demo_snapshot();
        snapshot.market_items[0].name = "<script>".to_string();
        let view = build_board_view(
            &snapshot,
            Utc::now(),
            &BoardQuery::default(),
            &BoardSettings::default(),
        );

        let html = render_dashboard_html(&view, BoardViewKind::Main, &BoardSettings::default());
        for id in ["status-summary", "market-summary", "ammo-summary", "barter-summary"] {
            assert!(html.contains(id), "missing widget {id}");
        }
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("SERVER: ONLINE"));
        assert!(html.contains("setInterval(refreshTimers, 1000)"));
    }
}
