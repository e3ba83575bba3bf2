//! tarkov.dev GraphQL data source.
//!
//! One POST per refresh selects everything the board shows. The response is
//! decoded into a [`MarketSnapshot`] in one pass; any missing or ill-typed
//! field fails the whole batch.

use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ammo::Ammo;
use crate::snapshot::{fingerprint_bytes, MarketSnapshot, ServerStatus, TraderResetEvent};
use crate::valuation::{Item, ItemStack, OfferKind, TradeOffer};

pub const DEFAULT_API_URL: &str = "https://api.tarkov.dev/graphql";
pub const DEFAULT_MARKET_ITEMS: [&str; 4] = [
    "Graphics card",
    "Physical bitcoin",
    "LedX Skin Transilluminator",
    "Moonshine",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub http_timeout_ms: u64,
    pub market_items: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_URL.to_string(),
            http_timeout_ms: 10_000,
            market_items: DEFAULT_MARKET_ITEMS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client build error: {0}")]
    HttpClientBuild(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("graphql error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub trait SnapshotFetcher: Send + Sync + 'static {
    fn fetch(&self) -> Result<MarketSnapshot, FetchError>;
}

impl<F> SnapshotFetcher for F
where
    F: Fn() -> Result<MarketSnapshot, FetchError> + Send + Sync + 'static,
{
    fn fetch(&self) -> Result<MarketSnapshot, FetchError> {
        self()
    }
}

pub fn build_query(cfg: &ApiConfig) -> String {
    // A JSON string array is also a valid GraphQL list literal.
    let names = serde_json::to_string(&cfg.market_items).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"{{
    status {{ currentStatuses {{ name status }} }}
    traders {{ name resetTime }}
    marketItems: items(names: {names}) {{ name lastLowPrice iconLink }}
    ammo: items(type: ammo) {{
        name
        iconLink
        properties {{ ... on ItemPropertiesAmmo {{ damage penetrationPower }} }}
    }}
    barters {{
        trader {{ name }}
        level
        rewardItems {{ item {{ name lastLowPrice iconLink }} count }}
        requiredItems {{ item {{ name lastLowPrice }} count }}
    }}
    crafts {{
        station {{ name }}
        level
        rewardItems {{ item {{ name lastLowPrice iconLink }} count }}
        requiredItems {{ item {{ name lastLowPrice }} count }}
    }}
}}"#
    )
}

pub fn parse_graphql_response(
    body: &[u8],
    fetched_at: DateTime<Utc>,
) -> Result<MarketSnapshot, FetchError> {
    let envelope: GraphqlEnvelope =
        serde_json::from_slice(body).map_err(|err| FetchError::Malformed(err.to_string()))?;

    let messages: Vec<&str> = envelope
        .errors
        .iter()
        .map(|err| err.message.as_str())
        .collect();

    let Some(data) = envelope.data else {
        if messages.is_empty() {
            return Err(FetchError::Malformed("response has no data".to_string()));
        }
        return Err(FetchError::Api(messages.join("; ")));
    };

    if !messages.is_empty() {
        warn!(
            component = "tarkov_api",
            event = "api.response.partial_errors",
            error_count = messages.len(),
            first_error = messages[0]
        );
    }

    let server_status = ServerStatus::from_code(
        data.status
            .current_statuses
            .first()
            .map(|status| status.status),
    );

    let mut traders = Vec::with_capacity(data.traders.len());
    for trader in data.traders {
        // Fence and Lightkeeper have no restock timer.
        let Some(raw) = trader.reset_time else {
            continue;
        };
        traders.push(TraderResetEvent {
            reset_at: parse_reset_time(&trader.name, &raw)?,
            name: trader.name,
        });
    }

    let market_items = data.market_items.into_iter().map(Item::from).collect();

    let ammo = data
        .ammo
        .into_iter()
        .map(|dto| {
            let properties = dto.properties.unwrap_or_default();
            Ammo {
                name: dto.name,
                icon_link: dto.icon_link,
                damage: properties.damage,
                penetration_power: properties.penetration_power,
            }
        })
        .collect();

    let mut offers = Vec::with_capacity(data.barters.len() + data.crafts.len());
    for barter in data.barters {
        offers.push(TradeOffer {
            kind: OfferKind::Barter,
            source: barter.trader.map(|trader| trader.name),
            level: barter.level,
            rewards: to_stacks(barter.reward_items)?,
            required: to_stacks(barter.required_items)?,
        });
    }
    for craft in data.crafts {
        offers.push(TradeOffer {
            kind: OfferKind::Craft,
            source: craft.station.map(|station| station.name),
            level: craft.level,
            rewards: to_stacks(craft.reward_items)?,
            required: to_stacks(craft.required_items)?,
        });
    }

    Ok(MarketSnapshot {
        fetched_at,
        fingerprint: fingerprint_bytes(body),
        server_status,
        traders,
        market_items,
        ammo,
        offers,
    })
}

fn parse_reset_time(trader: &str, raw: &str) -> Result<DateTime<Utc>, FetchError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            FetchError::Malformed(format!("trader {trader} has invalid resetTime {raw:?}: {err}"))
        })
}

fn to_stacks(entries: Vec<ContainedItemDto>) -> Result<Vec<ItemStack>, FetchError> {
    entries
        .into_iter()
        .map(|entry| {
            let quantity = parse_count(&entry.item.name, entry.count)?;
            Ok(ItemStack::new(Item::from(entry.item), quantity))
        })
        .collect()
}

fn parse_count(item: &str, count: f64) -> Result<u32, FetchError> {
    if !count.is_finite() || count < 0.0 || count.fract() != 0.0 || count > f64::from(u32::MAX) {
        return Err(FetchError::Malformed(format!(
            "item {item} has invalid count {count}"
        )));
    }
    Ok(count as u32)
}

pub struct TarkovApiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    query: String,
}

impl TarkovApiClient {
    /// Builds a blocking client; call from a thread that is not driving an
    /// async runtime.
    pub fn new(cfg: &ApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.http_timeout_ms))
            .build()
            .map_err(|err| FetchError::HttpClientBuild(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            query: build_query(cfg),
        })
    }

    fn post_query(&self) -> Result<Vec<u8>, FetchError> {
        let payload = serde_json::to_vec(&serde_json::json!({ "query": self.query }))
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        debug!(
            component = "tarkov_api",
            event = "api.request",
            endpoint = %self.endpoint,
            payload_bytes = payload.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "unexpected HTTP status {status}"
            )));
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

impl SnapshotFetcher for TarkovApiClient {
    fn fetch(&self) -> Result<MarketSnapshot, FetchError> {
        let body = self.post_query()?;
        parse_graphql_response(&body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    data: Option<BoardData>,
    #[serde(default)]
    errors: Vec<GraphqlErrorDto>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorDto {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardData {
    status: StatusDto,
    traders: Vec<TraderDto>,
    market_items: Vec<ItemDto>,
    ammo: Vec<AmmoDto>,
    barters: Vec<BarterDto>,
    crafts: Vec<CraftDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusDto {
    current_statuses: Vec<CurrentStatusDto>,
}

#[derive(Debug, Deserialize)]
struct CurrentStatusDto {
    status: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraderDto {
    name: String,
    reset_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    name: String,
    last_low_price: Option<i64>,
    icon_link: Option<String>,
}

impl From<ItemDto> for Item {
    fn from(dto: ItemDto) -> Self {
        Item {
            name: dto.name,
            unit_price: dto.last_low_price,
            icon_link: dto.icon_link,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmmoDto {
    name: String,
    icon_link: Option<String>,
    properties: Option<AmmoPropertiesDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmmoPropertiesDto {
    damage: Option<i64>,
    penetration_power: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct NamedDto {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BarterDto {
    trader: Option<NamedDto>,
    level: Option<u32>,
    reward_items: Vec<ContainedItemDto>,
    required_items: Vec<ContainedItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CraftDto {
    station: Option<NamedDto>,
    level: Option<u32>,
    reward_items: Vec<ContainedItemDto>,
    required_items: Vec<ContainedItemDto>,
}

#[derive(Debug, Deserialize)]
struct ContainedItemDto {
    item: ItemDto,
    count: f64,
}
