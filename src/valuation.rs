//! Barter and craft profitability.
//!
//! A trade offer consumes the required bundle and produces the reward bundle.
//! Profit is the flea value of the primary reward minus what the inputs would
//! cost on the flea market. All arithmetic is integer roubles and saturating.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub unit_price: Option<i64>,
    pub icon_link: Option<String>,
}

impl Item {
    pub fn priced(name: impl Into<String>, unit_price: i64) -> Self {
        Self {
            name: name.into(),
            unit_price: Some(unit_price),
            icon_link: None,
        }
    }

    pub fn unpriced(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_price: None,
            icon_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item: Item, quantity: u32) -> Self {
        Self { item, quantity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Barter,
    Craft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub kind: OfferKind,
    /// Trader name for barters, station name for crafts.
    pub source: Option<String>,
    pub level: Option<u32>,
    pub rewards: Vec<ItemStack>,
    pub required: Vec<ItemStack>,
}

impl TradeOffer {
    pub fn primary_reward(&self) -> Option<&ItemStack> {
        self.rewards.first()
    }
}

/// How a required item without a price contributes to acquisition cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "unit_cost", rename_all = "snake_case")]
pub enum MissingPricePolicy {
    /// The item costs nothing. Profit can only be understated by unknown
    /// inputs, never inflated by a placeholder.
    #[default]
    Zero,
    /// Every unit of an unpriced item costs the given amount. Large values
    /// push offers with unknown inputs out of the ranking.
    Penalty(i64),
}

impl MissingPricePolicy {
    fn unit_cost(self, unit_price: Option<i64>) -> i64 {
        match (unit_price, self) {
            (Some(price), _) => price,
            (None, Self::Zero) => 0,
            (None, Self::Penalty(cost)) => cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitResult {
    pub kind: OfferKind,
    pub reward_name: String,
    pub reward_icon: Option<String>,
    pub source: Option<String>,
    pub level: Option<u32>,
    pub sale_value: i64,
    pub acquisition_cost: i64,
    pub profit: i64,
    /// Required entries whose price was missing and were costed by policy.
    pub unpriced_inputs: usize,
}

pub fn compute_profit(offer: &TradeOffer) -> Option<ProfitResult> {
    compute_profit_with_policy(offer, MissingPricePolicy::Zero)
}

/// Returns `None` when profit is undefined: no reward entry, or the primary
/// reward has no price.
pub fn compute_profit_with_policy(
    offer: &TradeOffer,
    policy: MissingPricePolicy,
) -> Option<ProfitResult> {
    let reward = offer.primary_reward()?;
    let reward_price = reward.item.unit_price?;
    let sale_value = reward_price.saturating_mul(i64::from(reward.quantity));

    let mut acquisition_cost: i64 = 0;
    let mut unpriced_inputs = 0;
    for stack in &offer.required {
        if stack.item.unit_price.is_none() {
            unpriced_inputs += 1;
        }
        let line = policy
            .unit_cost(stack.item.unit_price)
            .saturating_mul(i64::from(stack.quantity));
        acquisition_cost = acquisition_cost.saturating_add(line);
    }

    Some(ProfitResult {
        kind: offer.kind,
        reward_name: reward.item.name.clone(),
        reward_icon: reward.item.icon_link.clone(),
        source: offer.source.clone(),
        level: offer.level,
        sale_value,
        acquisition_cost,
        profit: sale_value.saturating_sub(acquisition_cost),
        unpriced_inputs,
    })
}

pub fn rank_profitable(offers: &[TradeOffer], min_profit: i64) -> Vec<ProfitResult> {
    rank_profitable_with_policy(offers, min_profit, MissingPricePolicy::Zero)
}

/// Offers with undefined profit or `profit <= min_profit` are dropped. The
/// rest are sorted by descending profit; equal profits keep input order.
pub fn rank_profitable_with_policy(
    offers: &[TradeOffer],
    min_profit: i64,
    policy: MissingPricePolicy,
) -> Vec<ProfitResult> {
    let mut ranked: Vec<ProfitResult> = offers
        .iter()
        .filter_map(|offer| compute_profit_with_policy(offer, policy))
        .filter(|result| result.profit > min_profit)
        .collect();

    ranked.sort_by(|a, b| b.profit.cmp(&a.profit));
    ranked
}
