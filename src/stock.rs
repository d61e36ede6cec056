//! Stock level classification.
//!
//! An item is *critical* when its quantity is at or below the minimum,
//! *low* while it sits between the minimum and the optimal level, and
//! *normal* otherwise. Missing thresholds count as zero.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, warn};
use uuid::Uuid;

use crate::live::LiveList;
use crate::models::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Normal,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical stock",
            StockStatus::Warning => "Low stock",
            StockStatus::Normal => "Normal stock",
        }
    }

    /// Badge colour token.
    pub fn color(&self) -> &'static str {
        match self {
            StockStatus::Critical => "red",
            StockStatus::Warning => "yellow",
            StockStatus::Normal => "green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub status: StockStatus,
    /// Percentage of the optimal level, in `[0, 100]`.
    pub progress: f64,
}

pub fn classify(quantity: u32, min_stock: Option<u32>, optimal_stock: Option<u32>) -> StockLevel {
    let min = min_stock.unwrap_or(0);
    let optimal = optimal_stock.unwrap_or(0);

    let status = if quantity <= min {
        StockStatus::Critical
    } else if quantity < optimal {
        StockStatus::Warning
    } else {
        StockStatus::Normal
    };

    let progress = match status {
        StockStatus::Normal => 100.0,
        _ if optimal == 0 => 0.0,
        _ => (f64::from(quantity) / f64::from(optimal) * 100.0).clamp(0.0, 100.0),
    };

    StockLevel { status, progress }
}

pub fn assess(item: &Item) -> StockLevel {
    classify(item.quantity, item.min_stock, item.optimal_stock)
}

/// One row of the stock overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCard {
    pub item_id: Uuid,
    pub name: String,
    pub category: String,
    pub location: String,
    pub quantity: u32,
    pub min_stock: u32,
    pub optimal_stock: u32,
    pub status: StockStatus,
    pub label: String,
    pub color: String,
    pub progress: f64,
    pub purchase_link: Option<String>,
}

impl StockCard {
    pub fn from_item(item: &Item) -> Self {
        let level = assess(item);
        Self {
            item_id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
            location: item.location.clone(),
            quantity: item.quantity,
            min_stock: item.min_stock.unwrap_or(0),
            optimal_stock: item.optimal_stock.unwrap_or(0),
            status: level.status,
            label: level.status.label().to_string(),
            color: level.status.color().to_string(),
            progress: level.progress,
            purchase_link: item.purchase_link.clone(),
        }
    }
}

/// Cards for every item under stock management, in snapshot order.
pub fn stock_overview(items: &[Item]) -> Vec<StockCard> {
    items
        .iter()
        .filter(|item| item.stock_management_enabled)
        .map(StockCard::from_item)
        .collect()
}

fn critical_ids(items: &[Item]) -> BTreeSet<Uuid> {
    stock_overview(items)
        .into_iter()
        .filter(|card| card.status == StockStatus::Critical)
        .map(|card| card.item_id)
        .collect()
}

/// Cards of `snapshot` that are critical and were not in `previous`.
fn newly_critical(previous: &BTreeSet<Uuid>, snapshot: &[Item]) -> Vec<StockCard> {
    stock_overview(snapshot)
        .into_iter()
        .filter(|card| card.status == StockStatus::Critical && !previous.contains(&card.item_id))
        .collect()
}

/// Logs a warning whenever an item reaches critical stock. Runs until
/// the live list stops.
pub async fn watch_critical_items(mut items: LiveList<Item>) {
    let mut critical = critical_ids(&items.current());
    while let Some(snapshot) = items.next().await {
        for card in newly_critical(&critical, &snapshot) {
            warn!(
                item_id = %card.item_id,
                name = %card.name,
                quantity = card.quantity,
                min_stock = card.min_stock,
                "item reached critical stock"
            );
        }
        critical = critical_ids(&snapshot);
    }
    info!("critical stock watch stopped");
}
