use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeType {
    Create,
    Increase,
    Decrease,
    Update,
}

/// Append-only audit record of a change to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub quantity_changed: i64,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub note: Option<String>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

/// History entry before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub item_id: Uuid,
    pub item_name: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub quantity_changed: i64,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub note: Option<String>,
    pub details: Option<String>,
    pub user_id: String,
}

impl NewHistoryEntry {
    pub fn into_entry(self, id: Uuid, timestamp: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id,
            item_id: self.item_id,
            item_name: self.item_name,
            change_type: self.change_type,
            quantity_changed: self.quantity_changed,
            previous_quantity: self.previous_quantity,
            new_quantity: self.new_quantity,
            note: self.note,
            details: self.details,
            timestamp,
            user_id: self.user_id,
        }
    }
}
