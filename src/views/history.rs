use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChangeType, HistoryEntry};

/// Display label and badge colour for a change type.
pub fn change_label(change_type: ChangeType) -> (&'static str, &'static str) {
    match change_type {
        ChangeType::Increase => ("Stock added", "green"),
        ChangeType::Decrease => ("Stock removed", "red"),
        ChangeType::Update => ("Update", "blue"),
        ChangeType::Create => ("Created", "gray"),
    }
}

/// One line of the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub label: String,
    pub color: String,
    /// Signed amount, e.g. "-3" or "+2".
    pub quantity: String,
    /// "(previous → new)"
    pub transition: String,
    pub note: String,
    pub details: Option<String>,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        let (label, color) = change_label(entry.change_type);
        let sign = if entry.change_type == ChangeType::Decrease {
            '-'
        } else {
            '+'
        };
        Self {
            id: entry.id,
            item_id: entry.item_id,
            item_name: entry.item_name.clone(),
            timestamp: entry.timestamp,
            change_type: entry.change_type,
            label: label.to_string(),
            color: color.to_string(),
            quantity: format!("{}{}", sign, entry.quantity_changed.unsigned_abs()),
            transition: format!("({} → {})", entry.previous_quantity, entry.new_quantity),
            note: entry
                .note
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            details: entry.details.clone(),
        }
    }
}

pub fn history_rows(entries: &[HistoryEntry]) -> Vec<HistoryRow> {
    entries.iter().map(HistoryRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(change_type: ChangeType, delta: i64, previous: u32, new: u32) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            item_name: "Glasses".into(),
            change_type,
            quantity_changed: delta,
            previous_quantity: previous,
            new_quantity: new,
            note: None,
            details: None,
            timestamp: Utc::now(),
            user_id: "u1".into(),
        }
    }

    #[test]
    fn decrease_row() {
        let mut e = entry(ChangeType::Decrease, -3, 8, 5);
        e.note = Some("broken".into());
        let row = HistoryRow::from(&e);
        assert_eq!(row.label, "Stock removed");
        assert_eq!(row.quantity, "-3");
        assert_eq!(row.transition, "(8 → 5)");
        assert_eq!(row.note, "broken");
    }

    #[test]
    fn other_rows_use_plus_sign() {
        let row = HistoryRow::from(&entry(ChangeType::Increase, 2, 1, 3));
        assert_eq!((row.label.as_str(), row.quantity.as_str()), ("Stock added", "+2"));

        let row = HistoryRow::from(&entry(ChangeType::Update, 0, 3, 3));
        assert_eq!((row.label.as_str(), row.quantity.as_str()), ("Update", "+0"));
        assert_eq!(row.note, "-");

        let row = HistoryRow::from(&entry(ChangeType::Create, 6, 0, 6));
        assert_eq!(row.label, "Created");
    }
}
