use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    backend::DocumentStore,
    events::{Event, EventSender},
    models::{ChangeType, HistoryEntry, Item, ItemUpdate, NewHistoryEntry, User},
    subscription::Subscription,
};

/// Entry written when an item is first stored.
pub fn creation_entry(item: &Item, user: &User) -> NewHistoryEntry {
    NewHistoryEntry {
        item_id: item.id,
        item_name: item.name.clone(),
        change_type: ChangeType::Create,
        quantity_changed: i64::from(item.quantity),
        previous_quantity: 0,
        new_quantity: item.quantity,
        note: None,
        details: Some("Item created".to_string()),
        user_id: user.uid.clone(),
    }
}

/// Entries describing `update` applied to `before`.
///
/// A quantity change yields an increase or decrease entry carrying the
/// note; any other changed field yields one update entry listing them.
/// Never more than two entries.
pub fn synthesize_update(
    before: &Item,
    update: &ItemUpdate,
    note: Option<String>,
    user: &User,
) -> Vec<NewHistoryEntry> {
    let mut entries = Vec::with_capacity(2);

    if let Some(quantity) = update.quantity.filter(|q| *q != before.quantity) {
        let delta = i64::from(quantity) - i64::from(before.quantity);
        entries.push(NewHistoryEntry {
            item_id: before.id,
            item_name: before.name.clone(),
            change_type: if delta < 0 {
                ChangeType::Decrease
            } else {
                ChangeType::Increase
            },
            quantity_changed: delta,
            previous_quantity: before.quantity,
            new_quantity: quantity,
            note,
            details: None,
            user_id: user.uid.clone(),
        });
    }

    let fields = update.changed_fields(before);
    if !fields.is_empty() {
        entries.push(NewHistoryEntry {
            item_id: before.id,
            item_name: before.name.clone(),
            change_type: ChangeType::Update,
            quantity_changed: 0,
            previous_quantity: before.quantity,
            new_quantity: before.quantity,
            note: None,
            details: Some(format!("Modified fields: {}", fields.join(", "))),
            user_id: user.uid.clone(),
        });
    }

    entries
}

/// Service for the append-only change history
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn DocumentStore>,
    event_sender: EventSender,
}

impl HistoryService {
    pub fn new(store: Arc<dyn DocumentStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// Appends entries without failing the caller.
    ///
    /// A rejected write is logged and reported on the event bus; the item
    /// change that produced it stands.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn record(&self, entries: Vec<NewHistoryEntry>) -> Vec<HistoryEntry> {
        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            let item_id = entry.item_id;
            let change_type = entry.change_type;
            match self.store.append_history(entry).await {
                Ok(stored) => {
                    self.event_sender
                        .publish(Event::HistoryRecorded {
                            entry_id: stored.id,
                            item_id,
                            change_type,
                            timestamp: stored.timestamp,
                        })
                        .await;
                    written.push(stored);
                }
                Err(e) => {
                    warn!(%item_id, %change_type, error = %e, "failed to append history entry");
                    self.event_sender
                        .publish(Event::HistoryWriteFailed {
                            item_id,
                            change_type,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }
        written
    }

    /// Live history, newest first, optionally for a single item.
    pub fn subscribe(&self, item_id: Option<Uuid>) -> Subscription<HistoryEntry> {
        self.store.subscribe_history(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, Patch};
    use chrono::Utc;

    fn user() -> User {
        User {
            uid: "u1".into(),
            email: "u1@example.com".into(),
        }
    }

    fn item(quantity: u32) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: "Sheets".into(),
            quantity,
            category: "Linge de maison".into(),
            location: "Chambre".into(),
            condition: Some(Condition::Good),
            notes: None,
            purchase_link: None,
            stock_management_enabled: false,
            min_stock: None,
            optimal_stock: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quantity_only_update_yields_one_delta_entry() {
        let before = item(5);
        let entries = synthesize_update(
            &before,
            &ItemUpdate::quantity(2),
            Some("torn".into()),
            &user(),
        );
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.change_type, ChangeType::Decrease);
        assert_eq!(entry.quantity_changed, -3);
        assert_eq!(entry.previous_quantity, 5);
        assert_eq!(entry.new_quantity, 2);
        assert_eq!(entry.note.as_deref(), Some("torn"));
    }

    #[test]
    fn increase_is_positive() {
        let entries = synthesize_update(&item(1), &ItemUpdate::quantity(4), None, &user());
        assert_eq!(entries[0].change_type, ChangeType::Increase);
        assert_eq!(entries[0].quantity_changed, 3);
    }

    #[test]
    fn field_only_update_yields_one_update_entry() {
        let before = item(3);
        let update = ItemUpdate {
            location: Some("Dressing".into()),
            condition: Patch::Clear,
            ..Default::default()
        };
        let entries = synthesize_update(&before, &update, None, &user());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].change_type, ChangeType::Update);
        assert_eq!(entries[0].quantity_changed, 0);
        assert_eq!(entries[0].previous_quantity, 3);
        assert_eq!(entries[0].new_quantity, 3);
        assert_eq!(
            entries[0].details.as_deref(),
            Some("Modified fields: location, condition")
        );
    }

    #[test]
    fn combined_update_yields_two_entries() {
        let update = ItemUpdate {
            quantity: Some(7),
            name: Some("Fitted sheets".into()),
            ..Default::default()
        };
        let entries = synthesize_update(&item(3), &update, None, &user());
        let kinds: Vec<_> = entries.iter().map(|e| e.change_type).collect();
        assert_eq!(kinds, vec![ChangeType::Increase, ChangeType::Update]);
        assert_eq!(entries[1].item_name, "Sheets");
    }

    #[test]
    fn unchanged_values_yield_nothing() {
        let before = item(3);
        let update = ItemUpdate {
            quantity: Some(3),
            name: Some(before.name.clone()),
            ..Default::default()
        };
        assert!(synthesize_update(&before, &update, None, &user()).is_empty());
    }

    #[test]
    fn creation_entry_starts_from_zero() {
        let entry = creation_entry(&item(4), &user());
        assert_eq!(entry.change_type, ChangeType::Create);
        assert_eq!(entry.previous_quantity, 0);
        assert_eq!(entry.new_quantity, 4);
        assert_eq!(entry.quantity_changed, 4);
    }
}
