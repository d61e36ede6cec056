use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::ChangeType;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the loop is gone.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "event dropped");
        }
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

// Domain events raised by item mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ItemCreated {
        item_id: Uuid,
        name: String,
        quantity: u32,
    },
    ItemUpdated {
        item_id: Uuid,
        previous_quantity: u32,
        new_quantity: u32,
        fields: Vec<String>,
    },
    ItemDeleted(Uuid),
    HistoryRecorded {
        entry_id: Uuid,
        item_id: Uuid,
        change_type: ChangeType,
        timestamp: DateTime<Utc>,
    },
    HistoryWriteFailed {
        item_id: Uuid,
        change_type: ChangeType,
        error: String,
    },
}

impl Event {
    pub fn item_id(&self) -> Uuid {
        match self {
            Event::ItemCreated { item_id, .. }
            | Event::ItemUpdated { item_id, .. }
            | Event::HistoryRecorded { item_id, .. }
            | Event::HistoryWriteFailed { item_id, .. } => *item_id,
            Event::ItemDeleted(item_id) => *item_id,
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::ItemCreated {
                item_id,
                name,
                quantity,
            } => {
                info!(%item_id, %name, quantity, "item created");
            }
            Event::ItemUpdated {
                item_id,
                previous_quantity,
                new_quantity,
                fields,
            } => {
                info!(
                    %item_id,
                    previous_quantity,
                    new_quantity,
                    fields = %fields.join(", "),
                    "item updated"
                );
            }
            Event::ItemDeleted(item_id) => {
                info!(%item_id, "item deleted");
            }
            Event::HistoryRecorded {
                entry_id,
                item_id,
                change_type,
                ..
            } => {
                info!(%entry_id, %item_id, %change_type, "history recorded");
            }
            Event::HistoryWriteFailed {
                item_id,
                change_type,
                error,
            } => {
                warn!(%item_id, %change_type, %error, "history entry was not recorded");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver_in_order() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender
            .publish(Event::ItemCreated {
                item_id: id,
                name: "Plates".into(),
                quantity: 6,
            })
            .await;
        sender.publish(Event::ItemDeleted(id)).await;

        assert_eq!(rx.recv().await.map(|e| e.item_id()), Some(id));
        assert_eq!(rx.recv().await, Some(Event::ItemDeleted(id)));
    }

    #[tokio::test]
    async fn send_fails_once_the_loop_is_gone() {
        let (sender, rx) = channel(1);
        drop(rx);
        assert!(sender.send(Event::ItemDeleted(Uuid::new_v4())).await.is_err());
        // publish only logs
        sender.publish(Event::ItemDeleted(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn loop_ends_when_senders_drop() {
        let (sender, rx) = channel(2);
        let handle = tokio::spawn(process_events(rx));
        sender.publish(Event::ItemDeleted(Uuid::new_v4())).await;
        drop(sender);
        handle.await.unwrap();
    }
}
