use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    backend::{DocumentStore, ITEMS_COLLECTION},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        DecreaseQuantityForm, EditItemForm, Item, ItemUpdate, NewItemForm, StockSettingsForm,
        User,
    },
    subscription::Subscription,
};

use super::history::{creation_entry, synthesize_update, HistoryService};

/// Service for managing inventory items
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn DocumentStore>,
    history: HistoryService,
    event_sender: EventSender,
}

impl ItemService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        history: HistoryService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            store,
            history,
            event_sender,
        }
    }

    /// Live item list, newest first.
    pub fn subscribe(&self) -> Subscription<Item> {
        self.store.subscribe_items()
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<Item, ServiceError> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", ITEMS_COLLECTION, id)))
    }

    /// Stores a new item and records its creation.
    #[instrument(skip(self, form), fields(user = %user.uid))]
    pub async fn add_item(&self, user: &User, form: NewItemForm) -> Result<Item, ServiceError> {
        let new_item = form.into_new_item()?;
        let item = self.store.create_item(new_item).await?;
        info!(item_id = %item.id, name = %item.name, "item added");

        self.event_sender
            .publish(Event::ItemCreated {
                item_id: item.id,
                name: item.name.clone(),
                quantity: item.quantity,
            })
            .await;
        self.history.record(vec![creation_entry(&item, user)]).await;

        Ok(item)
    }

    /// Applies a partial update and appends the matching history entries.
    ///
    /// Reads the stored item first to diff against it. The read and the
    /// write are separate calls, so two concurrent editors can race.
    #[instrument(skip(self, update, note), fields(user = %user.uid))]
    pub async fn update_item(
        &self,
        user: &User,
        id: Uuid,
        update: ItemUpdate,
        note: Option<String>,
    ) -> Result<Item, ServiceError> {
        let before = self.get_item(id).await?;
        let entries = synthesize_update(&before, &update, note, user);
        let fields: Vec<String> = update
            .changed_fields(&before)
            .into_iter()
            .map(str::to_string)
            .collect();

        let after = self.store.update_item(id, &update).await?;
        info!(item_id = %id, quantity = after.quantity, "item updated");

        self.event_sender
            .publish(Event::ItemUpdated {
                item_id: id,
                previous_quantity: before.quantity,
                new_quantity: after.quantity,
                fields,
            })
            .await;
        self.history.record(entries).await;

        Ok(after)
    }

    /// Saves the edit dialog. Optional fields left empty are removed.
    pub async fn edit_item(
        &self,
        user: &User,
        id: Uuid,
        form: EditItemForm,
    ) -> Result<Item, ServiceError> {
        let update = form.into_update()?;
        self.update_item(user, id, update, None).await
    }

    /// Removes `form.quantity` units, refusing to go below zero.
    pub async fn decrease_quantity(
        &self,
        user: &User,
        id: Uuid,
        form: DecreaseQuantityForm,
    ) -> Result<Item, ServiceError> {
        let current = self.get_item(id).await?;
        let (remaining, note) = form.resolve(current.quantity)?;
        self.update_item(user, id, ItemUpdate::quantity(remaining), note)
            .await
    }

    /// Removes units from the stock overview. Same rules as the decrease
    /// dialog.
    pub async fn remove_stock(
        &self,
        user: &User,
        id: Uuid,
        form: DecreaseQuantityForm,
    ) -> Result<Item, ServiceError> {
        self.decrease_quantity(user, id, form).await
    }

    /// Saves the stock dialog: thresholds and the counted quantity.
    pub async fn update_stock_settings(
        &self,
        user: &User,
        id: Uuid,
        form: StockSettingsForm,
    ) -> Result<Item, ServiceError> {
        let update = form.into_update()?;
        let current = self.get_item(id).await?;
        if !current.stock_management_enabled {
            return Err(ServiceError::field(
                "stock_management_enabled",
                "Stock management is not enabled for this item",
            ));
        }
        self.update_item(user, id, update, None).await
    }

    /// Deletes the item. Its history stays.
    #[instrument(skip(self), fields(user = %user.uid))]
    pub async fn delete_item(&self, user: &User, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_item(id).await?;
        info!(item_id = %id, "item deleted");
        self.event_sender.publish(Event::ItemDeleted(id)).await;
        Ok(())
    }
}
