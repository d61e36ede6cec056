pub mod history;
pub mod item;
pub mod patch;

pub use history::{ChangeType, HistoryEntry, NewHistoryEntry};
pub use item::{
    Condition, DecreaseQuantityForm, EditItemForm, Item, ItemUpdate, NewItem, NewItemForm,
    StockSettings, StockSettingsForm,
};
pub use patch::Patch;

use serde::{Deserialize, Serialize};

/// Authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}
