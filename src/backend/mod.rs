//! Boundary to the managed backend.
//!
//! Authentication, document storage with live queries, and blob storage are
//! provided by an external service. These traits describe the contract the
//! rest of the crate relies on; [`memory::MemoryBackend`] implements all of
//! them in-process for tests and local runs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{HistoryEntry, Item, ItemUpdate, NewHistoryEntry, NewItem, User};
use crate::subscription::Subscription;

pub mod memory;

pub use memory::MemoryBackend;

pub const ITEMS_COLLECTION: &str = "items";
pub const HISTORY_COLLECTION: &str = "history";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("email already in use")]
    EmailInUse,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError>;
    async fn sign_out(&self, user: &User) -> Result<(), BackendError>;
}

/// Document store holding the `items` and `history` collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_item(&self, item: NewItem) -> Result<Item, BackendError>;

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, BackendError>;

    /// Partial update; `Patch::Clear` removes the stored field.
    async fn update_item(&self, id: Uuid, update: &ItemUpdate) -> Result<Item, BackendError>;

    async fn delete_item(&self, id: Uuid) -> Result<(), BackendError>;

    /// Live query over all items, newest first by creation time.
    fn subscribe_items(&self) -> Subscription<Item>;

    async fn append_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, BackendError>;

    /// Live query over history, newest first, optionally for one item.
    fn subscribe_history(&self, item_id: Option<Uuid>) -> Subscription<HistoryEntry>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the bytes under `path` and returns their public URL.
    async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<String, BackendError>;

    async fn delete(&self, url: &str) -> Result<(), BackendError>;
}
