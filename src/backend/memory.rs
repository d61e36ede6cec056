use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use super::{AuthBackend, BackendError, BlobStore, DocumentStore};
use crate::models::{HistoryEntry, Item, ItemUpdate, NewHistoryEntry, NewItem, User};
use crate::subscription::{Snapshot, Subscription};

const BLOB_URL_PREFIX: &str = "memory://blobs/";

#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_digest: String,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process stand-in for the managed backend.
///
/// Each collection keeps a watch channel holding its latest ordered
/// snapshot; every write recomputes the snapshot inside the channel lock so
/// subscribers always observe writes in order.
pub struct MemoryBackend {
    items: DashMap<Uuid, Stored<Item>>,
    history: DashMap<Uuid, Stored<HistoryEntry>>,
    accounts: DashMap<String, Account>,
    blobs: DashMap<String, Vec<u8>>,
    seq: AtomicU64,
    items_tx: watch::Sender<Snapshot<Item>>,
    history_tx: watch::Sender<Snapshot<HistoryEntry>>,
    permission_denied: AtomicBool,
    history_writes_fail: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (items_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (history_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            items: DashMap::new(),
            history: DashMap::new(),
            accounts: DashMap::new(),
            blobs: DashMap::new(),
            seq: AtomicU64::new(0),
            items_tx,
            history_tx,
            permission_denied: AtomicBool::new(false),
            history_writes_fail: AtomicBool::new(false),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Rejects every document read, write and new subscription, the way
    /// the real service does when security rules deny access.
    pub fn set_permission_denied(&self, denied: bool) {
        self.permission_denied.store(denied, Ordering::SeqCst);
    }

    /// Makes history appends fail while item writes keep working.
    pub fn set_history_writes_fail(&self, fail: bool) {
        self.history_writes_fail.store(fail, Ordering::SeqCst);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn check_access(&self) -> Result<(), BackendError> {
        if self.permission_denied.load(Ordering::SeqCst) {
            Err(BackendError::PermissionDenied)
        } else {
            Ok(())
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn publish_items(&self) {
        self.items_tx.send_modify(|snapshot| {
            let mut stored: Vec<Stored<Item>> =
                self.items.iter().map(|e| e.value().clone()).collect();
            stored.sort_by(|a, b| {
                (b.value.created_at, b.seq).cmp(&(a.value.created_at, a.seq))
            });
            *snapshot = Arc::new(stored.into_iter().map(|s| s.value).collect());
        });
    }

    fn publish_history(&self) {
        self.history_tx.send_modify(|snapshot| {
            let mut stored: Vec<Stored<HistoryEntry>> =
                self.history.iter().map(|e| e.value().clone()).collect();
            stored.sort_by(|a, b| (b.value.timestamp, b.seq).cmp(&(a.value.timestamp, a.seq)));
            *snapshot = Arc::new(stored.into_iter().map(|s| s.value).collect());
        });
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let account = self
            .accounts
            .get(&email.trim().to_lowercase())
            .map(|a| a.value().clone())
            .ok_or(BackendError::UserNotFound)?;
        if digest(&account.salt, password) != account.password_digest {
            return Err(BackendError::WrongPassword);
        }
        Ok(User {
            uid: account.uid,
            email: account.email,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let key = email.trim().to_lowercase();
        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.trim().to_string(),
            password_digest: digest(&salt, password),
            salt,
        };
        match self.accounts.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(BackendError::EmailInUse),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(account.clone());
                debug!(uid = %account.uid, "account created");
                Ok(User {
                    uid: account.uid,
                    email: account.email,
                })
            }
        }
    }

    async fn sign_out(&self, user: &User) -> Result<(), BackendError> {
        debug!(uid = %user.uid, "signed out");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_item(&self, item: NewItem) -> Result<Item, BackendError> {
        self.check_access()?;
        let item = item.into_item(Uuid::new_v4(), Utc::now());
        self.items.insert(
            item.id,
            Stored {
                seq: self.next_seq(),
                value: item.clone(),
            },
        );
        self.publish_items();
        Ok(item)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, BackendError> {
        self.check_access()?;
        Ok(self.items.get(&id).map(|e| e.value().value.clone()))
    }

    async fn update_item(&self, id: Uuid, update: &ItemUpdate) -> Result<Item, BackendError> {
        self.check_access()?;
        let updated = {
            let mut entry = self
                .items
                .get_mut(&id)
                .ok_or_else(|| BackendError::NotFound(format!("{}/{}", super::ITEMS_COLLECTION, id)))?;
            entry.value = update.apply_to(&entry.value);
            entry.value.clone()
        };
        self.publish_items();
        Ok(updated)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), BackendError> {
        self.check_access()?;
        self.items.remove(&id);
        self.publish_items();
        Ok(())
    }

    fn subscribe_items(&self) -> Subscription<Item> {
        if let Err(err) = self.check_access() {
            return Subscription::failed(err);
        }
        let stream = WatchStream::new(self.items_tx.subscribe()).map(Ok);
        Subscription::new(stream, CancellationToken::new())
    }

    async fn append_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, BackendError> {
        self.check_access()?;
        if self.history_writes_fail.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!(
                "{} collection rejected the write",
                super::HISTORY_COLLECTION
            )));
        }
        let entry = entry.into_entry(Uuid::new_v4(), Utc::now());
        self.history.insert(
            entry.id,
            Stored {
                seq: self.next_seq(),
                value: entry.clone(),
            },
        );
        self.publish_history();
        Ok(entry)
    }

    fn subscribe_history(&self, item_id: Option<Uuid>) -> Subscription<HistoryEntry> {
        if let Err(err) = self.check_access() {
            return Subscription::failed(err);
        }
        let stream = WatchStream::new(self.history_tx.subscribe()).map(move |snapshot| {
            Ok(match item_id {
                Some(id) => Arc::new(
                    snapshot
                        .iter()
                        .filter(|entry| entry.item_id == id)
                        .cloned()
                        .collect(),
                ),
                None => snapshot,
            })
        });
        Subscription::new(stream, CancellationToken::new())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<String, BackendError> {
        self.check_access()?;
        let path = path.trim_start_matches('/').to_string();
        self.blobs.insert(path.clone(), bytes);
        Ok(format!("{}{}", BLOB_URL_PREFIX, path))
    }

    async fn delete(&self, url: &str) -> Result<(), BackendError> {
        self.check_access()?;
        let path = url.strip_prefix(BLOB_URL_PREFIX).unwrap_or(url);
        self.blobs
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(url.to_string()))
    }
}
