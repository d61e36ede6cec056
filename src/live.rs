//! Latest-snapshot holder fed by a background task.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::subscription::{Snapshot, Subscription};

/// Keeps the most recent snapshot of a subscription.
///
/// The feeding task stops when the subscription ends or when the list is
/// dropped. A failed subscription leaves an empty list behind.
pub struct LiveList<T> {
    latest: watch::Receiver<Snapshot<T>>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl<T> LiveList<T>
where
    T: Send + Sync + 'static,
{
    pub fn spawn(subscription: Subscription<T>) -> Self {
        let token = subscription.cancellation_token();
        let (tx, latest) = watch::channel(Arc::new(Vec::new()));

        tokio::spawn(async move {
            let mut snapshots = Box::pin(subscription.or_empty_on_error());
            while let Some(snapshot) = snapshots.next().await {
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            debug!("live list feed finished");
        });

        Self {
            latest,
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    pub fn current(&self) -> Snapshot<T> {
        self.latest.borrow().clone()
    }

    /// Waits for the next snapshot. Returns `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.latest.changed().await.ok()?;
        Some(self.latest.borrow_and_update().clone())
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
