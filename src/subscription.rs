//! Snapshot subscriptions as async streams.
//!
//! A backend delivers the full current result set of a query every time it
//! changes. Here that is a [`Subscription`]: a `Stream` of immutable
//! snapshots that stops as soon as its [`CancellationToken`] is cancelled.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::backend::BackendError;

/// Full result set of a query at one point in time.
pub type Snapshot<T> = Arc<Vec<T>>;

pub type SnapshotResult<T> = Result<Snapshot<T>, BackendError>;

pub struct Subscription<T> {
    stream: BoxStream<'static, SnapshotResult<T>>,
    token: CancellationToken,
}

impl<T> Subscription<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<S>(stream: S, token: CancellationToken) -> Self
    where
        S: Stream<Item = SnapshotResult<T>> + Send + 'static,
    {
        let stream = stream.take_until(token.clone().cancelled_owned()).boxed();
        Self { stream, token }
    }

    /// A finite subscription over canned snapshots.
    pub fn from_snapshots(snapshots: Vec<Result<Vec<T>, BackendError>>) -> Self {
        let stream = stream::iter(
            snapshots
                .into_iter()
                .map(|snapshot| snapshot.map(Arc::new)),
        );
        Self::new(stream, CancellationToken::new())
    }

    /// A subscription that fails immediately, as a backend does when the
    /// query is rejected.
    pub fn failed(error: BackendError) -> Self {
        Self::from_snapshots(vec![Err(error)])
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Applies the read-model contract: a failed subscription presents an
    /// empty list once and then ends, it never propagates the error.
    pub fn or_empty_on_error(self) -> impl Stream<Item = Snapshot<T>> + Send + 'static {
        self.scan(false, |failed, next| {
            if *failed {
                return futures::future::ready(None);
            }
            let snapshot = match next {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(error = %err, "snapshot subscription failed, presenting an empty list");
                    *failed = true;
                    Arc::new(Vec::new())
                }
            };
            futures::future::ready(Some(snapshot))
        })
    }

    /// First snapshot of the subscription under the same contract, then
    /// unsubscribes.
    pub async fn first_or_empty(self) -> Snapshot<T> {
        let token = self.cancellation_token();
        let snapshot = Box::pin(self.or_empty_on_error()).next().await;
        token.cancel();
        snapshot.unwrap_or_default()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = SnapshotResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().stream.poll_next_unpin(cx)
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_snapshots_are_delivered_in_order() {
        let subscription = Subscription::from_snapshots(vec![Ok(vec![1]), Ok(vec![1, 2])]);
        let snapshots: Vec<_> = subscription.collect().await;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].as_ref().unwrap().as_slice(), &[1, 2]);
    }

    #[tokio::test]
    async fn error_becomes_a_single_empty_list() {
        let subscription = Subscription::from_snapshots(vec![
            Ok(vec!["a"]),
            Err(BackendError::PermissionDenied),
            Ok(vec!["never"]),
        ]);
        let snapshots: Vec<_> = subscription.or_empty_on_error().collect().await;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].as_slice(), &["a"]);
        assert!(snapshots[1].is_empty());
    }

    #[tokio::test]
    async fn cancelled_subscription_ends() {
        let subscription = Subscription::new(stream::pending::<SnapshotResult<u8>>(), CancellationToken::new());
        subscription.cancel();
        let snapshots: Vec<_> = subscription.collect().await;
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn first_or_empty_on_failed_subscription() {
        let snapshot = Subscription::<u8>::failed(BackendError::PermissionDenied)
            .first_or_empty()
            .await;
        assert!(snapshot.is_empty());
    }
}
