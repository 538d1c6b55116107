//! Polling refresh of server state
//!
//! Polls overlap: a slow response may resolve after a newer one. Every fetch
//! takes a ticket from a monotonic counter and a response is published only
//! if its ticket is newer than the last one applied, so an older snapshot
//! never overwrites a newer one.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

/// Latest applied value and the ticket it was fetched with
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub ticket: u64,
    pub value: Option<T>,
}

/// Out-of-order safe holder of the latest polled value
#[derive(Debug)]
pub struct StateSync<T> {
    next_ticket: AtomicU64,
    latest: watch::Sender<Snapshot<T>>,
}

impl<T> Default for StateSync<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateSync<T> {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(Snapshot { ticket: 0, value: None });
        Self {
            next_ticket: AtomicU64::new(0),
            latest,
        }
    }

    /// Reserve the ticket for a request about to be sent
    pub fn issue(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a response; returns `false` when a newer one was already applied
    pub fn offer(&self, ticket: u64, value: T) -> bool {
        let applied = self.latest.send_if_modified(|snapshot| {
            if ticket <= snapshot.ticket {
                return false;
            }
            snapshot.ticket = ticket;
            snapshot.value = Some(value);
            true
        });
        if !applied {
            debug!(ticket, "dropping stale response");
        }
        applied
    }

    /// Watch applied snapshots
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.latest.subscribe()
    }

    pub fn applied_ticket(&self) -> u64 {
        self.latest.borrow().ticket
    }

    /// Fetch once and offer the result
    pub async fn refresh<F, Fut, E>(&self, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.issue();
        match fetch().await {
            Ok(value) => self.offer(ticket, value),
            Err(err) => {
                warn!(ticket, "refresh failed: {err}");
                false
            }
        }
    }
}

impl<T: Clone> StateSync<T> {
    /// Latest applied value
    pub fn current(&self) -> Option<T> {
        self.latest.borrow().value.clone()
    }
}

impl<T: Send + Sync + 'static> StateSync<T> {
    /// Poll every `period`, starting immediately
    ///
    /// Each tick runs its fetch in its own task so a slow response does not
    /// delay the next tick. Aborting the returned handle stops new ticks and
    /// cancels fetches still in flight.
    pub fn spawn_polling<F, Fut, E>(self: Arc<Self>, period: Duration, fetch: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let fetch = Arc::new(fetch);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            // Dropped with this task, which aborts every fetch it holds
            let mut in_flight = JoinSet::new();
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let sync = Arc::clone(&self);
                        let fetch = Arc::clone(&fetch);
                        in_flight.spawn(async move {
                            sync.refresh(|| fetch()).await;
                        });
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlerealm_admin::ApiError;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_stale_ticket_dropped() {
        let sync = StateSync::new();
        let older = sync.issue();
        let newer = sync.issue();
        assert!(newer > older);

        assert!(sync.offer(newer, "new"));
        assert!(!sync.offer(older, "old"));
        assert_eq!(sync.current(), Some("new"));
        assert_eq!(sync.applied_ticket(), newer);
    }

    #[tokio::test]
    async fn test_refresh_error_keeps_value() {
        let sync = StateSync::new();
        assert!(sync.refresh(|| async { Ok::<_, ApiError>(5) }).await);
        assert!(!sync.refresh(|| async { Err::<i32, _>(ApiError::transport("offline")) }).await);
        assert_eq!(sync.current(), Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_poll_does_not_overwrite_newer() {
        let sync = Arc::new(StateSync::new());
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let handle = Arc::clone(&sync).spawn_polling(Duration::from_millis(1000), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    tokio::time::sleep(Duration::from_millis(1500)).await;
                }
                Ok::<u32, ApiError>(n)
            }
        });

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(sync.current(), Some(2));

        // First poll resolves at 1500ms with an older ticket
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sync.current(), Some(2));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_cancels_in_flight_fetch() {
        let sync = Arc::new(StateSync::new());
        let handle = Arc::clone(&sync).spawn_polling(Duration::from_secs(60), || async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<u32, ApiError>(1)
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(sync.current(), None);
        assert_eq!(sync.applied_ticket(), 0);
    }
}
