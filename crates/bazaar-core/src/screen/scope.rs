//! Screen lifetime: abort token plus fetch generation.
//!
//! A screen runs every request through its scope. Closing the scope (the
//! user navigated away) aborts in-flight requests, and a result is only
//! delivered if no newer fetch was started in the meantime.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{BazaarError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub struct ScreenScope {
    closed: Arc<watch::Sender<bool>>,
    generation: Arc<AtomicU64>,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            closed: Arc::new(closed),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a new fetch; any older ticket becomes stale
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        !self.is_closed() && self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Run `request` as the newest fetch of this scope.
    ///
    /// Fails with `Cancelled` if the scope closes first, or if another fetch
    /// started before this one finished.
    pub async fn run<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let ticket = self.begin();
        self.finish(ticket, request).await
    }

    /// Like [`run`](Self::run) for a ticket obtained earlier
    pub async fn finish<T, F>(&self, ticket: FetchTicket, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_closed() {
            return Err(BazaarError::Cancelled);
        }

        let mut closed = self.closed.subscribe();
        let result = tokio::select! {
            result = request => result,
            _ = closed.wait_for(|closed| *closed) => return Err(BazaarError::Cancelled),
        };

        if self.is_current(ticket) {
            result
        } else {
            tracing::debug!("dropping stale response");
            Err(BazaarError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn run_delivers_result() {
        let scope = ScreenScope::new();
        let value = scope.run(async { Ok::<_, BazaarError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn closed_scope_refuses_work() {
        let scope = ScreenScope::new();
        scope.close();
        let err = scope.run(async { Ok::<_, BazaarError>(1) }).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn close_aborts_in_flight_request() {
        let scope = ScreenScope::new();
        let closer = scope.clone();

        let slow = scope.run(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BazaarError>(())
        });
        let close = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            closer.close();
        };

        let (result, ()) = tokio::join!(slow, close);
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn stale_fetch_is_dropped() {
        let scope = ScreenScope::new();
        let first = scope.begin();
        let second = scope.begin();

        let err = scope
            .finish(first, async { Ok::<_, BazaarError>("old") })
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let fresh = scope
            .finish(second, async { Ok::<_, BazaarError>("new") })
            .await
            .unwrap();
        assert_eq!(fresh, "new");
    }
}
