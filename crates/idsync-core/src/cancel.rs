//! Cooperative cancellation for multi-call operations.
//!
//! Dropping a future already cancels it; [`CancelSignal`] additionally lets a
//! driver abort long operations (such as a full listing drain) from outside
//! without owning the future.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{SyncError, SyncResult};

/// Owner side: flips the signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Create a handle and the signal it controls.
    #[must_use]
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, CancelSignal { rx: Some(rx) })
    }

    /// Cancel every operation observing this handle's signal.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Get another signal observing this handle.
    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Observer side, checked by long-running operations.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires.
    #[must_use]
    pub const fn never() -> Self {
        Self { rx: None }
    }

    /// Check whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is requested. Never resolves otherwise.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            // Handle dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }

    /// Return an error if cancellation was requested.
    ///
    /// # Errors
    /// Returns [`SyncError::Cancelled`] naming `operation`.
    pub fn check(&self, operation: &str) -> SyncResult<()> {
        if self.is_cancelled() {
            return Err(SyncError::Cancelled {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Run `fut` unless cancellation is requested first.
    ///
    /// # Errors
    /// Returns [`SyncError::Cancelled`] if the signal fires before `fut`
    /// completes; `fut` is dropped in that case.
    pub async fn run<F>(&self, operation: &str, fut: F) -> SyncResult<F::Output>
    where
        F: Future,
    {
        self.check(operation)?;
        tokio::select! {
            biased;
            () = self.cancelled() => Err(SyncError::Cancelled {
                operation: operation.to_string(),
            }),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_never_signal_runs_to_completion() {
        let signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        let out = signal.run("noop", async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_short_circuits() {
        let (handle, signal) = CancelHandle::new();
        handle.cancel();
        let err = signal.run("drain", async { 1 }).await.unwrap_err();
        assert!(matches!(err, SyncError::Cancelled { operation } if operation == "drain"));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_future() {
        let (handle, signal) = CancelHandle::new();
        let task = tokio::spawn(async move {
            signal
                .run("slow", tokio::time::sleep(Duration::from_secs(30)))
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("cancellation should be prompt")
            .expect("task should not panic");
        assert!(matches!(result, Err(SyncError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_subscribed_signal_observes_handle() {
        let (handle, _signal) = CancelHandle::new();
        let other = handle.signal();
        assert!(other.check("list").is_ok());
        handle.cancel();
        assert!(other.check("list").is_err());
    }
}
