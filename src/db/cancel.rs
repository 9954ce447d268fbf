use std::future::{pending, Future};
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

use crate::error::QueryError;
use crate::TARGET_DB;

/// Caller-supplied abort signal for in-flight queries.
///
/// Either half is optional: a `watch` flag flipped to `true` by whoever owns
/// the sender, and/or a deadline. When both are absent the query runs to
/// completion.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_signal(signal: watch::Receiver<bool>) -> Self {
        Cancellation {
            signal: Some(signal),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().and_timeout(timeout)
    }

    pub fn and_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Non-blocking check, used between units of work.
    pub fn is_cancelled(&self) -> bool {
        let signalled = self.signal.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        signalled || expired
    }

    async fn signalled(&self) {
        let Some(rx) = &self.signal else {
            return pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender dropped without cancelling.
                return pending().await;
            }
        }
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => pending().await,
        }
    }

    /// Race `work` against this signal. The losing future is dropped, which
    /// releases any pooled connection it holds.
    pub async fn run<T, F>(&self, work: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        tokio::select! {
            biased;
            _ = self.signalled() => {
                debug!(target: TARGET_DB, "Query cancelled by caller");
                Err(QueryError::Cancelled)
            }
            _ = self.expired() => {
                debug!(target: TARGET_DB, "Query deadline exceeded");
                Err(QueryError::DeadlineExceeded)
            }
            result = work => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_signal_runs_to_completion() {
        let cancel = Cancellation::none();
        assert!(!cancel.is_cancelled());
        let out = cancel.run(async { Ok::<_, QueryError>(5) }).await.unwrap();
        assert_eq!(out, 5);
    }

    #[tokio::test]
    async fn test_signal_aborts_pending_work() {
        let (tx, rx) = watch::channel(false);
        let cancel = Cancellation::from_signal(rx);

        let handle = tokio::spawn(async move {
            cancel
                .run(async {
                    pending::<()>().await;
                    Ok::<_, QueryError>(())
                })
                .await
        });

        tx.send(true).unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(QueryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let (_tx, rx) = watch::channel(true);
        let cancel = Cancellation::from_signal(rx);
        assert!(cancel.is_cancelled());
        let result = cancel.run(async { Ok::<_, QueryError>(1) }).await;
        assert!(matches!(result, Err(QueryError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let cancel = Cancellation::with_timeout(Duration::from_millis(50));
        let result = cancel
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, QueryError>(())
            })
            .await;
        assert!(matches!(result, Err(QueryError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_dropped_sender_never_cancels() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let cancel = Cancellation::from_signal(rx);
        let out = cancel.run(async { Ok::<_, QueryError>("done") }).await.unwrap();
        assert_eq!(out, "done");
    }
}
