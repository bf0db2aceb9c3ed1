//! Best-effort enrichment: run a remote fetch on a detached task and wait for
//! it only as long as the deadline and the caller allow.
//!
//! The worker writes its single result into a one-slot channel. Whichever of
//! {result, caller cancellation, deadline} arrives first decides the outcome.
//! A worker that loses the race is not aborted; its token is cancelled and its
//! late result is dropped by the closed channel.

use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Upper bound on the wait for live workspace info.
pub const DEFAULT_INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// Why the wait ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEnd {
    DeadlineExceeded,
    Cancelled,
    /// The worker finished without sending, i.e. it panicked.
    WorkerLost,
}

#[derive(Debug)]
pub enum EnrichmentOutcome<T, E> {
    Success(T),
    /// The fetch itself failed before the wait ended.
    OperationalFailure(E),
    TimedOut(WaitEnd),
}

impl<T, E> EnrichmentOutcome<T, E> {
    /// Collapse into the fatal/non-fatal split: only operational failures are errors.
    pub fn into_result(self) -> Result<Option<T>, E> {
        match self {
            EnrichmentOutcome::Success(value) => Ok(Some(value)),
            EnrichmentOutcome::OperationalFailure(err) => Err(err),
            EnrichmentOutcome::TimedOut(_) => Ok(None),
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, EnrichmentOutcome::TimedOut(_))
    }
}

/// Race `fetch` against `deadline` and `cancel`.
///
/// `fetch` is handed a token that is cancelled as soon as this function
/// returns, whatever the outcome.
pub async fn fetch_with_deadline<T, E, F, Fut>(
    cancel: &CancellationToken,
    deadline: Duration,
    fetch: F,
) -> EnrichmentOutcome<T, E>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let worker_token = CancellationToken::new();
    let _release_worker = worker_token.clone().drop_guard();

    let (tx, rx) = oneshot::channel();
    let work = fetch(worker_token);

    tokio::spawn(async move {
        // Fails only when nobody is listening any more.
        let _ = tx.send(work.await);
    });

    tokio::select! {
        biased;

        received = rx => match received {
            Ok(Ok(value)) => EnrichmentOutcome::Success(value),
            Ok(Err(err)) => EnrichmentOutcome::OperationalFailure(err),
            Err(_) => EnrichmentOutcome::TimedOut(WaitEnd::WorkerLost),
        },
        _ = cancel.cancelled() => EnrichmentOutcome::TimedOut(WaitEnd::Cancelled),
        _ = tokio::time::sleep(deadline) => EnrichmentOutcome::TimedOut(WaitEnd::DeadlineExceeded),
    }
}
