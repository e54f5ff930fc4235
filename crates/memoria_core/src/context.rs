//! Request-scoped cancellation and deadline propagation.

use crate::error::{AppError, StorageError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation scope for one directory call.
///
/// The engine has no timeouts of its own; it stops waiting on storage as soon
/// as the caller cancels or the caller's deadline passes.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bind to an existing cancellation token, e.g. one owned by the HTTP layer.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Return a copy that gives up at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Return a copy that gives up `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether this context, or any clone of it, was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The instant after which calls give up, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast when the context has already ended.
    ///
    /// # Errors
    /// Returns [`AppError::Cancelled`] or [`AppError::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), AppError> {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(AppError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Await a storage call, abandoning it if the context ends first.
    ///
    /// # Errors
    /// Returns the storage error converted to [`AppError`], or a cancellation
    /// error when the context ends before the call completes.
    pub async fn run<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            _ = deadline => Err(AppError::DeadlineExceeded),
            result = call => result.map_err(AppError::from),
        }
    }
}
