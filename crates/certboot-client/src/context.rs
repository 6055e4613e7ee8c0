//! Caller-owned cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use certboot_core::{BootstrapError, Result};
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation signal plus optional deadline bounding a connect call.
///
/// Cloning a context shares its cancellation signal.
#[derive(Debug, Clone)]
pub struct Context {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated context and all of its clones
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    #[must_use]
    pub fn background() -> Self {
        // The sender is dropped right away, so the flag stays false forever
        let (_, cancelled) = watch::channel(false);
        Self {
            cancelled,
            deadline: None,
        }
    }

    /// A fresh context together with the handle that cancels it
    #[must_use]
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, cancelled) = watch::channel(false);
        (
            Self {
                cancelled,
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// Add a deadline `timeout` from now, keeping any earlier one
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add a deadline, keeping any earlier one
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    /// The effective deadline, if any
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context has ended, if it has
    #[must_use]
    pub fn err(&self) -> Option<BootstrapError> {
        if *self.cancelled.borrow() {
            Some(BootstrapError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(BootstrapError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> BootstrapError {
        let mut rx = self.cancelled.clone();
        let cancelled = async move {
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                // Sender gone without cancelling: never fires
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                () = cancelled => BootstrapError::Cancelled,
                () = tokio::time::sleep_until(deadline) => BootstrapError::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                BootstrapError::Cancelled
            }
        }
    }

    /// Run `fut` unless the context ends first; dropping `fut` aborts it
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = fut => Ok(output),
        }
    }

    /// Sleep for `duration` unless the context ends first
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(tokio::time::sleep(duration)).await
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
