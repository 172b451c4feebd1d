//! Single-fire completion signal.
//!
//! A [`Trigger`] and a [`Completion`] are created as a pair. The trigger is
//! held by whichever pipeline stage owns the lifecycle event; the completion
//! is handed to the caller and resolves once the trigger fires. Firing is
//! idempotent: only the first call has any effect.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::task::Context;
use std::task::Poll;

use log::debug;
use tokio::sync::oneshot;

use crate::ExtractionError;
use crate::Result;

/// Creates a connected trigger/completion pair.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (trigger, completion) = unpipe_core::completion::pair();
/// assert!(trigger.fire());
/// assert!(!trigger.fire());
/// assert!(completion.await.is_ok());
/// # }
/// ```
#[must_use]
pub fn pair() -> (Trigger, Completion) {
    let (tx, rx) = oneshot::channel();
    (
        Trigger {
            tx: Mutex::new(Some(tx)),
        },
        Completion { rx },
    )
}

/// Sending half of the completion signal.
///
/// Dropping a trigger that never fired leaves the paired [`Completion`]
/// unfulfilled; it then resolves to `ExtractionError::CompletionDropped`.
#[derive(Debug)]
pub struct Trigger {
    tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl Trigger {
    /// Fires the signal.
    ///
    /// Returns `true` if this call fulfilled the signal, `false` if it had
    /// already been fired. A receiver that has gone away does not count as a
    /// failure: the signal is still consumed.
    pub fn fire(&self) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!("completion fired with no listener attached");
                }
                true
            }
            None => {
                debug!("ignoring repeated completion fire");
                false
            }
        }
    }

    /// Returns `true` once the signal has been fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Receiving half of the completion signal.
///
/// Resolves to `Ok(())` when the trigger fires, or to
/// `Err(ExtractionError::CompletionDropped)` when the trigger is dropped
/// without firing.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Checks whether the signal has resolved without waiting.
    ///
    /// Returns `None` while the signal is still pending.
    pub fn try_resolve(&mut self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(()) => Some(Ok(())),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Some(Err(ExtractionError::CompletionDropped))
            }
        }
    }
}

impl Future for Completion {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| ExtractionError::CompletionDropped))
    }
}
