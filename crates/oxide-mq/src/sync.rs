//! Bridging callback-style operations into handlers.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;
use tracing::{trace, warn};

use crate::error::{DispatchError, Result, SyncProtocolError};
use crate::handler::{Handle, Handler, Next};
use crate::message::Message;

type Apply = Box<dyn FnOnce(&mut Message) + Send>;
type Outcome = std::result::Result<Option<Apply>, String>;

/// Completion callback handed to a [`sync`] handler.
///
/// Clones share one completion: the first call to [`complete`](Self::complete),
/// [`complete_with`](Self::complete_with) or [`fail`](Self::fail) resumes the
/// waiting handler and any later call is rejected.
#[derive(Clone)]
pub struct Done {
    sender: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl Done {
    fn new(sender: oneshot::Sender<Outcome>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// Resumes the waiting handler.
    ///
    /// # Errors
    ///
    /// Returns [`SyncProtocolError::AlreadyCompleted`] if the callback was
    /// already completed.
    pub fn complete(&self) -> std::result::Result<(), SyncProtocolError> {
        self.send(Ok(None))
    }

    /// Resumes the waiting handler after applying `apply` to its message.
    ///
    /// # Errors
    ///
    /// Returns [`SyncProtocolError::AlreadyCompleted`] if the callback was
    /// already completed.
    pub fn complete_with(
        &self,
        apply: impl FnOnce(&mut Message) + Send + 'static,
    ) -> std::result::Result<(), SyncProtocolError> {
        self.send(Ok(Some(Box::new(apply))))
    }

    /// Resumes the waiting handler with an error.
    ///
    /// # Errors
    ///
    /// Returns [`SyncProtocolError::AlreadyCompleted`] if the callback was
    /// already completed.
    pub fn fail(&self, reason: impl Into<String>) -> std::result::Result<(), SyncProtocolError> {
        self.send(Err(reason.into()))
    }

    /// Whether the callback has been completed.
    pub fn is_completed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn send(&self, outcome: Outcome) -> std::result::Result<(), SyncProtocolError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(sender) = sender else {
            warn!("completion callback invoked more than once");
            return Err(SyncProtocolError::AlreadyCompleted);
        };

        if sender.send(outcome).is_err() {
            trace!("completion arrived after the waiting handler went away");
        }
        Ok(())
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("completed", &self.is_completed())
            .finish()
    }
}

struct SyncAdapter<F>(F);

impl<F> Handle for SyncAdapter<F>
where
    F: Fn(&mut Message, Done) + Send + Sync,
{
    fn call<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>> {
        async move {
            let (tx, rx) = oneshot::channel();
            (self.0)(msg, Done::new(tx));

            match rx.await {
                Ok(Ok(apply)) => {
                    if let Some(apply) = apply {
                        apply(msg);
                    }
                    Ok(Next::Done)
                }
                Ok(Err(reason)) => Err(DispatchError::handler(reason)),
                Err(_) => {
                    warn!(value = %msg.value, "completion callback dropped");
                    Err(SyncProtocolError::Abandoned.into())
                }
            }
        }
        .boxed()
    }
}

/// Builds a handler that waits for a completion callback.
///
/// `f` receives the message and a [`Done`] callback. Route captures are not
/// passed as separate arguments; read them from [`Message::params`]. The
/// handler suspends its unit of execution until `done` is completed, which
/// may happen from another task.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use oxide_mq::{invoke, sync, Message};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handler = sync(|msg, done| {
///     let id = msg.value.clone();
///     tokio::spawn(async move {
///         tokio::time::sleep(Duration::from_millis(5)).await;
///         done.complete_with(move |msg| msg.value = format!("{id}:loaded")).unwrap();
///     });
/// });
///
/// let mut msg = Message::new("42");
/// invoke(&handler, &mut msg).await.unwrap();
/// assert_eq!(msg.value, "42:loaded");
/// # }
/// ```
pub fn sync<F>(f: F) -> Handler
where
    F: Fn(&mut Message, Done) + Send + Sync + 'static,
{
    Handler::new(SyncAdapter(f))
}
