//! Handler values and their return protocol.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::chain::Chain;
use crate::error::Result;
use crate::message::Message;
use crate::routing::Routing;

/// What to do after a handler returns.
#[derive(Debug, Clone)]
pub enum Next {
    /// The handler is finished.
    Done,
    /// Invoke this handler against the same message.
    Continue(Handler),
}

/// Conversion of handler return values into [`Next`].
///
/// Implemented for `()`, [`Next`], [`Handler`], `Option<Handler>` and
/// `Result<T>` of any of these.
pub trait IntoNext {
    /// Converts the value.
    fn into_next(self) -> Result<Next>;
}

impl IntoNext for () {
    fn into_next(self) -> Result<Next> {
        Ok(Next::Done)
    }
}

impl IntoNext for Next {
    fn into_next(self) -> Result<Next> {
        Ok(self)
    }
}

impl IntoNext for Handler {
    fn into_next(self) -> Result<Next> {
        Ok(Next::Continue(self))
    }
}

impl IntoNext for Option<Handler> {
    fn into_next(self) -> Result<Next> {
        Ok(self.map_or(Next::Done, Next::Continue))
    }
}

impl<T: IntoNext> IntoNext for Result<T> {
    fn into_next(self) -> Result<Next> {
        self.and_then(IntoNext::into_next)
    }
}

/// A single message-processing function.
///
/// Most handlers are built from closures with [`Handler::func`] or
/// [`Handler::future`]; implement this trait for handlers that carry state.
///
/// # Example
///
/// ```
/// use futures::future::{BoxFuture, FutureExt};
/// use oxide_mq::{Handle, Message, Next, Result};
///
/// struct Tag(&'static str);
///
/// impl Handle for Tag {
///     fn call<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>> {
///         async move {
///             msg.params.push(self.0.to_string());
///             Ok(Next::Done)
///         }
///         .boxed()
///     }
/// }
/// ```
pub trait Handle: Send + Sync {
    /// Processes the message.
    fn call<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>>;
}

struct SyncFn<F>(F);

impl<F, R> Handle for SyncFn<F>
where
    F: Fn(&mut Message) -> R + Send + Sync,
    R: IntoNext,
{
    fn call<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>> {
        future::ready((self.0)(msg).into_next()).boxed()
    }
}

struct AsyncFn<F>(F);

impl<F, R> Handle for AsyncFn<F>
where
    F: for<'a> Fn(&'a mut Message) -> BoxFuture<'a, R> + Send + Sync,
    R: IntoNext + 'static,
{
    fn call<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>> {
        (self.0)(msg).map(IntoNext::into_next).boxed()
    }
}

/// A dispatchable value: a function, an ordered chain, or a route table.
///
/// Handlers are cheap to clone; chains and tables are shared and released
/// when the last handler owning them is dropped.
#[derive(Clone)]
pub enum Handler {
    /// A single function.
    Func(Arc<dyn Handle>),
    /// Handlers run in order.
    Chain(Arc<Chain>),
    /// A route table.
    Routing(Arc<Routing>),
}

impl Handler {
    /// Wraps a [`Handle`] implementation.
    pub fn new(handle: impl Handle + 'static) -> Self {
        Self::Func(Arc::new(handle))
    }

    /// Builds a handler from a synchronous closure.
    ///
    /// The closure may return `()`, [`Next`], a [`Handler`] to continue
    /// with, or a `Result` of these.
    ///
    /// ```
    /// use oxide_mq::{Handler, Message};
    ///
    /// let handler = Handler::func(|msg: &mut Message| msg.value.push('!'));
    /// ```
    pub fn func<F, R>(f: F) -> Self
    where
        F: Fn(&mut Message) -> R + Send + Sync + 'static,
        R: IntoNext + 'static,
    {
        Self::new(SyncFn(f))
    }

    /// Builds a handler from a closure returning a boxed future.
    ///
    /// ```
    /// use futures::FutureExt;
    /// use oxide_mq::{Handler, Message};
    ///
    /// let handler = Handler::future(|msg: &mut Message| {
    ///     async move {
    ///         tokio::task::yield_now().await;
    ///         msg.value.push('!');
    ///     }
    ///     .boxed()
    /// });
    /// ```
    pub fn future<F, R>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Message) -> BoxFuture<'a, R> + Send + Sync + 'static,
        R: IntoNext + 'static,
    {
        Self::new(AsyncFn(f))
    }

    /// Runs exactly one handler and returns its continuation unapplied.
    ///
    /// Chains and tables run to completion and always return [`Next::Done`].
    pub fn step<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<Next>> {
        match self {
            Self::Func(handle) => handle.call(msg),
            Self::Chain(chain) => chain.run(msg).map(|r| r.map(|()| Next::Done)).boxed(),
            Self::Routing(routing) => routing.dispatch(msg).map(|r| r.map(|()| Next::Done)).boxed(),
        }
    }

    /// Whether this handler runs in its own unit when nested.
    pub(crate) const fn is_nested_level(&self) -> bool {
        matches!(self, Self::Chain(_) | Self::Routing(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func(_) => f.write_str("Handler::Func"),
            Self::Chain(chain) => f.debug_tuple("Handler::Chain").field(chain).finish(),
            Self::Routing(routing) => f.debug_tuple("Handler::Routing").field(routing).finish(),
        }
    }
}

impl From<Chain> for Handler {
    fn from(chain: Chain) -> Self {
        Self::Chain(Arc::new(chain))
    }
}

impl From<Arc<Chain>> for Handler {
    fn from(chain: Arc<Chain>) -> Self {
        Self::Chain(chain)
    }
}

impl From<Routing> for Handler {
    fn from(routing: Routing) -> Self {
        Self::Routing(Arc::new(routing))
    }
}

impl From<Arc<Routing>> for Handler {
    fn from(routing: Arc<Routing>) -> Self {
        Self::Routing(routing)
    }
}

impl From<Vec<Handler>> for Handler {
    fn from(members: Vec<Handler>) -> Self {
        Chain::new(members).into()
    }
}

impl<const N: usize> From<[Handler; N]> for Handler {
    fn from(members: [Handler; N]) -> Self {
        Chain::new(members).into()
    }
}
