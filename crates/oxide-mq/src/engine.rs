//! Invocation of handlers and units of execution.
//!
//! Every top-level [`invoke`] and every nested chain or route table runs in
//! its own unit of execution. Members of one chain share a unit; a nested
//! chain or table is spawned as a separate task and the calling unit waits
//! for it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::error::{DispatchError, Result};
use crate::handler::{Handler, Next};
use crate::message::Message;

tokio::task_local! {
    static UNIT: UnitId;
}

static NEXT_UNIT: AtomicU64 = AtomicU64::new(1);

/// Identifies a unit of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    fn next() -> Self {
        Self(NEXT_UNIT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Returns the unit of execution the caller is running in, if any.
pub fn current_unit() -> Option<UnitId> {
    UNIT.try_with(|unit| *unit).ok()
}

/// Invokes a handler against a message until it completes.
///
/// Parameters from any previous invocation are cleared first. Continuations
/// returned by function handlers are applied in a loop. When called outside
/// any unit of execution, the invocation gets a fresh one.
///
/// # Errors
///
/// Returns the first error raised by a handler, or
/// [`DispatchError::NoRouteMatched`] when a route table has no match.
pub async fn invoke(handler: &Handler, msg: &mut Message) -> Result<()> {
    msg.params.clear();
    if current_unit().is_some() {
        run(handler, msg).await
    } else {
        let unit = UnitId::next();
        trace!(%unit, "starting invocation");
        UNIT.scope(unit, run(handler, msg)).await
    }
}

/// Runs a handler and every continuation it returns.
pub(crate) fn run<'a>(handler: &'a Handler, msg: &'a mut Message) -> BoxFuture<'a, Result<()>> {
    async move {
        let mut next = handler.step(msg).await?;
        while let Next::Continue(handler) = next {
            trace!(?handler, "applying continuation");
            next = handler.step(msg).await?;
        }
        Ok(())
    }
    .boxed()
}

/// Runs a chain or route table in a new unit of execution.
///
/// The message moves into the spawned task and back once it finishes.
pub(crate) async fn run_nested(handler: &Handler, msg: &mut Message) -> Result<()> {
    let unit = UnitId::next();
    debug!(%unit, parent = ?current_unit(), "starting nested unit");

    let handler = handler.clone();
    let mut owned = std::mem::take(msg);
    let task = tokio::spawn(UNIT.scope(unit, async move {
        let result = run(&handler, &mut owned).await;
        (owned, result)
    }));

    match task.await {
        Ok((owned, result)) => {
            *msg = owned;
            result
        }
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(DispatchError::Aborted(err.to_string())),
    }
}
