//! Ordered handler chains.

use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

use crate::engine;
use crate::error::Result;
use crate::handler::Handler;
use crate::message::Message;

/// Handlers run in declaration order against one message.
///
/// Calling [`Message::end`] (or ending the attached response) skips the
/// remaining members of the chain that is currently running. Members that
/// are themselves chains or route tables run in a separate unit of
/// execution, and their termination does not leak into this chain.
///
/// # Example
///
/// ```
/// use oxide_mq::{invoke, Chain, Handler, Message};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let chain: Handler = Chain::new([
///     Handler::func(|msg: &mut Message| msg.params.push("auth".into())),
///     Handler::func(|msg: &mut Message| msg.end()),
///     Handler::func(|msg: &mut Message| msg.params.push("never".into())),
/// ])
/// .into();
///
/// let mut msg = Message::new("/");
/// invoke(&chain, &mut msg).await.unwrap();
/// assert_eq!(msg.params, vec!["auth"]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Chain {
    members: Vec<Handler>,
}

impl Chain {
    /// Creates a chain from its members.
    pub fn new(members: impl IntoIterator<Item = Handler>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Appends a member.
    #[must_use]
    pub fn then(mut self, handler: impl Into<Handler>) -> Self {
        self.members.push(handler.into());
        self
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the chain has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the members in order.
    pub fn members(&self) -> &[Handler] {
        &self.members
    }

    pub(crate) fn run<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<()>> {
        async move {
            let inherited = msg.take_end();

            for (index, member) in self.members.iter().enumerate() {
                if member.is_nested_level() {
                    engine::run_nested(member, msg).await?;
                } else {
                    engine::run(member, msg).await?;
                }

                if msg.take_end() {
                    trace!(index, remaining = self.members.len() - index - 1, "chain ended");
                    break;
                }
            }

            if inherited {
                msg.end();
            }
            Ok(())
        }
        .boxed()
    }
}

impl FromIterator<Handler> for Chain {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        Self::new(iter)
    }
}
