//! # oxide-mq
//!
//! Routes messages through functions, chains and route tables.
//!
//! This crate provides:
//! - Handlers built from sync or async closures, with continuations
//! - Ordered chains with level-local early termination
//! - Route tables over path patterns, host patterns and raw expressions
//! - Nested tables that see only the unconsumed remainder of the value
//! - A sync adapter for callback-style operations
//!
//! ## Quick Start
//!
//! ```
//! use oxide_mq::{invoke, Handler, Message, Routing};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app: Handler = Routing::new()
//!     .get("/posts/:id", Handler::func(|msg: &mut Message| {
//!         if let Some(res) = msg.response_mut() {
//!             res.write("post").end();
//!         }
//!     }))
//!     .unwrap()
//!     .into();
//!
//! let mut msg = Message::get("/posts/12");
//! invoke(&app, &mut msg).await.unwrap();
//! assert_eq!(msg.params, vec!["12"]);
//! assert!(msg.response().unwrap().is_finished());
//! # }
//! ```
//!
//! ## Continuations
//!
//! A function handler may return another [`Handler`]; it is invoked against
//! the same message once the first one returns.
//!
//! ```
//! use oxide_mq::{invoke, Handler, Message};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let finish = Handler::func(|msg: &mut Message| msg.value.push_str("/finished"));
//! let start = Handler::func(move |msg: &mut Message| {
//!     msg.value.push_str("/started");
//!     finish.clone()
//! });
//!
//! let mut msg = Message::new("job");
//! invoke(&start, &mut msg).await.unwrap();
//! assert_eq!(msg.value, "job/started/finished");
//! # }
//! ```

mod chain;
mod engine;
mod error;
mod handler;
mod message;
mod response;
mod routing;
mod sync;

pub use chain::Chain;
pub use engine::{current_unit, invoke, UnitId};
pub use error::{DispatchError, Result, SyncProtocolError};
pub use handler::{Handle, Handler, IntoNext, Next};
pub use message::{Message, Method};
pub use response::Response;
pub use routing::{MethodFilter, Route, Routing};
pub use sync::{sync, Done};

pub use oxide_pattern::{PatternError, PatternOptions};
