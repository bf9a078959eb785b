//! Route tables.

use futures::future::{BoxFuture, FutureExt};
use oxide_pattern::{Anchor, Captures, HostPattern, PathPattern, PatternOptions, RegexPattern};
use tracing::{debug, trace};

use crate::engine;
use crate::error::{DispatchError, Result};
use crate::handler::Handler;
use crate::message::{Message, Method};

/// Which request methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Any method, and messages without one.
    Any,
    /// Only this method.
    Only(Method),
}

impl MethodFilter {
    /// Whether a message with this method passes the filter.
    ///
    /// Messages without a method only pass [`MethodFilter::Any`].
    pub fn allows(&self, method: Option<&Method>) -> bool {
        match (self, method) {
            (Self::Any, _) => true,
            (Self::Only(expected), Some(actual)) => {
                expected.as_str().eq_ignore_ascii_case(actual.as_str())
            }
            (Self::Only(_), None) => false,
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        Self::Only(method)
    }
}

impl std::fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(method) => write!(f, "{method}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Path(PathPattern),
    Host(HostPattern),
    Regex(RegexPattern),
}

impl Matcher {
    fn pattern(&self) -> &str {
        match self {
            Self::Path(p) => p.pattern(),
            Self::Host(p) => p.pattern(),
            Self::Regex(p) => p.pattern(),
        }
    }

    fn captures(&self, msg: &Message) -> Option<Captures> {
        match self {
            Self::Path(p) => p.captures(&msg.value),
            Self::Host(p) => p.captures(msg.get_header("host")?),
            Self::Regex(p) => p.captures(&msg.value),
        }
    }
}

/// A single entry of a [`Routing`] table.
#[derive(Debug, Clone)]
pub struct Route {
    method: MethodFilter,
    matcher: Matcher,
    handler: Handler,
}

impl Route {
    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    /// The method filter.
    pub const fn method(&self) -> &MethodFilter {
        &self.method
    }

    /// The handler invoked on a match.
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Whether the route matches the `Host` header instead of the value.
    pub const fn is_host(&self) -> bool {
        matches!(self.matcher, Matcher::Host(_))
    }

    /// Whether the route may leave an unconsumed remainder.
    pub fn is_prefix(&self) -> bool {
        match &self.matcher {
            Matcher::Path(p) => p.is_prefix(),
            Matcher::Host(_) => false,
            Matcher::Regex(_) => true,
        }
    }
}

/// An ordered route table.
///
/// Routes are evaluated in insertion order and the first match wins. Its
/// captures are appended to the message parameters and its handler is
/// invoked. A route whose handler is itself a table matches a prefix of the
/// value, and the nested table sees only the remainder.
///
/// # Example
///
/// ```
/// use oxide_mq::{invoke, Handler, Message, Routing};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let api = Routing::new()
///     .get("/users/:id", Handler::func(|msg: &mut Message| msg.value.clear()))
///     .unwrap();
///
/// let app: Handler = Routing::new().append("/api", api).unwrap().into();
///
/// let mut msg = Message::get("/api/users/7");
/// invoke(&app, &mut msg).await.unwrap();
/// assert_eq!(msg.params, vec!["7"]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Routing {
    routes: Vec<Route>,
    options: PatternOptions,
}

impl Routing {
    /// Creates an empty table with default pattern options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options used to compile routes added afterwards.
    #[must_use]
    pub fn with_options(mut self, options: PatternOptions) -> Self {
        self.options = options;
        self
    }

    /// Creates a table accepting any method from ordered pattern/handler
    /// pairs.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if a pattern fails to compile.
    pub fn from_map<P, H>(pairs: impl IntoIterator<Item = (P, H)>) -> Result<Self>
    where
        P: AsRef<str>,
        H: Into<Handler>,
    {
        Self::new().map(MethodFilter::Any, pairs)
    }

    /// Adds a route accepting any method.
    ///
    /// A pattern starting with `^` is a raw regular expression. Otherwise it
    /// is a path pattern, matched as a prefix when the handler is a table.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn append(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(MethodFilter::Any, pattern, handler)
    }

    /// Adds a route with an explicit method filter.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn route(
        mut self,
        method: impl Into<MethodFilter>,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<Self> {
        let handler = handler.into();
        let matcher = if pattern.starts_with('^') {
            Matcher::Regex(RegexPattern::new(pattern)?)
        } else {
            let anchor = if matches!(handler, Handler::Routing(_)) {
                Anchor::Prefix
            } else {
                Anchor::Full
            };
            Matcher::Path(PathPattern::compile(pattern, anchor, &self.options)?)
        };

        self.routes.push(Route {
            method: method.into(),
            matcher,
            handler,
        });
        Ok(self)
    }

    /// Adds ordered pattern/handler pairs with one method filter.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if a pattern fails to compile.
    pub fn map<P, H>(
        self,
        method: impl Into<MethodFilter>,
        pairs: impl IntoIterator<Item = (P, H)>,
    ) -> Result<Self>
    where
        P: AsRef<str>,
        H: Into<Handler>,
    {
        let method = method.into();
        pairs.into_iter().try_fold(self, |routing, (pattern, handler)| {
            routing.route(method.clone(), pattern.as_ref(), handler)
        })
    }

    /// Adds a GET route.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn get(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(Method::Get, pattern, handler)
    }

    /// Adds a POST route.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn post(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(Method::Post, pattern, handler)
    }

    /// Adds a PUT route.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn put(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(Method::Put, pattern, handler)
    }

    /// Adds a PATCH route.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn patch(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(Method::Patch, pattern, handler)
    }

    /// Adds a DELETE route.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn delete(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(Method::Delete, pattern, handler)
    }

    /// Adds a route for every method. Same as [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the pattern fails to compile.
    pub fn all(self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.route(MethodFilter::Any, pattern, handler)
    }

    /// Adds a route matched against the `Host` header.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Pattern`] if the host pattern is invalid.
    pub fn host(mut self, pattern: &str, handler: impl Into<Handler>) -> Result<Self> {
        self.routes.push(Route {
            method: MethodFilter::Any,
            matcher: Matcher::Host(HostPattern::new(pattern)?),
            handler: handler.into(),
        });
        Ok(self)
    }

    /// Appends every route of another table, after the existing ones.
    #[must_use]
    pub fn append_table(mut self, other: &Self) -> Self {
        self.routes.extend(other.routes.iter().cloned());
        self
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the routes in evaluation order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the first route matching the message.
    pub fn find(&self, msg: &Message) -> Option<(usize, &Route, Captures)> {
        self.routes.iter().enumerate().find_map(|(index, route)| {
            if !route.method.allows(msg.method.as_ref()) {
                trace!(index, pattern = route.pattern(), "method filtered");
                return None;
            }
            let captures = route.matcher.captures(msg)?;
            Some((index, route, captures))
        })
    }

    pub(crate) fn dispatch<'a>(&'a self, msg: &'a mut Message) -> BoxFuture<'a, Result<()>> {
        async move {
            let Some((index, route, captures)) = self.find(msg) else {
                debug!(value = %msg.value, "no route matched");
                return Err(DispatchError::NoRouteMatched {
                    method: msg
                        .method
                        .as_ref()
                        .map_or_else(|| "-".to_string(), ToString::to_string),
                    value: msg.value.clone(),
                });
            };

            debug!(index, pattern = route.pattern(), value = %msg.value, "route matched");
            msg.params.extend(captures.present().map(str::to_string));
            if let Some(remainder) = captures.remainder() {
                msg.value = remainder.to_string();
            }

            if route.handler.is_nested_level() {
                engine::run_nested(&route.handler, msg).await
            } else {
                engine::run(&route.handler, msg).await
            }
        }
        .boxed()
    }
}
