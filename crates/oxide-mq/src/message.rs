//! Message type routed through handlers.

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use crate::response::Response;

/// Request methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// Any other method, stored upper-case.
    Extension(String),
}

impl Method {
    /// Parses a method name, case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            other => Self::Extension(other.to_string()),
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Extension(name) => name,
        }
    }
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message dispatched through handlers.
///
/// Plain in-process messages carry only a routable value; request messages
/// also carry a method, headers and a [`Response`].
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Routable value. Prefix routes narrow it to the unconsumed remainder.
    pub value: String,
    /// Parameters captured by matched routes, in match order.
    pub params: Vec<String>,
    /// Request method; `None` for plain messages.
    pub method: Option<Method>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    response: Option<Response>,
    ended: bool,
}

impl Message {
    /// Creates a plain message.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Creates a request message with an attached response.
    pub fn request(method: Method, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            method: Some(method),
            response: Some(Response::ok()),
            ..Self::default()
        }
    }

    /// Creates a GET request message.
    pub fn get(value: impl Into<String>) -> Self {
        Self::request(Method::Get, value)
    }

    /// Creates a POST request message.
    pub fn post(value: impl Into<String>) -> Self {
        Self::request(Method::Post, value)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attaches a response.
    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a captured parameter by position.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The attached response, if any.
    pub const fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// The attached response, if any.
    pub fn response_mut(&mut self) -> Option<&mut Response> {
        self.response.as_mut()
    }

    /// Stops the chain level that is currently running.
    ///
    /// Remaining members of that chain are skipped and the chain returns
    /// normally to its caller.
    pub fn end(&mut self) {
        self.ended = true;
    }

    /// Whether a termination request is pending.
    pub fn is_ended(&self) -> bool {
        self.ended || self.response.as_ref().is_some_and(|r| r.end_signal_pending())
    }

    /// Consumes a pending termination request from the message or its
    /// response.
    pub(crate) fn take_end(&mut self) -> bool {
        let ended = std::mem::take(&mut self.ended);
        let responded = self
            .response
            .as_mut()
            .is_some_and(Response::take_end_signal);
        ended || responded
    }
}
