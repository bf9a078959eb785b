//! # oxide-pattern
//!
//! Compiles route patterns into exact matchers.
//!
//! This crate provides:
//! - Path patterns with named and unnamed captures
//! - Optional and repeated captures, custom sub-patterns, wildcards
//! - Prefix matching for nested routers
//! - Host patterns with per-label wildcards
//! - Raw regular expressions whose groups rewrite the matched value
//!
//! ## Path Patterns
//!
//! ```
//! use oxide_pattern::PathPattern;
//!
//! let pattern = PathPattern::new("/:test+").unwrap();
//! let caps = pattern.captures("/some/basic/route").unwrap();
//! assert_eq!(caps.get(0), Some("some/basic/route"));
//! assert!(pattern.captures("/").is_none());
//! ```
//!
//! Matching never normalizes the candidate: `/test` does not match `/test/`
//! unless the pattern is compiled with [`PatternOptions::lenient`].
//!
//! ## Prefix Patterns
//!
//! ```
//! use oxide_pattern::PathPattern;
//!
//! let pattern = PathPattern::prefix("/api").unwrap();
//! let caps = pattern.captures("/api/users").unwrap();
//! assert_eq!(caps.remainder(), Some("/users"));
//! ```

mod error;
mod host;
mod options;
mod path;
mod raw;
mod token;

pub use error::{PatternError, Result};
pub use host::HostPattern;
pub use options::PatternOptions;
pub use path::{Anchor, Captures, PathPattern};
pub use raw::RegexPattern;
pub use token::{CaptureName, Modifier};
