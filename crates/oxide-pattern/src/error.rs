//! Error types for pattern compilation.

use thiserror::Error;

/// Errors raised while compiling a path or host pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A `(` without its closing `)`, or a stray `)`.
    #[error("unbalanced group in pattern '{pattern}' at position {position}")]
    UnbalancedGroup {
        /// The pattern being compiled.
        pattern: String,
        /// Byte offset of the offending parenthesis.
        position: usize,
    },

    /// A modifier that cannot follow the preceding token.
    #[error("unknown modifier '{modifier}' in pattern '{pattern}' at position {position}")]
    UnknownModifier {
        /// The pattern being compiled.
        pattern: String,
        /// The rejected modifier character.
        modifier: char,
        /// Byte offset of the modifier.
        position: usize,
    },

    /// A group with no content, e.g. `/()`.
    #[error("empty group in pattern '{pattern}' at position {position}")]
    EmptyGroup {
        /// The pattern being compiled.
        pattern: String,
        /// Byte offset of the opening parenthesis.
        position: usize,
    },

    /// A trailing backslash with nothing to escape.
    #[error("dangling escape at the end of pattern '{0}'")]
    DanglingEscape(String),

    /// A host pattern that cannot describe a host name.
    #[error("invalid host pattern '{pattern}': {reason}")]
    InvalidHost {
        /// The pattern being compiled.
        pattern: String,
        /// Why the pattern was rejected.
        reason: &'static str,
    },

    /// The generated expression was rejected by the regex engine.
    #[error("invalid expression in pattern '{pattern}': {source}")]
    Regex {
        /// The pattern being compiled.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl PatternError {
    pub(crate) fn regex(pattern: &str, source: regex::Error) -> Self {
        Self::Regex {
            pattern: pattern.to_string(),
            source,
        }
    }
}

/// Result type alias for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
