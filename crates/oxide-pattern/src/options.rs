//! Compilation options.

use serde::{Deserialize, Serialize};

/// Options controlling how a path pattern is compiled.
///
/// Options deserialize with every field optional, so a host application can
/// embed them in its own configuration:
///
/// ```
/// use oxide_pattern::PatternOptions;
///
/// let options: PatternOptions = serde_json::from_str(r#"{"strict": false}"#).unwrap();
/// assert!(!options.strict);
/// assert!(options.sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// When `false`, a single trailing `/` on the candidate is tolerated.
    pub strict: bool,
    /// When `false`, literal text matches case-insensitively.
    pub sensitive: bool,
    /// Decode `%2F` to `/` in captured text.
    pub decode: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            strict: true,
            sensitive: true,
            decode: true,
        }
    }
}

impl PatternOptions {
    /// Options accepting a trailing slash, as most web routers do.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }
}
