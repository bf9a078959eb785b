//! Host pattern matching.

use regex::Regex;

use crate::error::{PatternError, Result};
use crate::path::Captures;

/// A compiled host pattern such as `*.example.com`.
///
/// Each `*` matches a non-empty run of characters inside one label and is
/// captured. The candidate may carry a `:port` suffix, which is ignored.
#[derive(Debug, Clone)]
pub struct HostPattern {
    pattern: String,
    regex: Regex,
    capture_count: usize,
}

impl HostPattern {
    /// Compiles a host pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_pattern::HostPattern;
    ///
    /// let pattern = HostPattern::new("w*.test.com").unwrap();
    /// let caps = pattern.captures("web.test.com:8080").unwrap();
    /// assert_eq!(caps.get(0), Some("eb"));
    /// assert!(pattern.captures("test.com").is_none());
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |reason| PatternError::InvalidHost {
            pattern: pattern.to_string(),
            reason,
        };
        if pattern.contains(':') {
            return Err(invalid("a port cannot be part of the pattern"));
        }

        let mut capture_count = 0;
        let mut labels = Vec::new();
        for label in pattern.split('.') {
            if label.is_empty() {
                return Err(invalid("empty label"));
            }
            let pieces: Vec<String> = label.split('*').map(regex::escape).collect();
            capture_count += pieces.len() - 1;
            labels.push(pieces.join("([^.]+)"));
        }

        let source = format!("(?i)^{}(?::[0-9]+)?$", labels.join("\\."));
        let regex = Regex::new(&source).map_err(|e| PatternError::regex(pattern, e))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            capture_count,
        })
    }

    /// Matches a `host[:port]` value.
    pub fn captures(&self, host: &str) -> Option<Captures> {
        let caps = self.regex.captures(host)?;
        let values = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        Some(Captures::new(host.to_string(), values, None))
    }

    /// Whether the host matches.
    pub fn is_match(&self, host: &str) -> bool {
        self.regex.is_match(host)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of `*` captures.
    pub const fn capture_count(&self) -> usize {
        self.capture_count
    }
}
