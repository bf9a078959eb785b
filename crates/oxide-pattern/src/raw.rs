//! Raw regular-expression patterns.

use regex::Regex;

use crate::error::{PatternError, Result};
use crate::path::Captures;

/// A pattern written directly as a regular expression, e.g. `^/api/(.*)$`.
///
/// Groups are classified by nesting when matching:
/// - no groups: no captures, the remainder is `None`
/// - one top-level group: the remainder is that group's text and the
///   captures are its direct children, or the group itself if it has none
/// - several top-level groups: the remainder is empty and the captures are
///   the top-level groups
#[derive(Debug, Clone)]
pub struct RegexPattern {
    pattern: String,
    regex: Regex,
    /// Regex group indices reported as captures.
    capture_groups: Vec<usize>,
    /// Regex group whose text becomes the remainder.
    remainder: Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remainder {
    Unchanged,
    Group(usize),
    Empty,
}

impl RegexPattern {
    /// Compiles a raw regular expression.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_pattern::RegexPattern;
    ///
    /// let pattern = RegexPattern::new("^/api/(v(\\d+))(/.*)?$").unwrap();
    /// let caps = pattern.captures("/api/v2/users").unwrap();
    /// assert_eq!(caps.remainder(), Some(""));
    /// assert_eq!(caps.get(0), Some("v2"));
    /// assert_eq!(caps.get(1), Some("/users"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| PatternError::regex(pattern, e))?;
        let parents = group_parents(pattern);

        let top: Vec<usize> = (1..=parents.len())
            .filter(|&group| parents[group - 1].is_none())
            .collect();

        let (capture_groups, remainder) = match top.as_slice() {
            [] => (Vec::new(), Remainder::Unchanged),
            [outer] => {
                let children: Vec<usize> = (1..=parents.len())
                    .filter(|&group| parents[group - 1] == Some(*outer))
                    .collect();
                if children.is_empty() {
                    (vec![*outer], Remainder::Group(*outer))
                } else {
                    (children, Remainder::Group(*outer))
                }
            }
            _ => (top, Remainder::Empty),
        };

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            capture_groups,
            remainder,
        })
    }

    /// Attempts to match a candidate.
    ///
    /// Groups that did not participate are reported as absent.
    pub fn captures(&self, candidate: &str) -> Option<Captures> {
        let caps = self.regex.captures(candidate)?;
        let matched = caps.get(0).map_or("", |m| m.as_str()).to_string();

        let values = self
            .capture_groups
            .iter()
            .map(|&group| caps.get(group).map(|m| m.as_str().to_string()))
            .collect();

        let remainder = match self.remainder {
            Remainder::Unchanged => None,
            Remainder::Group(group) => {
                Some(caps.get(group).map_or("", |m| m.as_str()).to_string())
            }
            Remainder::Empty => Some(String::new()),
        };

        Some(Captures::new(matched, values, remainder))
    }

    /// Whether the candidate matches.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The source expression.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of captures reported per match.
    pub fn capture_count(&self) -> usize {
        self.capture_groups.len()
    }
}

/// Returns, for each capturing group in source order, the index of the
/// nearest enclosing capturing group (1-based), or `None` at top level.
fn group_parents(pattern: &str) -> Vec<Option<usize>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut parents = Vec::new();
    // One entry per open paren: the capturing group index, if any.
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut class_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => {
                class_depth += 1;
                // A leading `]` (after an optional `^`) is a literal.
                if chars.get(i + 1) == Some(&'^') {
                    i += 1;
                }
                if chars.get(i + 1) == Some(&']') {
                    i += 1;
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 => {
                let capturing = chars.get(i + 1) != Some(&'?')
                    || matches!(
                        (chars.get(i + 2), chars.get(i + 3)),
                        (Some('P'), Some('<')) | (Some('<'), _)
                    );
                if capturing {
                    let parent = open.iter().rev().find_map(|group| *group);
                    parents.push(parent);
                    open.push(Some(parents.len()));
                } else {
                    open.push(None);
                }
            }
            ')' if class_depth == 0 => {
                open.pop();
            }
            _ => {}
        }
        i += 1;
    }

    parents
}
