//! Path pattern matching.

use regex::Regex;

use crate::error::{PatternError, Result};
use crate::options::PatternOptions;
use crate::token::{tokenize, Capture, CaptureName, Token};

/// How much of a candidate a compiled pattern must consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The whole candidate must match.
    Full,
    /// The pattern matches a leading portion and reports the remainder.
    Prefix,
}

/// The result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    matched: String,
    values: Vec<Option<String>>,
    remainder: Option<String>,
}

impl Captures {
    pub(crate) const fn new(
        matched: String,
        values: Vec<Option<String>>,
        remainder: Option<String>,
    ) -> Self {
        Self {
            matched,
            values,
            remainder,
        }
    }

    /// The consumed portion of the candidate.
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// The value of slot `index`; `None` when the slot did not participate.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index)?.as_deref()
    }

    /// All slot values in source order, absent slots included.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// The values of the slots that participated in the match.
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(Option::as_deref)
    }

    /// The unconsumed tail for prefix patterns.
    pub fn remainder(&self) -> Option<&str> {
        self.remainder.as_deref()
    }

    /// Number of capture slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the pattern has no capture slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the match, returning the slot values.
    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Compiled regex for matching.
    regex: Regex,
    /// Capture slot names in source order.
    slots: Vec<CaptureName>,
    /// Regex group index of each slot.
    slot_groups: Vec<usize>,
    /// Regex group index of each alternative's remainder (prefix patterns).
    rest_groups: Vec<usize>,
    anchor: Anchor,
    decode: bool,
}

impl PathPattern {
    /// Compiles an anchored pattern with default options.
    ///
    /// Pattern syntax:
    /// - `/users` - literal path
    /// - `/users/:id` - one segment captured as `id`
    /// - `/users/:id(\d+)` - capture with a custom sub-pattern
    /// - `/(\d+)` - unnamed capture
    /// - `/:id?`, `/:path+`, `/:path*` - optional and repeated captures
    /// - `/files/*` - everything after `/files/`
    /// - `/a|/b` - either alternative
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_pattern::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/:id/comments/:comment_id").unwrap();
    /// let caps = pattern.captures("/posts/123/comments/456").unwrap();
    /// assert_eq!(caps.get(0), Some("123"));
    /// assert_eq!(caps.get(1), Some("456"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        Self::compile(pattern, Anchor::Full, &PatternOptions::default())
    }

    /// Compiles a prefix pattern with default options.
    pub fn prefix(pattern: &str) -> Result<Self> {
        Self::compile(pattern, Anchor::Prefix, &PatternOptions::default())
    }

    /// Compiles a pattern.
    pub fn compile(pattern: &str, anchor: Anchor, options: &PatternOptions) -> Result<Self> {
        let mut next_index = 0;
        let mut slots = Vec::new();
        let mut branches = Vec::new();

        for (alt, source) in split_alternatives(pattern).into_iter().enumerate() {
            let tokens = tokenize(source, &mut next_index)?;
            let ends_with_slash =
                matches!(tokens.last(), Some(Token::Literal(text)) if text.ends_with('/'));

            let mut branch = String::new();
            for token in &tokens {
                match token {
                    Token::Literal(text) => branch.push_str(&regex::escape(text)),
                    Token::Capture(capture) => {
                        branch.push_str(&capture_expr(capture, slots.len()));
                        slots.push(capture.name.clone());
                    }
                }
            }

            let rest = if options.strict {
                if ends_with_slash {
                    ".*"
                } else {
                    "(?:/.*)?"
                }
            } else {
                if ends_with_slash {
                    branch.pop();
                }
                if anchor == Anchor::Full {
                    branch.push_str("/?");
                }
                "(?:/.*)?"
            };
            if anchor == Anchor::Prefix {
                branch.push_str(&format!("(?P<{REST_GROUP}{alt}>{rest})"));
            }
            branches.push(branch);
        }

        let flags = if options.sensitive { "" } else { "(?i)" };
        let source = format!("{flags}^(?:{})$", branches.join("|"));
        let regex = Regex::new(&source).map_err(|e| PatternError::regex(pattern, e))?;

        // Named groups inside custom sub-patterns may reuse the internal
        // prefixes. Duplicates of a generated name fail to compile above, so
        // any in-range index here is one of ours.
        let mut slot_groups = vec![0; slots.len()];
        let mut rest_groups = Vec::new();
        for (group, name) in regex.capture_names().enumerate() {
            let Some(name) = name else { continue };
            if let Some(index) = internal_index(name, CAPTURE_GROUP) {
                if let Some(entry) = slot_groups.get_mut(index) {
                    *entry = group;
                }
            } else if let Some(index) = internal_index(name, REST_GROUP) {
                if anchor == Anchor::Prefix && index < branches.len() {
                    rest_groups.push(group);
                }
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            slots,
            slot_groups,
            rest_groups,
            anchor,
            decode: options.decode,
        })
    }

    /// Attempts to match a candidate against this pattern.
    ///
    /// Segment boundaries are decided on the raw candidate; `%2F` is only
    /// decoded in the returned capture text.
    pub fn captures(&self, candidate: &str) -> Option<Captures> {
        let caps = self.regex.captures(candidate)?;

        let values = self
            .slot_groups
            .iter()
            .map(|&group| caps.get(group).map(|m| self.decode(m.as_str())))
            .collect();

        let rest = self.rest_groups.iter().find_map(|&group| caps.get(group));
        let (matched, remainder) = match rest {
            Some(rest) => (
                candidate[..rest.start()].to_string(),
                Some(rest.as_str().to_string()),
            ),
            None => (candidate.to_string(), None),
        };

        Some(Captures::new(matched, values, remainder))
    }

    /// Whether the candidate matches.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the capture slot names in source order.
    pub fn slots(&self) -> &[CaptureName] {
        &self.slots
    }

    /// Number of capture slots.
    pub fn capture_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns how the pattern is anchored.
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Whether the pattern may leave an unconsumed remainder.
    pub fn is_prefix(&self) -> bool {
        self.anchor == Anchor::Prefix
    }

    /// The generated regular expression.
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    fn decode(&self, text: &str) -> String {
        if self.decode {
            decode_separators(text)
        } else {
            text.to_string()
        }
    }
}

/// Group name prefix of a capture slot.
const CAPTURE_GROUP: &str = "__oxide_c";
/// Group name prefix of the prefix-match remainder of one alternative.
const REST_GROUP: &str = "__oxide_r";

/// Reads the index of a generated group name, rejecting spellings such as
/// `03` or `+3` that parse to an index but were never generated.
fn internal_index(name: &str, prefix: &str) -> Option<usize> {
    let digits = name.strip_prefix(prefix)?;
    let index: usize = digits.parse().ok()?;
    (index.to_string() == digits).then_some(index)
}

/// Builds the expression for one capture, registering it as group
/// `__oxide_c{slot}`.
fn capture_expr(capture: &Capture, slot: usize) -> String {
    let prefix = capture
        .prefix
        .map(|p| regex::escape(&p.to_string()))
        .unwrap_or_default();
    let body = capture.pattern.as_deref().map_or_else(
        || format!("[^{}]+?", regex::escape(&capture.delimiter.to_string())),
        escape_class_ranges,
    );

    let mut unit = format!("(?:{body})");
    if capture.modifier.is_repeat() {
        unit = format!("{unit}(?:{prefix}{unit})*");
    }
    let group = format!("(?P<{CAPTURE_GROUP}{slot}>{unit})");

    match (capture.modifier.is_optional(), capture.partial) {
        (true, false) => format!("(?:{prefix}{group})?"),
        (true, true) => format!("{prefix}{group}?"),
        (false, _) => format!("{prefix}{group}"),
    }
}

/// Splits a pattern on top-level `|`.
///
/// A `|` inside a group or after a backslash does not split, and a pattern
/// with an empty alternative is returned whole so the `|` stays literal.
fn split_alternatives(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = pattern.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if depth > 0 => in_class = true,
            ']' if depth > 0 => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&pattern[start..]);

    if parts.len() > 1 && parts.iter().all(|p| !p.is_empty()) {
        parts
    } else {
        vec![pattern]
    }
}

/// Escapes a `-` that directly follows a Perl class inside a bracket
/// expression, e.g. `[\w-.]`, which the regex engine would read as a range.
fn escape_class_ranges(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut in_class = false;
    let mut after_perl_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                    after_perl_class =
                        in_class && matches!(escaped, 'w' | 'W' | 'd' | 'D' | 's' | 'S');
                }
                continue;
            }
            '-' if after_perl_class => {
                out.push_str("\\-");
                after_perl_class = false;
                continue;
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ => {}
        }
        after_perl_class = false;
        out.push(c);
    }
    out
}

/// Decodes encoded separators in captured text.
fn decode_separators(text: &str) -> String {
    if text.contains('%') {
        text.replace("%2F", "/").replace("%2f", "/")
    } else {
        text.to_string()
    }
}
