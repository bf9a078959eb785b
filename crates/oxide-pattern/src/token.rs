//! Path pattern tokenizer.

use crate::error::{PatternError, Result};

/// Repetition modifier attached to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Exactly once.
    None,
    /// `?`: zero or one time.
    Optional,
    /// `+`: one or more times.
    OneOrMore,
    /// `*`: zero or more times.
    ZeroOrMore,
}

impl Modifier {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Self::Optional),
            '+' => Some(Self::OneOrMore),
            '*' => Some(Self::ZeroOrMore),
            _ => None,
        }
    }

    /// Whether the capture may be skipped entirely.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    /// Whether the capture may span several delimited segments.
    #[must_use]
    pub const fn is_repeat(self) -> bool {
        matches!(self, Self::OneOrMore | Self::ZeroOrMore)
    }
}

/// Name of a capture slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaptureName {
    /// A `:name` capture.
    Named(String),
    /// An unnamed group or wildcard, numbered in source order.
    Index(usize),
}

impl std::fmt::Display for CaptureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, ":{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A capture token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Slot name.
    pub name: CaptureName,
    /// The `/` or `.` directly preceding the capture, if any.
    pub prefix: Option<char>,
    /// Separator excluded by the default segment rule and used to join repeats.
    pub delimiter: char,
    /// Custom sub-pattern; `None` means the default segment rule.
    pub pattern: Option<String>,
    /// Repetition modifier.
    pub modifier: Modifier,
    /// The prefix is followed by something other than itself, so it stays
    /// mandatory even when the capture is optional.
    pub partial: bool,
    /// A bare `*` capturing the rest of the candidate.
    pub wildcard: bool,
}

/// A token of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text matched verbatim.
    Literal(String),
    /// A capture.
    Capture(Capture),
}

/// Splits a path pattern into tokens.
///
/// `next_index` numbers unnamed captures and is shared between the
/// alternatives of one pattern.
pub(crate) fn tokenize(input: &str, next_index: &mut usize) -> Result<Vec<Token>> {
    Tokenizer {
        input,
        pos: 0,
        literal: String::new(),
        tokens: Vec::new(),
        next_index,
    }
    .run()
}

struct Tokenizer<'a, 'i> {
    input: &'a str,
    pos: usize,
    literal: String,
    tokens: Vec<Token>,
    next_index: &'i mut usize,
}

impl Tokenizer<'_, '_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|s| s.chars().next())
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Whether a capture starts at byte offset `pos`.
    fn starts_capture(&self, pos: usize) -> bool {
        match self.peek_at(pos) {
            Some('(' | '*') => true,
            Some(':') => self.peek_at(pos + 1).is_some_and(is_name_char),
            _ => false,
        }
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens
                .push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.advance();
                    let escaped = self
                        .advance()
                        .ok_or_else(|| PatternError::DanglingEscape(self.input.to_string()))?;
                    self.literal.push(escaped);
                }
                '/' | '.' if self.starts_capture(self.pos + 1) => {
                    self.advance();
                    self.scan_capture(Some(c))?;
                }
                ':' | '(' | '*' if self.starts_capture(self.pos) => self.scan_capture(None)?,
                ')' => {
                    return Err(PatternError::UnbalancedGroup {
                        pattern: self.input.to_string(),
                        position: self.pos,
                    })
                }
                _ => {
                    self.advance();
                    self.literal.push(c);
                }
            }
        }
        self.flush_literal();
        Ok(self.tokens)
    }

    fn scan_capture(&mut self, prefix: Option<char>) -> Result<()> {
        self.flush_literal();

        let (name, pattern, wildcard) = match self.peek() {
            Some(':') => {
                self.advance();
                let name = self.scan_name();
                let pattern = if self.peek() == Some('(') {
                    Some(self.scan_group()?)
                } else {
                    None
                };
                (CaptureName::Named(name), pattern, false)
            }
            Some('(') => {
                let pattern = self.scan_group()?;
                (self.take_index(), Some(pattern), false)
            }
            _ => {
                self.advance();
                (self.take_index(), Some(".*".to_string()), true)
            }
        };

        let modifier = match self.peek().and_then(Modifier::from_char) {
            Some(modifier) if !wildcard => {
                self.advance();
                modifier
            }
            _ => Modifier::None,
        };

        if let Some(c) = self.peek() {
            if (wildcard || modifier != Modifier::None) && Modifier::from_char(c).is_some() {
                return Err(PatternError::UnknownModifier {
                    pattern: self.input.to_string(),
                    modifier: c,
                    position: self.pos,
                });
            }
        }

        let partial = prefix.is_some_and(|p| self.peek().is_some_and(|next| next != p));

        self.tokens.push(Token::Capture(Capture {
            name,
            prefix,
            delimiter: prefix.unwrap_or('/'),
            pattern,
            modifier,
            partial,
            wildcard,
        }));
        Ok(())
    }

    fn take_index(&mut self) -> CaptureName {
        let index = *self.next_index;
        *self.next_index += 1;
        CaptureName::Index(index)
    }

    fn scan_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    /// Scans a parenthesized sub-pattern and returns its content.
    ///
    /// Escapes are kept verbatim; parentheses inside a character class or
    /// after a backslash do not count toward nesting.
    fn scan_group(&mut self) -> Result<String> {
        let open = self.pos;
        self.advance();
        let mut content = String::new();
        let mut depth = 1usize;
        let mut in_class = false;

        loop {
            let Some(c) = self.advance() else {
                return Err(PatternError::UnbalancedGroup {
                    pattern: self.input.to_string(),
                    position: open,
                });
            };
            match c {
                '\\' => {
                    content.push(c);
                    if let Some(escaped) = self.advance() {
                        content.push(escaped);
                    }
                }
                '[' if !in_class => {
                    in_class = true;
                    content.push(c);
                }
                ']' if in_class => {
                    in_class = false;
                    content.push(c);
                }
                '(' if !in_class => {
                    depth += 1;
                    content.push(c);
                }
                ')' if !in_class => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    content.push(c);
                }
                _ => content.push(c),
            }
        }

        if content.is_empty() {
            return Err(PatternError::EmptyGroup {
                pattern: self.input.to_string(),
                position: open,
            });
        }
        Ok(content)
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
