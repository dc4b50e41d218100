//! Error types for scanning, pattern compilation and matching.
//!
//! Lexical failures are reported as [`ParseError`], which pins the failing
//! byte offset, the line, and a short window of surrounding text. Failures
//! raised by processors are wrapped in the same diagnostic so the position of
//! the event that triggered them is kept alongside the original cause.

use alloc::{boxed::Box, string::String};
use core::fmt;

use thiserror::Error;

/// Error type processors may return to abort a parse.
///
/// The error is carried as the [`ErrorSource::Processor`] cause of the
/// resulting [`ParseError`].
pub type ProcessError = Box<dyn core::error::Error + Send + Sync>;

/// A lexical or structural problem in the scanned text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A character that cannot start or continue the current token.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// The input ended inside a value, string, or container.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// Non-whitespace text after the root value.
    #[error("unexpected data after the root value")]
    TrailingData,
    /// A backslash followed by a character that is not a known escape.
    #[error("illegal escaped character: \\{0}")]
    IllegalEscape(char),
    /// A `\u` escape with a non-hexadecimal digit.
    #[error("invalid unicode escape character '{0}'")]
    InvalidUnicodeEscapeChar(char),
    /// A `\u` escape naming a lone surrogate.
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    /// An unquoted token that is not a JSON literal, in strict mode.
    #[error("unquoted text is not allowed in strict mode")]
    UnquotedText,
    /// A comment, in strict mode.
    #[error("comments are not allowed in strict mode")]
    Comment,
    /// Containers nested deeper than the configured limit.
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}

/// The cause wrapped by a [`ParseError`].
#[derive(Debug, Error)]
pub enum ErrorSource {
    /// The input is malformed.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// A processor returned an error.
    #[error("processor error: {0}")]
    Processor(#[source] ProcessError),
}

/// Failure of a scan, located in the input.
#[derive(Debug, Error)]
#[error("{source} on line {line} near: {context}")]
pub struct ParseError {
    pub(crate) source: ErrorSource,
    pub(crate) offset: usize,
    pub(crate) line: usize,
    pub(crate) context: String,
}

/// Characters of context kept before the failing offset.
const CONTEXT_BEFORE: usize = 32;
/// Characters of context kept after the failing offset.
const CONTEXT_AFTER: usize = 64;

impl ParseError {
    pub(crate) fn at(input: &str, offset: usize, source: ErrorSource) -> Self {
        let offset = floor_char_boundary(input, offset.min(input.len()));
        let line = 1 + input.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count();

        let before = &input[..offset];
        let start = before
            .char_indices()
            .rev()
            .nth(CONTEXT_BEFORE - 1)
            .map_or(0, |(i, _)| i);
        let after = &input[offset..];
        let end = after
            .char_indices()
            .nth(CONTEXT_AFTER)
            .map_or(after.len(), |(i, _)| i);

        let mut context = String::with_capacity(CONTEXT_BEFORE + CONTEXT_AFTER + 7);
        context.push_str(&before[start..]);
        context.push_str("*ERROR*");
        context.push_str(&after[..end]);

        Self {
            source,
            offset,
            line,
            context,
        }
    }

    /// The underlying cause.
    #[must_use]
    pub fn kind(&self) -> &ErrorSource {
        &self.source
    }

    /// Byte offset into the input where scanning failed.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line of [`offset`](Self::offset).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Text around the failure, with `*ERROR*` marking the offset.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// What went wrong while compiling a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternErrorKind {
    /// A leading, trailing or doubled `/`.
    EmptyStep,
    /// An alternative with no name, such as `a,` or `,b`.
    EmptyMatch,
    /// `[]` anywhere but directly after a capture.
    MisplacedArray,
    /// `@` anywhere but after a step or a capture.
    MisplacedProcess,
    /// `(` that does not start a match.
    MisplacedGroup,
    /// `(` without a closing `)`.
    UnclosedGroup,
    /// `)` without an opening `(`.
    UnmatchedParen,
    /// A capture group inside another.
    NestedGroup,
    /// A `/` inside a capture group.
    SlashInGroup,
    /// `**` combined with other alternatives or placed inside a capture.
    MisplacedRecursive,
    /// `*` mixed with other name characters.
    MisplacedWildcard,
    /// A reserved character outside a quoted literal.
    ReservedCharacter(char),
    /// A `'` literal with no closing quote.
    UnterminatedQuote,
    /// No step of the pattern captures anything.
    NoCapture,
}

impl fmt::Display for PatternErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStep => f.write_str("empty step"),
            Self::EmptyMatch => f.write_str("empty match"),
            Self::MisplacedArray => f.write_str("`[]` must follow a capture"),
            Self::MisplacedProcess => f.write_str("`@` must follow a step or a capture"),
            Self::MisplacedGroup => f.write_str("`(` must start a match"),
            Self::UnclosedGroup => f.write_str("unclosed `(`"),
            Self::UnmatchedParen => f.write_str("unmatched `)`"),
            Self::NestedGroup => f.write_str("capture groups cannot nest"),
            Self::SlashInGroup => f.write_str("`/` inside a capture group"),
            Self::MisplacedRecursive => f.write_str("`**` must be a whole step"),
            Self::MisplacedWildcard => f.write_str("`*` must be a whole name"),
            Self::ReservedCharacter(c) => write!(f, "reserved character '{c}' must be quoted"),
            Self::UnterminatedQuote => f.write_str("unterminated quote"),
            Self::NoCapture => f.write_str("pattern captures nothing"),
        }
    }
}

/// A pattern string that could not be compiled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at {offset} in pattern: {pattern}")]
pub struct PatternError {
    pub(crate) kind: PatternErrorKind,
    pub(crate) offset: usize,
    pub(crate) pattern: String,
}

impl PatternError {
    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> PatternErrorKind {
        self.kind
    }

    /// Character offset into the pattern.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offending pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Errors returned by [`JsonMatcher`](crate::JsonMatcher).
#[derive(Debug, Error)]
pub enum MatcherError {
    /// Scanning failed, or a processor returned an error.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// A control call named a pattern index that was never registered.
    #[error("no pattern with index {0}")]
    UnknownPattern(usize),
    /// `parse_value` cannot honour process triggers.
    #[error("pattern {0} uses `@`, which parse_value does not support")]
    ProcessTrigger(usize),
    /// Reading the input failed.
    #[cfg(feature = "std")]
    #[error("error reading input: {0}")]
    Io(#[from] std::io::Error),
}
