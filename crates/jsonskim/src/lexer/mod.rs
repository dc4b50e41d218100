//! Single-pass scanner turning JSON text into structural events.
//!
//! The [`Skimmer`] walks the input once, left to right, and reports what it
//! sees to a [`SkimHandler`]: a container opening, a scalar value, or a
//! container closing. Nothing is materialized. Names and values are handed
//! over as [`Token`]s borrowing from the input, with escapes and number
//! conversion deferred until a handler asks for them.
//!
//! By default the scanner accepts relaxed, hand-edited JSON in addition to
//! RFC 8259:
//!
//! - `//` line comments and `/* */` block comments;
//! - unquoted names, ending at `:` or a line break;
//! - unquoted values, ending at `}`, `]`, `,` or a line break;
//! - trailing commas, and missing commas between members.
//!
//! [`SkimOptions::strict`] turns all of these into syntax errors.
//!
//! ```
//! use jsonskim::{ContainerKind, ErrorSource, Flow, SkimHandler, SkimOptions, Skimmer, Token};
//!
//! #[derive(Default)]
//! struct CountValues(usize);
//!
//! impl SkimHandler for CountValues {
//!     fn enter(&mut self, _: Option<&Token<'_>>, _: ContainerKind) -> Result<Flow, ErrorSource> {
//!         Ok(Flow::Continue)
//!     }
//!     fn value(&mut self, _: Option<&Token<'_>>, _: &Token<'_>) -> Result<Flow, ErrorSource> {
//!         self.0 += 1;
//!         Ok(Flow::Continue)
//!     }
//!     fn exit(&mut self, _: ContainerKind) -> Result<Flow, ErrorSource> {
//!         Ok(Flow::Continue)
//!     }
//! }
//!
//! let mut counter = CountValues::default();
//! Skimmer::new(SkimOptions::default())
//!     .skim("{ a: 1, b: [true, null], /* skipped */ c: x }", &mut counter)
//!     .unwrap();
//! assert_eq!(counter.0, 4);
//! ```

mod token;

use alloc::vec::Vec;

use bstr::ByteSlice;
pub use token::Token;

use crate::{
    SkimOptions,
    error::{ErrorSource, ParseError, SyntaxError},
};

/// Whether a handler wants the scan to go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep scanning.
    Continue,
    /// Stop now. The scan returns `Ok(())` without reading further input.
    Stop,
}

/// The two JSON container types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
}

/// Receiver of scan events.
///
/// `name` is the member name inside an object and `None` for array elements
/// and the root value. Every `enter` is balanced by an `exit` unless the scan
/// stops or fails first.
pub trait SkimHandler {
    /// A container opens.
    ///
    /// # Errors
    ///
    /// An error aborts the scan; it is returned wrapped in a [`ParseError`]
    /// located at the opening bracket.
    fn enter(&mut self, name: Option<&Token<'_>>, kind: ContainerKind)
    -> Result<Flow, ErrorSource>;

    /// A scalar value.
    ///
    /// # Errors
    ///
    /// As for [`enter`](Self::enter), located at the start of the value.
    fn value(&mut self, name: Option<&Token<'_>>, value: &Token<'_>) -> Result<Flow, ErrorSource>;

    /// The innermost open container closes.
    ///
    /// # Errors
    ///
    /// As for [`enter`](Self::enter), located at the closing bracket.
    fn exit(&mut self, kind: ContainerKind) -> Result<Flow, ErrorSource>;
}

/// The relaxed JSON scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Skimmer {
    options: SkimOptions,
}

impl Skimmer {
    /// Creates a scanner with the given options.
    #[must_use]
    pub fn new(options: SkimOptions) -> Self {
        Self { options }
    }

    /// Scans `input`, reporting events to `handler`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed input, or wrapping the error of
    /// a handler. Escape sequences are only checked for tokens a handler
    /// decodes, so malformed escapes in ignored data go unreported.
    pub fn skim<H: SkimHandler + ?Sized>(
        &self,
        input: &str,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        Scan {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            state: ParseState::Start,
            stack: Vec::new(),
            name: None,
            after_comma: false,
            options: self.options,
        }
        .run(handler)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    BeforePropertyName,
    AfterPropertyName,
    BeforePropertyValue,
    BeforeArrayValue,
    AfterPropertyValue,
    AfterArrayValue,
    End,
}

struct Scan<'src> {
    input: &'src str,
    bytes: &'src [u8],
    pos: usize,
    state: ParseState,
    stack: Vec<ContainerKind>,
    name: Option<Token<'src>>,
    after_comma: bool,
    options: SkimOptions,
}

/// Outcome of dispatching one event to the handler.
type Step = Result<Flow, ParseError>;

impl<'src> Scan<'src> {
    fn run<H: SkimHandler + ?Sized>(mut self, handler: &mut H) -> Result<(), ParseError> {
        use ParseState::*;

        loop {
            self.skip_trivia()?;
            let Some(&b) = self.bytes.get(self.pos) else {
                return match self.state {
                    End => Ok(()),
                    _ => Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput)),
                };
            };

            let flow = match self.state {
                Start | BeforePropertyValue => self.value(b, handler)?,
                BeforeArrayValue => match b {
                    b']' if self.after_comma && self.options.strict => {
                        return Err(self.unexpected(b));
                    }
                    b']' => self.close(ContainerKind::Array, handler)?,
                    _ => self.value(b, handler)?,
                },
                BeforePropertyName => match b {
                    b'}' if self.after_comma && self.options.strict => {
                        return Err(self.unexpected(b));
                    }
                    b'}' => self.close(ContainerKind::Object, handler)?,
                    b'"' => {
                        let name = self.quoted()?;
                        self.name = Some(name);
                        self.state = AfterPropertyName;
                        Flow::Continue
                    }
                    b'{' | b'[' | b']' | b',' | b':' => return Err(self.unexpected(b)),
                    _ if self.options.strict => return Err(self.unexpected(b)),
                    _ => {
                        let name = self.unquoted(|b| matches!(b, b':' | b'\r' | b'\n'));
                        self.name = Some(name);
                        self.state = AfterPropertyName;
                        Flow::Continue
                    }
                },
                AfterPropertyName => match b {
                    b':' => {
                        self.pos += 1;
                        self.state = BeforePropertyValue;
                        Flow::Continue
                    }
                    _ => return Err(self.unexpected(b)),
                },
                AfterPropertyValue => match b {
                    b',' => {
                        self.pos += 1;
                        self.after_comma = true;
                        self.state = BeforePropertyName;
                        Flow::Continue
                    }
                    b'}' => self.close(ContainerKind::Object, handler)?,
                    _ if self.options.strict => return Err(self.unexpected(b)),
                    _ => {
                        self.after_comma = false;
                        self.state = BeforePropertyName;
                        Flow::Continue
                    }
                },
                AfterArrayValue => match b {
                    b',' => {
                        self.pos += 1;
                        self.after_comma = true;
                        self.state = BeforeArrayValue;
                        Flow::Continue
                    }
                    b']' => self.close(ContainerKind::Array, handler)?,
                    _ if self.options.strict => return Err(self.unexpected(b)),
                    _ => {
                        self.after_comma = false;
                        self.state = BeforeArrayValue;
                        Flow::Continue
                    }
                },
                End => return Err(self.syntax_error(SyntaxError::TrailingData)),
            };

            if flow == Flow::Stop {
                return Ok(());
            }
        }
    }

    /// Handles a value starting with `b`: a container, a quoted string or an
    /// unquoted literal.
    fn value<H: SkimHandler + ?Sized>(&mut self, b: u8, handler: &mut H) -> Step {
        let start = self.pos;
        let name = self.name.take();

        let kind = match b {
            b'{' => ContainerKind::Object,
            b'[' => ContainerKind::Array,
            b'}' | b']' | b',' | b':' => return Err(self.unexpected(b)),
            _ => {
                let token = if b == b'"' {
                    self.quoted()?
                } else {
                    let token = self.unquoted(|b| matches!(b, b'}' | b']' | b',' | b'\r' | b'\n'));
                    if self.options.strict && !token.is_json_literal() {
                        return Err(self.error_at(start, SyntaxError::UnquotedText.into()));
                    }
                    token
                };
                self.state = self.after_value();
                return handler
                    .value(name.as_ref(), &token)
                    .map_err(|e| self.error_at(start, e));
            }
        };

        let depth = self.stack.len();
        if let Some(max) = self.options.max_depth.filter(|&max| depth >= max) {
            return Err(self.syntax_error(SyntaxError::DepthLimitExceeded(max)));
        }
        self.pos += 1;
        self.stack.push(kind);
        self.after_comma = false;
        self.state = match kind {
            ContainerKind::Object => ParseState::BeforePropertyName,
            ContainerKind::Array => ParseState::BeforeArrayValue,
        };
        handler
            .enter(name.as_ref(), kind)
            .map_err(|e| self.error_at(start, e))
    }

    fn close<H: SkimHandler + ?Sized>(&mut self, kind: ContainerKind, handler: &mut H) -> Step {
        let start = self.pos;
        self.pos += 1;
        self.stack.pop();
        self.state = self.after_value();
        handler.exit(kind).map_err(|e| self.error_at(start, e))
    }

    fn after_value(&self) -> ParseState {
        match self.stack.last() {
            None => ParseState::End,
            Some(ContainerKind::Object) => ParseState::AfterPropertyValue,
            Some(ContainerKind::Array) => ParseState::AfterArrayValue,
        }
    }

    /// Reads a quoted string; `pos` is on the opening quote.
    fn quoted(&mut self) -> Result<Token<'src>, ParseError> {
        let start = self.pos + 1;
        let mut end = start;
        let mut escaped = false;

        loop {
            if end >= self.bytes.len() {
                self.pos = self.bytes.len();
                return Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput));
            }
            let Some(found) = self.bytes[end..].find_byteset(b"\"\\") else {
                self.pos = self.bytes.len();
                return Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput));
            };
            end += found;
            if self.bytes[end] == b'"' {
                break;
            }
            escaped = true;
            end += 2;
        }

        self.pos = end + 1;
        Ok(Token::quoted(&self.input[start..end], escaped))
    }

    /// Reads an unquoted token up to a byte matching `stop`, a comment, or
    /// the end of input, with trailing whitespace trimmed.
    fn unquoted(&mut self, stop: impl Fn(u8) -> bool) -> Token<'src> {
        let start = self.pos;
        let mut end = start;
        while let Some(&b) = self.bytes.get(end) {
            if stop(b) || (!self.options.strict && self.comment_at(end)) {
                break;
            }
            end += 1;
        }
        self.pos = end;

        let raw = self.input[start..end].trim_end_matches([' ', '\t']);
        Token::unquoted(raw)
    }

    fn comment_at(&self, at: usize) -> bool {
        self.bytes.get(at) == Some(&b'/') && matches!(self.bytes.get(at + 1), Some(b'/' | b'*'))
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.bytes.get(self.pos) {
                self.pos += 1;
            }
            if !self.comment_at(self.pos) {
                return Ok(());
            }
            if self.options.strict {
                return Err(self.syntax_error(SyntaxError::Comment));
            }

            let body = self.pos + 2;
            let rest = &self.bytes[body..];
            self.pos = if self.bytes[self.pos + 1] == b'/' {
                rest.find_byte(b'\n').map_or(self.bytes.len(), |i| body + i + 1)
            } else {
                rest.find(b"*/").map_or(self.bytes.len(), |i| body + i + 2)
            };
        }
    }

    fn unexpected(&self, b: u8) -> ParseError {
        let c = if b.is_ascii() {
            char::from(b)
        } else {
            self.input[self.pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
        };
        self.syntax_error(SyntaxError::UnexpectedCharacter(c))
    }

    fn syntax_error(&self, err: SyntaxError) -> ParseError {
        self.error_at(self.pos, err.into())
    }

    fn error_at(&self, offset: usize, source: ErrorSource) -> ParseError {
        ParseError::at(self.input, offset, source)
    }
}
