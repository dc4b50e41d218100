use alloc::{borrow::Cow, string::String};

use crate::{
    error::SyntaxError,
    escape_buffer::UnicodeEscapeBuffer,
    value::{Number, Value},
};

/// A name or scalar value as it appears in the input.
///
/// Tokens borrow from the scanned text. Escape sequences are left in place
/// until [`text`](Self::text) or [`to_value`](Self::to_value) is called, so
/// data that no pattern is interested in is never decoded or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    raw: &'src str,
    quoted: bool,
    escaped: bool,
}

impl<'src> Token<'src> {
    pub(crate) fn quoted(raw: &'src str, escaped: bool) -> Self {
        Self {
            raw,
            quoted: true,
            escaped,
        }
    }

    pub(crate) fn unquoted(raw: &'src str) -> Self {
        Self {
            raw,
            quoted: false,
            escaped: raw.contains('\\'),
        }
    }

    /// The token text without surrounding quotes and with escapes intact.
    #[must_use]
    pub fn raw(&self) -> &'src str {
        self.raw
    }

    /// Whether the token was written between double quotes.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Whether [`text`](Self::text) has escape sequences to resolve.
    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// The decoded text. Borrows from the input unless the token contains
    /// escape sequences.
    ///
    /// # Errors
    ///
    /// Fails on an unknown escape, a malformed `\u` escape, or an unpaired
    /// UTF-16 surrogate.
    pub fn text(&self) -> Result<Cow<'src, str>, SyntaxError> {
        if self.escaped {
            unescape(self.raw).map(Cow::Owned)
        } else {
            Ok(Cow::Borrowed(self.raw))
        }
    }

    /// Types the token. Quoted tokens are strings; unquoted ones are `null`,
    /// booleans, numbers (kept as text) or, failing those, strings.
    ///
    /// # Errors
    ///
    /// Same as [`text`](Self::text).
    pub fn to_value(&self) -> Result<Value, SyntaxError> {
        if !self.quoted {
            match self.raw {
                "null" => return Ok(Value::Null),
                "true" => return Ok(Value::Boolean(true)),
                "false" => return Ok(Value::Boolean(false)),
                raw if Number::is_number_text(raw) => return Ok(Value::Number(raw.into())),
                _ => {}
            }
        }
        Ok(Value::String(self.text()?.into_owned()))
    }

    /// Whether an unquoted token is valid standard JSON.
    pub(crate) fn is_json_literal(&self) -> bool {
        self.quoted
            || matches!(self.raw, "null" | "true" | "false")
            || Number::is_number_text(self.raw)
    }
}

fn unescape(raw: &str) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(raw.len());
    let mut unicode = UnicodeEscapeBuffer::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unicode.finish()?;
            out.push(c);
            continue;
        }
        // A trailing backslash has nothing to escape and is dropped.
        let Some(escaped) = chars.next() else { break };
        if escaped != 'u' {
            unicode.finish()?;
        }
        match escaped {
            '"' | '\\' | '/' => out.push(escaped),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let mut decoded = None;
                for _ in 0..4 {
                    let digit = chars.next().ok_or(SyntaxError::UnexpectedEndOfInput)?;
                    decoded = unicode.feed(digit)?;
                }
                if let Some(ch) = decoded {
                    out.push(ch);
                }
            }
            other => return Err(SyntaxError::IllegalEscape(other)),
        }
    }
    unicode.finish()?;
    Ok(out)
}
