//! Decoding of `\uXXXX` escapes, including UTF-16 surrogate pairs.
//!
//! The [`UnicodeEscapeBuffer`] accumulates the four hexadecimal digits of one
//! escape and turns them into a UTF-16 code unit. A high surrogate is held
//! until the following escape supplies the matching low surrogate, so that
//! `\uD83D\uDE00` decodes to a single `char`.
//!
//! # Errors
//!
//! - A non-hexadecimal digit is [`SyntaxError::InvalidUnicodeEscapeChar`].
//! - A low surrogate without a preceding high one, or a high surrogate that is
//!   not followed by a low one, is
//!   [`SyntaxError::InvalidUnicodeEscapeSequence`].

use crate::error::SyntaxError;

const HIGH_SURROGATES: core::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: core::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    code: u32,
    len: u8,
    high: Option<u32>,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a high surrogate is waiting for its low half.
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.high.is_some()
    }

    /// Feeds one hex digit of the current escape.
    ///
    /// Returns `Ok(Some(ch))` once a complete scalar value is available, and
    /// `Ok(None)` while digits, or the low half of a pair, are still missing.
    pub fn feed(&mut self, c: char) -> Result<Option<char>, SyntaxError> {
        let digit = c
            .to_digit(16)
            .ok_or(SyntaxError::InvalidUnicodeEscapeChar(c))?;
        self.code = (self.code << 4) | digit;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }

        let unit = self.code;
        self.code = 0;
        self.len = 0;

        match self.high.take() {
            Some(high) if LOW_SURROGATES.contains(&unit) => {
                let scalar = 0x1_0000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                char::from_u32(scalar)
                    .map(Some)
                    .ok_or(SyntaxError::InvalidUnicodeEscapeSequence(scalar))
            }
            Some(high) => Err(SyntaxError::InvalidUnicodeEscapeSequence(high)),
            None if HIGH_SURROGATES.contains(&unit) => {
                self.high = Some(unit);
                Ok(None)
            }
            None => char::from_u32(unit)
                .map(Some)
                .ok_or(SyntaxError::InvalidUnicodeEscapeSequence(unit)),
        }
    }

    /// Fails if the text ended, or moved on, between the halves of a pair.
    pub fn finish(&mut self) -> Result<(), SyntaxError> {
        match self.high.take() {
            Some(high) => Err(SyntaxError::InvalidUnicodeEscapeSequence(high)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UnicodeEscapeBuffer;
    use crate::error::SyntaxError;

    fn decode(digits: &str) -> Result<Option<char>, SyntaxError> {
        let mut buf = UnicodeEscapeBuffer::new();
        let mut out = None;
        for ch in digits.chars() {
            out = buf.feed(ch)?;
        }
        buf.finish()?;
        Ok(out)
    }

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed('0').unwrap(), None);
        assert_eq!(buf.feed('0').unwrap(), None);
        assert_eq!(buf.feed('4').unwrap(), None);
        assert_eq!(buf.feed('1').unwrap(), Some('A'));
    }

    #[test]
    fn mixed_case_hex() {
        assert_eq!(decode("AbCd").unwrap(), char::from_u32(0xABCD));
    }

    #[test]
    fn surrogate_pair_combines() {
        assert_eq!(decode("D83DDE00").unwrap(), Some('😀'));
    }

    #[test]
    fn high_surrogate_waits_for_low_half() {
        let mut buf = UnicodeEscapeBuffer::new();
        for ch in "D83D".chars() {
            assert_eq!(buf.feed(ch).unwrap(), None);
        }
        assert!(buf.is_pending());
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert_eq!(
            decode("DE00"),
            Err(SyntaxError::InvalidUnicodeEscapeSequence(0xDE00))
        );
        assert_eq!(
            decode("D83D"),
            Err(SyntaxError::InvalidUnicodeEscapeSequence(0xD83D))
        );
        assert_eq!(
            decode("D83D0041"),
            Err(SyntaxError::InvalidUnicodeEscapeSequence(0xD83D))
        );
    }

    #[test]
    fn invalid_hex_error() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(
            buf.feed('G'),
            Err(SyntaxError::InvalidUnicodeEscapeChar('G'))
        );
    }
}
