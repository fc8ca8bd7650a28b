//! Error types for decoding, value parsing and encoding.
//!
//! Decode errors carry the 1-based line and byte-based column where the
//! offending token began. Numeric range overflow is reported through the
//! distinguishable [`ValueError::OutOfRange`] sentinel so callers can test
//! for it with a plain equality match.

use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

/// An error produced while decoding line-protocol input.
///
/// Displayed as `at line {line}:{column}: {message}`. The column counts
/// bytes, not characters, from the start of the physical line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at line {line}:{column}: {kind}")]
pub struct DecodeError {
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based byte offset of the offending token within its line.
    pub column: usize,
    /// What went wrong.
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    /// Reports whether this error was caused by a numeric value lying
    /// outside its representable range.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            &self.kind,
            DecodeErrorKind::FieldValue {
                source: ValueError::OutOfRange,
                ..
            } | DecodeErrorKind::Timestamp(ValueError::OutOfRange)
        )
    }
}

/// The individual decode failure modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("no measurement name found")]
    NoMeasurement,
    #[error("invalid character {} found at start of measurement name", QuotedByte(*.0))]
    InvalidMeasurementStart(u8),
    #[error("invalid character found in comment line")]
    CommentWithInvalidChar,
    #[error("empty tag name")]
    EmptyTagName,
    #[error("expected '=' after tag key {}, but got {} instead", Quoted(.key), QuotedByte(*.found))]
    ExpectedEqualsAfterTagKey { key: Vec<u8>, found: u8 },
    #[error("expected tag value after tag key {}, but none found", Quoted(.0))]
    MissingTagValue(Vec<u8>),
    #[error("expected tag key after comma; got end of input")]
    CommaThenEndOfInput,
    #[error("expected tag key after comma; got white space instead")]
    CommaThenWhitespace,
    #[error("expected field key but none found")]
    ExpectedFieldKey,
    #[error("invalid character {} found at start of field key", QuotedByte(*.0))]
    InvalidFieldKeyStart(u8),
    #[error("want '=' after field key {}, found end of input", Quoted(.0))]
    EqualsAfterFieldKeyEof(Vec<u8>),
    #[error("want '=' after field key {}, found {}", Quoted(.key), QuotedByte(*.found))]
    ExpectedEqualsAfterFieldKey { key: Vec<u8>, found: u8 },
    #[error("expected field value, found end of input")]
    MissingFieldValue,
    #[error("expected closing quote for string field value, found end of input")]
    UnterminatedString,
    #[error("unexpected string termination")]
    UnexpectedStringTermination,
    #[error("field value has unrecognized type")]
    UnrecognizedFieldType,
    #[error("unexpected character {} after field", QuotedByte(*.0))]
    UnexpectedCharAfterField(u8),
    #[error("invalid timestamp ({})", Quoted(.0))]
    InvalidTimestamp(Vec<u8>),
    #[error("unexpected text after timestamp ({})", Quoted(.0))]
    TextAfterTimestamp(Vec<u8>),
    #[error("cannot parse value for field key {}: {source}", Quoted(.key))]
    FieldValue { key: Vec<u8>, source: ValueError },
    #[error("invalid timestamp: {0}")]
    Timestamp(ValueError),
}

/// An error produced while parsing or constructing a field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValueError {
    /// The value is syntactically a number but does not fit its type.
    /// This variant is the sentinel that callers may test for.
    #[error("line-protocol value out of range")]
    OutOfRange,
    #[error("invalid syntax")]
    InvalidSyntax,
    #[error("invalid integer value syntax")]
    InvalidInt,
    #[error("invalid unsigned integer value syntax")]
    InvalidUint,
    #[error("invalid float value syntax")]
    InvalidFloat,
    #[error("invalid bool value {}", Quoted(.0))]
    InvalidBool(Vec<u8>),
    #[error("non-number {} cannot be represented as a line-protocol field value", Quoted(.0))]
    NonFiniteFloat(Vec<u8>),
    #[error("cannot parse value {} with unknown kind", Quoted(.0))]
    UnknownKind(Vec<u8>),
}

/// An error recorded by the [`Encoder`](crate::Encoder).
///
/// When the failing point is not the first one started since the last
/// [`reset`](crate::Encoder::reset), the message is prefixed with
/// `encoding point N:` so batch producers can locate the bad point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    /// Index of the point the error is attributed to, if any.
    pub point: Option<usize>,
    /// What went wrong.
    pub kind: EncodeErrorKind,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(point) = self.point {
            write!(f, "encoding point {point}: ")?;
        }
        self.kind.fmt(f)
    }
}

impl core::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// The individual encode failure modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeErrorKind {
    #[error("invalid measurement {}", Quoted(.0))]
    InvalidMeasurement(Vec<u8>),
    #[error("invalid tag key {}", Quoted(.0))]
    InvalidTagKey(Vec<u8>),
    #[error("invalid tag value {}={}", Lossy(.key), Quoted(.value))]
    InvalidTagValue { key: Vec<u8>, value: Vec<u8> },
    #[error("tag key {} out of order (previous key {})", Quoted(.key), Quoted(.previous))]
    TagOutOfOrder { key: Vec<u8>, previous: Vec<u8> },
    #[error("invalid field key {}", Quoted(.0))]
    InvalidFieldKey(Vec<u8>),
    #[error("tag must be added after adding a measurement and before adding fields")]
    TagSection,
    #[error("field must be added after tag or measurement section")]
    FieldSection,
    #[error("timestamp must be added after adding at least one field")]
    NoFields,
    #[error("cannot start line without adding at least one field to previous line")]
    NoFieldsOnPreviousLine,
    #[error("need more space")]
    NeedMoreSpace,
}

// ------------------------------------------------------------------------
// Display helpers for byte payloads in messages
// ------------------------------------------------------------------------

/// Displays a byte string the way a double-quoted literal would be written:
/// `"abc"`, with non-printable bytes hex-escaped.
pub(crate) struct Quoted<'a>(pub &'a [u8]);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        write_escaped(f, self.0)?;
        f.write_str("\"")
    }
}

/// Displays a single byte the way a quoted character literal would be
/// written: `'a'`, `'\n'`, `'\x01'`.
pub(crate) struct QuotedByte(pub u8);

impl fmt::Display for QuotedByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        write_escaped(f, &[self.0])?;
        f.write_str("'")
    }
}

/// Displays a byte string as UTF-8 where possible, without quotes.
pub(crate) struct Lossy<'a>(pub &'a [u8]);

impl fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.0)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let mut rest = bytes;
    while !rest.is_empty() {
        match core::str::from_utf8(rest) {
            Ok(s) => {
                write_escaped_str(f, s)?;
                break;
            }
            Err(e) => {
                let (valid, tail) = rest.split_at(e.valid_up_to());
                write_escaped_str(f, core::str::from_utf8(valid).unwrap_or(""))?;
                write!(f, "\\x{:02x}", tail[0])?;
                rest = &tail[1..];
            }
        }
    }
    Ok(())
}

fn write_escaped_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => fmt::Write::write_char(f, c)?,
        }
    }
    Ok(())
}
