//! Typed field values.
//!
//! [`Value`] is the tagged union over the five field-value types of the
//! line protocol. The `String` case borrows its byte payload where it can
//! (decoding is zero-copy), so `Value` carries a lifetime; call
//! [`Value::into_owned`] to detach one from its buffer.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;
use core::num::IntErrorKind;
use core::str::FromStr;

use crate::error::ValueError;

/// The type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// Reported only by lax-mode decoding for values whose type could not
    /// be determined; [`Value::parse`] rejects it.
    Unknown,
    String,
    Int,
    Uint,
    Float,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Unknown => "unknown",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        })
    }
}

/// One line-protocol field value.
///
/// `Float` holds a finite number; the constructors reject NaN and the
/// infinities, so a `Value` is always encodable.
///
/// Equality on `Float` compares bit patterns, so `0.0 != -0.0` and values
/// round-trip exactly through comparison.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    String(Cow<'a, [u8]>),
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value<'_> {}

impl<'a> Value<'a> {
    /// Parses the raw bytes of a field value of the given kind, as they
    /// appear on the wire minus any type suffix. The data for an `Int`
    /// value is `"0"`, not `"0i"`; the data for a `String` excludes the
    /// surrounding quotes and is adopted without copying.
    ///
    /// Numeric values that are syntactically valid but out of range fail
    /// with [`ValueError::OutOfRange`].
    pub fn parse(kind: ValueKind, data: &'a [u8]) -> Result<Value<'a>, ValueError> {
        match kind {
            ValueKind::String => Ok(Value::String(Cow::Borrowed(data))),
            ValueKind::Unknown => Err(ValueError::UnknownKind(data.to_vec())),
            _ => Self::parse_scalar(kind, data),
        }
    }

    /// Parses a non-string kind; the result borrows nothing.
    pub(crate) fn parse_scalar(kind: ValueKind, data: &[u8]) -> Result<Value<'static>, ValueError> {
        match kind {
            ValueKind::Int => {
                let x = parse_num::<i64>(data, ValueError::InvalidInt)?;
                Ok(Value::Int(x))
            }
            ValueKind::Uint => {
                let x = parse_num::<u64>(data, ValueError::InvalidUint)?;
                Ok(Value::Uint(x))
            }
            ValueKind::Float => {
                let s = core::str::from_utf8(data).map_err(|_| ValueError::InvalidFloat)?;
                let x: f64 = s.parse().map_err(|_| ValueError::InvalidFloat)?;
                if !x.is_finite() {
                    // An overflowing exponent parses to an infinity; a
                    // literal "inf"/"nan" is a different complaint. The
                    // exponent form only ever contains e/E besides digits
                    // and signs.
                    if data
                        .iter()
                        .any(|&b| matches!(b, b'i' | b'I' | b'n' | b'N'))
                    {
                        return Err(ValueError::NonFiniteFloat(data.to_vec()));
                    }
                    return Err(ValueError::OutOfRange);
                }
                Ok(Value::Float(x))
            }
            ValueKind::Bool => match data {
                b"t" | b"T" | b"true" | b"True" | b"TRUE" => Ok(Value::Bool(true)),
                b"f" | b"F" | b"false" | b"False" | b"FALSE" => Ok(Value::Bool(false)),
                _ => Err(ValueError::InvalidBool(data.to_vec())),
            },
            ValueKind::String | ValueKind::Unknown => unreachable!("non-scalar kind"),
        }
    }

    /// Returns a `Float` value, or `None` for NaN and the infinities.
    #[must_use]
    pub fn from_f64(x: f64) -> Option<Value<'static>> {
        x.is_finite().then_some(Value::Float(x))
    }

    /// The kind tag of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
        }
    }

    /// The value as an `i64`.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not `Int`.
    #[must_use]
    #[track_caller]
    pub fn int(&self) -> i64 {
        match self {
            Value::Int(x) => *x,
            v => panic!("value has unexpected kind; got {} want int", v.kind()),
        }
    }

    /// The value as a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not `Uint`.
    #[must_use]
    #[track_caller]
    pub fn uint(&self) -> u64 {
        match self {
            Value::Uint(x) => *x,
            v => panic!("value has unexpected kind; got {} want uint", v.kind()),
        }
    }

    /// The value as an `f64`.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not `Float`.
    #[must_use]
    #[track_caller]
    pub fn float(&self) -> f64 {
        match self {
            Value::Float(x) => *x,
            v => panic!("value has unexpected kind; got {} want float", v.kind()),
        }
    }

    /// The value as a `bool`.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not `Bool`.
    #[must_use]
    #[track_caller]
    pub fn boolean(&self) -> bool {
        match self {
            Value::Bool(x) => *x,
            v => panic!("value has unexpected kind; got {} want bool", v.kind()),
        }
    }

    /// The value's bytes.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not `String`.
    #[must_use]
    #[track_caller]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Value::String(b) => b,
            v => panic!("value has unexpected kind; got {} want string", v.kind()),
        }
    }

    /// Detaches the value from whatever buffer it may borrow.
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Int(x) => Value::Int(x),
            Value::Uint(x) => Value::Uint(x),
            Value::Float(x) => Value::Float(x),
            Value::Bool(x) => Value::Bool(x),
            Value::String(b) => Value::String(Cow::Owned(b.into_owned())),
        }
    }
}

fn parse_num<T: FromStr<Err = core::num::ParseIntError>>(
    data: &[u8],
    syntax_err: ValueError,
) -> Result<T, ValueError> {
    let s = core::str::from_utf8(data).map_err(|_| syntax_err.clone())?;
    s.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::OutOfRange,
        _ => syntax_err,
    })
}

impl From<i64> for Value<'static> {
    fn from(x: i64) -> Self {
        Value::Int(x)
    }
}

impl From<u64> for Value<'static> {
    fn from(x: u64) -> Self {
        Value::Uint(x)
    }
}

impl From<bool> for Value<'static> {
    fn from(x: bool) -> Self {
        Value::Bool(x)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(x: &'a [u8]) -> Self {
        Value::String(Cow::Borrowed(x))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(x: &'a str) -> Self {
        Value::String(Cow::Borrowed(x.as_bytes()))
    }
}

impl From<Vec<u8>> for Value<'static> {
    fn from(x: Vec<u8>) -> Self {
        Value::String(Cow::Owned(x))
    }
}

impl From<alloc::string::String> for Value<'static> {
    fn from(x: alloc::string::String) -> Self {
        Value::String(Cow::Owned(x.into_bytes()))
    }
}

/// Renders the value as it would appear in an entry: `42i`, `7u`, `1.5`,
/// `true`, `"quoted"`. Strings escape only `\"` and `\\`; this rendering is
/// for diagnostics, the [`Encoder`](crate::Encoder) has its own path.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{x}i"),
            Value::Uint(x) => write!(f, "{x}u"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(x) => f.write_str(if *x { "true" } else { "false" }),
            Value::String(b) => {
                f.write_str("\"")?;
                let mut rest: &[u8] = b;
                loop {
                    let (chunk, bad) = match core::str::from_utf8(rest) {
                        Ok(s) => (s, None),
                        Err(e) => {
                            let (valid, tail) = rest.split_at(e.valid_up_to());
                            (core::str::from_utf8(valid).unwrap_or(""), Some(tail))
                        }
                    };
                    for c in chunk.chars() {
                        match c {
                            '\\' => f.write_str("\\\\")?,
                            '"' => f.write_str("\\\"")?,
                            c => fmt::Write::write_char(f, c)?,
                        }
                    }
                    match bad {
                        None => break,
                        Some(tail) => {
                            write!(f, "\\x{:02x}", tail[0])?;
                            rest = &tail[1..];
                        }
                    }
                }
                f.write_str("\"")
            }
        }
    }
}
