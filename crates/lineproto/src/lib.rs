//! Streaming, zero-copy codec for the InfluxDB line-protocol wire format.
//!
//! Each line of the format carries one data point: a measurement name, an
//! ordered set of tags, an ordered set of typed fields and an optional
//! integer timestamp. The crate has two faces:
//!
//! - [`Decoder`], a pull-style tokenizer that scans input (a whole byte
//!   slice or an incremental [`Source`]) one section at a time, returning
//!   slices that alias its buffer instead of materializing a parse tree;
//! - [`Encoder`], a builder that validates and serializes points to an
//!   owned buffer, with optional per-line size budgeting and timestamp
//!   precision scaling.
//!
//! # Decoding
//!
//! ```
//! use lineproto::{Decoder, Precision};
//!
//! let mut dec = Decoder::new(b"cpu,host=a usage=0.5 1700000000000000000\n");
//! while dec.next_entry() {
//!     let name = dec.measurement()?.expect("measurement is first");
//!     assert_eq!(name, b"cpu");
//!     while let Some((key, value)) = dec.next_tag()? {
//!         assert_eq!((key, value), (&b"host"[..], &b"a"[..]));
//!     }
//!     while let Some((key, value)) = dec.next_field()? {
//!         assert_eq!(key, b"usage");
//!         assert_eq!(value.float(), 0.5);
//!     }
//!     let ts = dec.time(Precision::Nanosecond, None)?;
//!     assert_eq!(ts, Some(1_700_000_000_000_000_000));
//! }
//! # Ok::<(), lineproto::DecodeError>(())
//! ```
//!
//! A syntax error abandons only the line it occurs on; `next_entry`
//! resumes with the following line. At most one error is reported per
//! entry.
//!
//! # Encoding
//!
//! ```
//! use lineproto::{Encoder, Value};
//!
//! let mut enc = Encoder::new();
//! enc.start_line("cpu");
//! enc.add_tag("host", "a");
//! enc.add_field("usage", Value::Float(0.5));
//! enc.end_line(Some(1_700_000_000_000_000_000));
//! assert!(enc.err().is_none());
//! assert_eq!(enc.bytes(), b"cpu,host=a usage=0.5 1700000000000000000");
//! ```
//!
//! Neither codec is safe to share across threads; give each thread its
//! own instance.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod byteset;
mod decoder;
mod encoder;
mod error;
mod precision;
mod reader;
mod stats;
mod value;

pub use decoder::{Decoder, Section};
pub use encoder::Encoder;
pub use error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, ValueError};
pub use precision::Precision;
pub use reader::{Source, SourceError};
pub use stats::{Stat, Stats};
pub use value::{Value, ValueKind};
