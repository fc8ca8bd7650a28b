//! The builder-style encoder.
//!
//! [`Encoder`] appends entries to an owned byte buffer through calls in
//! wire order: [`start_line`](Encoder::start_line), then tags, then
//! fields, then [`end_line`](Encoder::end_line). Lines are joined with a
//! single newline and the output carries no trailing newline.
//!
//! The first failing call on a line rolls the buffer back to the start of
//! that line and records the error; every later call on the same line is
//! ignored. [`bytes`](Encoder::bytes) therefore never exposes a partial
//! or malformed line; at most the line currently being built is visible,
//! and that one is well-formed so far.

use alloc::format;
use alloc::vec::Vec;

use crate::byteset::{
    FIELD_KEY_ESCAPES, FIELD_STRING_VAL_ESCAPES, MEASUREMENT_ESCAPES, NON_PRINTABLE,
    TAG_KEY_ESCAPES, TAG_VAL_ESCAPES,
};
use crate::error::{EncodeError, EncodeErrorKind};
use crate::precision::Precision;
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LineSection {
    /// No line in progress.
    #[default]
    Idle,
    /// A line has started; tags may still be added.
    Tags,
    /// At least one field has been added.
    Fields,
}

/// A builder that serializes entries to an in-memory buffer.
///
/// # Examples
///
/// ```
/// use lineproto::{Encoder, Value};
///
/// let mut enc = Encoder::new();
/// enc.start_line("cpu");
/// enc.add_tag("host", "a");
/// enc.add_field("usage", Value::Float(0.5));
/// enc.end_line(Some(1_700_000_000_000_000_000));
/// assert!(enc.err().is_none());
/// assert_eq!(enc.bytes(), b"cpu,host=a usage=0.5 1700000000000000000");
/// ```
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
    /// Rollback offset: start of the current line, before its separating
    /// newline. Equal to `buf.len()` when no line is in progress.
    line_start: usize,
    /// End of the measurement-and-tags header of the current line.
    header_end: usize,
    /// Spans of the field pairs on the current line, for line splitting.
    fields: Vec<(usize, usize)>,
    section: LineSection,
    has_tags: bool,
    last_tag_key: Vec<u8>,
    line_has_fields: bool,
    line_err: bool,
    err: Option<EncodeError>,
    /// Number of `start_line` calls; errors are attributed to point
    /// `point_index - 1` when that is positive.
    point_index: usize,
    precision: Precision,
    lax: bool,
    max_line_bytes: usize,
}

impl Encoder {
    /// Returns an encoder with an empty buffer, nanosecond precision and
    /// no maximum line size.
    #[must_use]
    pub fn new() -> Encoder {
        Encoder::default()
    }

    /// Sets the precision used to render timestamps passed to
    /// [`end_line`](Encoder::end_line). The default is nanoseconds.
    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    /// Switches lax encoding on or off (off by default). Lax encoding
    /// skips the validation of measurements, keys and tag values; tag
    /// ordering is still enforced.
    pub fn set_lax(&mut self, lax: bool) {
        self.lax = lax;
    }

    /// Limits the length of the physical lines the encoder emits. A point
    /// whose line would exceed the limit is split into several lines, each
    /// repeating the measurement-and-tags header and the timestamp. Zero
    /// (the default) means no limit.
    pub fn set_max_line_bytes(&mut self, n: usize) {
        self.max_line_bytes = n;
    }

    /// The encoded bytes so far. Only successfully encoded lines are ever
    /// visible, plus the well-formed prefix of the line being built.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The first error recorded since the last
    /// [`clear_err`](Encoder::clear_err).
    #[must_use]
    pub fn err(&self) -> Option<&EncodeError> {
        self.err.as_ref()
    }

    /// Forgets the recorded error so encoding can be resumed.
    pub fn clear_err(&mut self) {
        self.err = None;
    }

    /// Discards the buffer and all per-line state, keeping the precision,
    /// lax and maximum-line-size settings.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.line_start = 0;
        self.header_end = 0;
        self.fields.clear();
        self.section = LineSection::Idle;
        self.has_tags = false;
        self.last_tag_key.clear();
        self.line_has_fields = false;
        self.line_err = false;
        self.err = None;
        self.point_index = 0;
    }

    /// Begins a new entry with the given measurement name.
    ///
    /// It is an error to start a line when the previous one has not had at
    /// least one field added; the previous line is then discarded.
    pub fn start_line(&mut self, measurement: impl AsRef<[u8]>) {
        self.start_line_impl(measurement.as_ref());
    }

    fn start_line_impl(&mut self, measurement: &[u8]) {
        self.point_index += 1;
        let prev_line_empty =
            self.section != LineSection::Idle && !self.line_has_fields && !self.line_err;
        self.line_err = false;
        self.has_tags = false;
        self.last_tag_key.clear();
        self.line_has_fields = false;
        self.fields.clear();
        self.section = LineSection::Tags;
        if prev_line_empty {
            // Discard the fieldless previous line; the new line is dead
            // too, since nothing of it has been written.
            self.record_error(EncodeErrorKind::NoFieldsOnPreviousLine);
            return;
        }
        self.line_start = self.buf.len();
        if !self.lax && !valid_name(measurement) {
            self.record_error(EncodeErrorKind::InvalidMeasurement(measurement.to_vec()));
            return;
        }
        if !self.buf.is_empty() {
            self.buf.push(b'\n');
        }
        MEASUREMENT_ESCAPES.append_escaped(&mut self.buf, measurement);
        self.header_end = self.buf.len();
    }

    /// Adds a tag to the current entry. Tags must be added after
    /// [`start_line`](Encoder::start_line), before any field, and in
    /// strictly increasing key order.
    pub fn add_tag(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        self.add_tag_impl(key.as_ref(), value.as_ref());
    }

    fn add_tag_impl(&mut self, key: &[u8], value: &[u8]) {
        if self.line_err {
            return;
        }
        if self.section != LineSection::Tags {
            self.record_error(EncodeErrorKind::TagSection);
            return;
        }
        if !self.lax {
            if !valid_name(key) {
                self.record_error(EncodeErrorKind::InvalidTagKey(key.to_vec()));
                return;
            }
            if !valid_name(value) {
                self.record_error(EncodeErrorKind::InvalidTagValue {
                    key: key.to_vec(),
                    value: value.to_vec(),
                });
                return;
            }
        }
        if self.has_tags && key <= self.last_tag_key.as_slice() {
            self.record_error(EncodeErrorKind::TagOutOfOrder {
                key: key.to_vec(),
                previous: self.last_tag_key.clone(),
            });
            return;
        }
        self.buf.push(b',');
        TAG_KEY_ESCAPES.append_escaped(&mut self.buf, key);
        self.buf.push(b'=');
        TAG_VAL_ESCAPES.append_escaped(&mut self.buf, value);
        self.header_end = self.buf.len();
        self.has_tags = true;
        self.last_tag_key.clear();
        self.last_tag_key.extend_from_slice(key);
    }

    /// Adds a field to the current entry. At least one field is required
    /// on every line.
    pub fn add_field(&mut self, key: impl AsRef<[u8]>, value: Value<'_>) {
        self.add_field_impl(key.as_ref(), &value);
    }

    fn add_field_impl(&mut self, key: &[u8], value: &Value<'_>) {
        if self.line_err {
            return;
        }
        match self.section {
            LineSection::Idle => {
                self.record_error(EncodeErrorKind::FieldSection);
                return;
            }
            LineSection::Tags => self.section = LineSection::Fields,
            LineSection::Fields => {}
        }
        if !self.lax && !valid_name(key) {
            self.record_error(EncodeErrorKind::InvalidFieldKey(key.to_vec()));
            return;
        }
        self.buf
            .push(if self.line_has_fields { b',' } else { b' ' });
        let pair_start = self.buf.len();
        FIELD_KEY_ESCAPES.append_escaped(&mut self.buf, key);
        self.buf.push(b'=');
        append_value(&mut self.buf, value);
        self.fields.push((pair_start, self.buf.len()));
        self.line_has_fields = true;
    }

    /// Finishes the current entry, appending its timestamp if one is
    /// given. The timestamp is UTC nanoseconds and is rendered at the
    /// configured precision, rounding toward negative infinity.
    pub fn end_line(&mut self, timestamp: Option<i64>) {
        if self.line_err {
            return;
        }
        if self.section == LineSection::Idle || !self.line_has_fields {
            self.record_error(EncodeErrorKind::NoFields);
            return;
        }
        let footer = match timestamp {
            None => Vec::new(),
            Some(ns) => {
                let ticks = self.precision.ticks_in(ns);
                format!(" {ticks}").into_bytes()
            }
        };
        let content_start = if self.line_start == 0 {
            0
        } else {
            self.line_start + 1
        };
        let line_len = self.buf.len() - content_start + footer.len();
        if self.max_line_bytes != 0 && line_len > self.max_line_bytes {
            self.split_line(content_start, &footer);
            if self.line_err {
                return;
            }
        } else {
            self.buf.extend_from_slice(&footer);
        }
        self.section = LineSection::Idle;
        self.line_start = self.buf.len();
        self.fields.clear();
    }

    /// Re-emits the pending line as several physical lines within the
    /// maximum, repeating the header and timestamp on each.
    fn split_line(&mut self, content_start: usize, footer: &[u8]) {
        let header = self.buf[content_start..self.header_end].to_vec();
        let pairs: Vec<Vec<u8>> = self
            .fields
            .iter()
            .map(|&(s, e)| self.buf[s..e].to_vec())
            .collect();
        self.buf.truncate(self.line_start);
        // Every field must fit on a line of its own, or the point cannot
        // be encoded at all.
        for pair in &pairs {
            if header.len() + 1 + pair.len() + footer.len() > self.max_line_bytes {
                self.record_error(EncodeErrorKind::NeedMoreSpace);
                return;
            }
        }
        let mut first_in_line = true;
        let mut line_len = 0;
        for pair in &pairs {
            if !first_in_line && line_len + 1 + pair.len() + footer.len() > self.max_line_bytes {
                self.buf.extend_from_slice(footer);
                first_in_line = true;
            }
            if first_in_line {
                if !self.buf.is_empty() {
                    self.buf.push(b'\n');
                }
                self.buf.extend_from_slice(&header);
                self.buf.push(b' ');
                self.buf.extend_from_slice(pair);
                line_len = header.len() + 1 + pair.len();
                first_in_line = false;
            } else {
                self.buf.push(b',');
                self.buf.extend_from_slice(pair);
                line_len += 1 + pair.len();
            }
        }
        self.buf.extend_from_slice(footer);
    }

    fn record_error(&mut self, kind: EncodeErrorKind) {
        self.buf.truncate(self.line_start);
        self.line_err = true;
        if self.err.is_none() {
            let point = (self.point_index > 1).then(|| self.point_index - 1);
            self.err = Some(EncodeError { point, kind });
        }
    }
}

/// A measurement, tag key, tag value or field key must be non-empty with
/// no control or DEL bytes, and must not end with a backslash (a trailing
/// backslash cannot be expressed in the wire format).
fn valid_name(name: &[u8]) -> bool {
    !name.is_empty()
        && !name.iter().any(|&b| NON_PRINTABLE.get(b))
        && name[name.len() - 1] != b'\\'
}

fn append_value(buf: &mut Vec<u8>, value: &Value<'_>) {
    match value {
        Value::Int(x) => buf.extend_from_slice(format!("{x}i").as_bytes()),
        Value::Uint(x) => buf.extend_from_slice(format!("{x}u").as_bytes()),
        Value::Float(x) => buf.extend_from_slice(format!("{x}").as_bytes()),
        Value::Bool(x) => buf.extend_from_slice(if *x { &b"true"[..] } else { &b"false"[..] }),
        Value::String(b) => {
            buf.push(b'"');
            FIELD_STRING_VAL_ESCAPES.append_escaped(buf, b);
            buf.push(b'"');
        }
    }
}

#[cfg(test)]
mod tests;
