//! The pull-style decoder.
//!
//! [`Decoder`] tokenizes line-protocol input one entry at a time without
//! building a parse tree. Within an entry the caller asks for each section
//! in wire order (measurement, tags, fields, timestamp) and may skip
//! earlier sections by asking for a later one; skipped sections are
//! consumed internally with unescaping elided.
//!
//! Byte slices returned by the decoder alias either the input buffer or an
//! internal unescape scratch buffer. Both are reused, so a returned slice
//! is only valid until the next call on the same decoder; the borrow
//! checker enforces this. Copy out (`to_vec`) anything that must outlive
//! the next call.
//!
//! A syntax error abandons the rest of the offending line: the erroring
//! call reports it once, subsequent section calls return `None`, and the
//! next [`Decoder::next_entry`] resumes at the following physical line.

use alloc::borrow::Cow;
use alloc::boxed::Box;

use crate::byteset::{
    ByteSet, BLANK_CHARS, COMMENT_CHARS, FIELD_KEY_CHARS, FIELD_KEY_ESCAPES,
    FIELD_SEPARATOR_SPACE, FIELD_STRING_VAL_CHARS, FIELD_STRING_VAL_ESCAPES, FIELD_VAL_CHARS,
    LAX_FIELD_SEPARATOR_SPACE, LAX_MEASUREMENT_CHARS, LAX_TAG_KEY_CHARS, MEASUREMENT_CHARS,
    MEASUREMENT_ESCAPES, NON_PRINTABLE, NOT_EOL, NOT_NEWLINE, TAG_KEY_CHARS, TAG_KEY_ESCAPES,
    TAG_VAL_CHARS, TAG_VAL_ESCAPES, TIME_CHARS, WHITESPACE,
};
use crate::error::{DecodeError, DecodeErrorKind, ValueError};
use crate::precision::Precision;
use crate::reader::{Reader, Source, SourceError, Span};
use crate::stats::{Stat, Stats};
use crate::value::{Value, ValueKind};

/// One section of a line-protocol entry, in wire order.
///
/// The decoder's current section advances monotonically within an entry.
/// `Newline` and `End` are bookkeeping states: `Newline` absorbs the rest
/// of a broken line during error recovery and `End` means the entry is
/// finished and [`Decoder::next_entry`] may begin the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Measurement,
    Tag,
    Field,
    Time,
    Newline,
    End,
}

/// The acceptor and separator sets chosen per decoding mode.
struct Acceptors {
    measurement: &'static ByteSet,
    tag_key: &'static ByteSet,
    tag_val: &'static ByteSet,
    field_key: &'static ByteSet,
    field_separator: &'static ByteSet,
}

const STRICT_ACCEPTORS: Acceptors = Acceptors {
    measurement: &MEASUREMENT_CHARS,
    tag_key: &TAG_KEY_CHARS,
    tag_val: &TAG_VAL_CHARS,
    field_key: &FIELD_KEY_CHARS,
    field_separator: &FIELD_SEPARATOR_SPACE,
};

// Lax decoding admits non-printable bytes in names, as older servers did;
// tab, CR and form feed keep their legacy role as section separators.
const LAX_ACCEPTORS: Acceptors = Acceptors {
    measurement: &LAX_MEASUREMENT_CHARS,
    tag_key: &LAX_TAG_KEY_CHARS,
    tag_val: &TAG_VAL_CHARS,
    field_key: &LAX_TAG_KEY_CHARS,
    field_separator: &LAX_FIELD_SEPARATOR_SPACE,
};

/// A streaming decoder for line-protocol entries.
///
/// # Examples
///
/// ```
/// use lineproto::{Decoder, Precision, ValueKind};
///
/// let mut dec = Decoder::new(b"cpu,host=a usage=0.5,n=42i 1700000000000000000\n");
/// assert!(dec.next_entry());
/// assert_eq!(dec.measurement().unwrap(), Some(&b"cpu"[..]));
/// assert_eq!(dec.next_tag().unwrap(), Some((&b"host"[..], &b"a"[..])));
/// assert_eq!(dec.next_tag().unwrap(), None);
/// let (key, kind, raw) = dec.next_field_bytes().unwrap().unwrap();
/// assert_eq!((key, kind, raw), (&b"usage"[..], ValueKind::Float, &b"0.5"[..]));
/// let (key, value) = dec.next_field().unwrap().unwrap();
/// assert_eq!(key, b"n");
/// assert_eq!(value.int(), 42);
/// assert_eq!(
///     dec.time(Precision::Nanosecond, None).unwrap(),
///     Some(1_700_000_000_000_000_000),
/// );
/// assert!(!dec.next_entry());
/// ```
pub struct Decoder<'a> {
    rdr: Reader<'a>,
    section: Section,
    lax: bool,
    stats: Stats,
    /// 1-based count of line terminators consumed outside string values.
    line: usize,
    /// Absolute position of the first byte of the current line.
    line_base: usize,
    /// Absolute position of the most recent field value, for value errors.
    field_val_pos: usize,
    /// Absolute position of the timestamp token, for timestamp errors.
    time_pos: usize,
}

impl<'a> Decoder<'a> {
    /// Decodes the entries inside `data`. No copy of the slice is made;
    /// returned tokens alias it where no unescaping was needed.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Decoder<'a> {
        Decoder::with_reader(Reader::from_slice(data), Section::End)
    }

    /// Decodes entries read incrementally from `source`.
    #[must_use]
    pub fn with_source(source: impl Source + 'a) -> Decoder<'a> {
        Decoder::with_reader(Reader::from_source(Box::new(source)), Section::End)
    }

    /// Decodes `data` as though it began at the given section, enabling
    /// (for example) parsing of a tag section without the preceding
    /// measurement. The data is not scanned forward: it must actually
    /// start at that section.
    #[must_use]
    pub fn at_section(data: &'a [u8], section: Section) -> Decoder<'a> {
        let mut dec = Decoder::with_reader(Reader::from_slice(data), section);
        if section != Section::Tag || !WHITESPACE.get(dec.rdr.at(0)) {
            return dec;
        }
        // A tag section starting with whitespace is an empty tag section;
        // move straight to the fields so that `next_tag` never sees input
        // it would misread as a tag key.
        dec.rdr.take(&FIELD_SEPARATOR_SPACE);
        dec.section = Section::Field;
        dec
    }

    fn with_reader(rdr: Reader<'a>, section: Section) -> Decoder<'a> {
        Decoder {
            rdr,
            section,
            lax: false,
            stats: Stats::new(),
            line: 1,
            line_base: 0,
            field_val_pos: 0,
            time_pos: 0,
        }
    }

    /// Switches lax decoding on or off (off by default).
    ///
    /// Lax decoding accepts non-printable bytes inside names (tab, CR and
    /// form feed still separate sections, as in the legacy format) and,
    /// instead of failing on a field value whose type cannot be
    /// determined, yields it with [`ValueKind::Unknown`] and its raw
    /// bytes.
    pub fn set_lax(&mut self, lax: bool) {
        self.lax = lax;
    }

    /// Advances to the next entry, reporting whether one is available.
    ///
    /// Syntax errors on individual lines do not end iteration (the
    /// decoder recovers at the next physical line), but I/O errors do;
    /// check [`Decoder::err`] once this returns `false`.
    pub fn next_entry(&mut self) -> bool {
        if self.advance_to_section(Section::End).is_err() {
            // The erroring line may not be fully consumed; the Newline
            // recovery section absorbs what is left of it.
            let _ = self.advance_to_section(Section::End);
        }
        self.skip_blank_lines();
        self.section = Section::Measurement;
        self.rdr.ensure(1)
    }

    /// Any I/O error encountered while pulling from the source. Always
    /// `None` for decoders over a whole slice.
    #[must_use]
    pub fn err(&self) -> Option<&SourceError> {
        self.rdr.err()
    }

    /// Drains the accumulated decode-oddity counters.
    pub fn stats(&mut self) -> Stats {
        core::mem::take(&mut self.stats)
    }

    /// Returns the measurement name, or `None` if a later section has
    /// already been consumed on this entry.
    pub fn measurement(&mut self) -> Result<Option<&[u8]>, DecodeError> {
        if !self.advance_to_section(Section::Measurement)? {
            return Ok(None);
        }
        // next_entry already skips blank lines, but at_section decoders
        // start here without a next_entry call.
        self.skip_blank_lines();
        self.rdr.reset();
        let start = self.rdr.pos();
        let span = self
            .rdr
            .take_esc(self.acceptors().measurement, &MEASUREMENT_ESCAPES);
        if span.is_empty() {
            if !self.rdr.ensure(1) {
                return Err(self.syntax_error_at(start, DecodeErrorKind::NoMeasurement));
            }
            let found = self.rdr.at(0);
            return Err(self.syntax_error_at(start, DecodeErrorKind::InvalidMeasurementStart(found)));
        }
        if self.rdr.slice(span)[0] == b'#' {
            // Comments are normally skipped earlier; a comment carrying an
            // invalid character rewinds to its start so the error lands
            // here, at measurement level.
            return Err(self.syntax_error_at(start, DecodeErrorKind::CommentWithInvalidChar));
        }
        if !self.rdr.skipping {
            let (quote, equals, nonprint) = {
                let m = self.rdr.slice(span);
                (
                    m[0] == b'"',
                    m.contains(&b'='),
                    self.lax && m.iter().any(|&b| NON_PRINTABLE.get(b)),
                )
            };
            if quote {
                self.stats.record(Stat::QuoteAtStart);
            }
            if equals {
                self.stats.record(Stat::MeasurementEquals);
            }
            if nonprint {
                self.stats.record(Stat::NonPrintable);
            }
        }
        self.advance_tag_comma()?;
        self.section = Section::Tag;
        Ok(Some(self.rdr.slice(span)))
    }

    /// Returns the next tag of the entry, or `None` at the end of the tag
    /// section.
    pub fn next_tag(&mut self) -> Result<Option<(&[u8], &[u8])>, DecodeError> {
        if !self.advance_to_section(Section::Tag)? {
            return Ok(None);
        }
        if self.rdr.ensure(1) && self.acceptors().field_separator.get(self.rdr.at(0)) {
            self.rdr.take(self.acceptors().field_separator);
            self.section = Section::Field;
            return Ok(None);
        }
        let key = self.rdr.take_esc(self.acceptors().tag_key, &TAG_KEY_ESCAPES);
        if key.is_empty() || !self.rdr.ensure(1) || self.rdr.at(0) != b'=' {
            if !self.rdr.ensure(1) {
                return Err(self.syntax_error(DecodeErrorKind::EmptyTagName));
            }
            let kind = DecodeErrorKind::ExpectedEqualsAfterTagKey {
                key: self.rdr.slice(key).to_vec(),
                found: self.rdr.at(0),
            };
            return Err(self.syntax_error(kind));
        }
        self.note_name_stats(key);
        self.rdr.advance(1);
        let value = self.rdr.take_esc(self.acceptors().tag_val, &TAG_VAL_ESCAPES);
        if value.is_empty() {
            let kind = DecodeErrorKind::MissingTagValue(self.rdr.slice(key).to_vec());
            return Err(self.syntax_error(kind));
        }
        if !self.rdr.ensure(1) {
            // No more data after the tag value. Yield the tag and park at
            // the field section; a caller asking for fields from here gets
            // an error, but the tags themselves are all visible.
            self.section = Section::Field;
            return Ok(Some((self.rdr.slice(key), self.rdr.slice(value))));
        }
        self.advance_tag_comma()?;
        Ok(Some((self.rdr.slice(key), self.rdr.slice(value))))
    }

    /// Returns the next field as `(key, kind, raw value bytes)`, or `None`
    /// at the end of the field section.
    ///
    /// The raw value is not validated; pass it through
    /// [`Value::parse`] (or use [`Decoder::next_field`]) to check it.
    pub fn next_field_bytes(&mut self) -> Result<Option<(&[u8], ValueKind, &[u8])>, DecodeError> {
        match self.next_field_spans()? {
            None => Ok(None),
            Some((key, kind, value)) => {
                Ok(Some((self.rdr.slice(key), kind, self.rdr.slice(value))))
            }
        }
    }

    /// Returns the next field with its value parsed.
    ///
    /// A numeric value that is out of range fails with an error for which
    /// [`DecodeError::is_out_of_range`] returns true; like any other field
    /// error it abandons the rest of the entry.
    pub fn next_field(&mut self) -> Result<Option<(&[u8], Value<'_>)>, DecodeError> {
        let (kspan, kind, vspan) = match self.next_field_spans()? {
            None => return Ok(None),
            Some(t) => t,
        };
        match kind {
            ValueKind::String => {
                let value = Value::String(Cow::Borrowed(self.rdr.slice(vspan)));
                Ok(Some((self.rdr.slice(kspan), value)))
            }
            ValueKind::Unknown => {
                let source = ValueError::UnknownKind(self.rdr.slice(vspan).to_vec());
                let key = self.rdr.slice(kspan).to_vec();
                let pos = self.field_val_pos;
                Err(self.syntax_error_at(pos, DecodeErrorKind::FieldValue { key, source }))
            }
            _ => match Value::parse_scalar(kind, self.rdr.slice(vspan)) {
                Ok(value) => Ok(Some((self.rdr.slice(kspan), value))),
                Err(source) => {
                    let key = self.rdr.slice(kspan).to_vec();
                    let pos = self.field_val_pos;
                    Err(self.syntax_error_at(pos, DecodeErrorKind::FieldValue { key, source }))
                }
            },
        }
    }

    fn next_field_spans(&mut self) -> Result<Option<(Span, ValueKind, Span)>, DecodeError> {
        if !self.advance_to_section(Section::Field)? {
            return Ok(None);
        }
        let key = self
            .rdr
            .take_esc(self.acceptors().field_key, &FIELD_KEY_ESCAPES);
        if key.is_empty() {
            if !self.rdr.ensure(1) {
                return Err(self.syntax_error(DecodeErrorKind::ExpectedFieldKey));
            }
            let found = self.rdr.at(0);
            return Err(self.syntax_error(DecodeErrorKind::InvalidFieldKeyStart(found)));
        }
        if !self.rdr.ensure(1) {
            let kind = DecodeErrorKind::EqualsAfterFieldKeyEof(self.rdr.slice(key).to_vec());
            return Err(self.syntax_error(kind));
        }
        if self.rdr.at(0) != b'=' {
            let kind = DecodeErrorKind::ExpectedEqualsAfterFieldKey {
                key: self.rdr.slice(key).to_vec(),
                found: self.rdr.at(0),
            };
            return Err(self.syntax_error(kind));
        }
        self.note_name_stats(key);
        self.rdr.advance(1);
        if !self.rdr.ensure(1) {
            return Err(self.syntax_error(DecodeErrorKind::MissingFieldValue));
        }
        self.field_val_pos = self.rdr.pos();
        let (kind, value) = match self.rdr.at(0) {
            b'"' => {
                self.rdr.advance(1);
                let value = self
                    .rdr
                    .take_esc(&FIELD_STRING_VAL_CHARS, &FIELD_STRING_VAL_ESCAPES);
                if !self.rdr.ensure(1) {
                    let pos = self.field_val_pos;
                    return Err(self.syntax_error_at(pos, DecodeErrorKind::UnterminatedString));
                }
                if self.rdr.at(0) != b'"' {
                    // Unreachable: every byte is allowed inside a string.
                    return Err(self.syntax_error(DecodeErrorKind::UnexpectedStringTermination));
                }
                self.rdr.advance(1);
                if !self.rdr.skipping && self.rdr.slice(value).contains(&b'\n') {
                    self.stats.record(Stat::StrLiteralNewline);
                }
                (ValueKind::String, value)
            }
            b't' | b'T' | b'f' | b'F' => (ValueKind::Bool, self.rdr.take(&FIELD_VAL_CHARS)),
            b'-' | b'.' | b'0'..=b'9' => {
                let value = self.rdr.take(&FIELD_VAL_CHARS);
                let last = {
                    let v = self.rdr.slice(value);
                    v[v.len() - 1]
                };
                match last {
                    b'i' => (ValueKind::Int, value.shrink_end(1)),
                    b'u' => (ValueKind::Uint, value.shrink_end(1)),
                    _ => (ValueKind::Float, value),
                }
            }
            _ if self.lax => {
                self.stats.record(Stat::UnknownFieldType);
                (ValueKind::Unknown, self.rdr.take(&FIELD_VAL_CHARS))
            }
            _ => return Err(self.syntax_error(DecodeErrorKind::UnrecognizedFieldType)),
        };
        if !self.rdr.ensure(1) {
            self.section = Section::End;
            return Ok(Some((key, kind, value)));
        }
        let next = self.rdr.at(0);
        if next == b',' {
            self.rdr.advance(1);
            return Ok(Some((key, kind, value)));
        }
        if !WHITESPACE.get(next) {
            return Err(self.syntax_error(DecodeErrorKind::UnexpectedCharAfterField(next)));
        }
        self.rdr.take(self.acceptors().field_separator);
        if self.take_eol() {
            self.section = Section::End;
        } else {
            self.section = Section::Time;
        }
        Ok(Some((key, kind, value)))
    }

    /// Returns the timestamp bytes of the entry, or `None` when it has no
    /// timestamp.
    pub fn time_bytes(&mut self) -> Result<Option<&[u8]>, DecodeError> {
        if !self.advance_to_section(Section::Time)? {
            return Ok(None);
        }
        let mark = self.rdr.mark();
        self.time_pos = self.rdr.pos();
        let span = self.rdr.take(&TIME_CHARS);
        let got_time = !span.is_empty();
        if !got_time {
            self.section = Section::End;
        }
        if !self.rdr.ensure(1) {
            self.section = Section::End;
            return Ok(got_time.then(|| self.rdr.slice(span)));
        }
        if !WHITESPACE.get(self.rdr.at(0)) {
            // Absorb the rest of the line so the message shows what stood
            // where the timestamp should have been.
            self.rdr.take(&NOT_EOL);
            let text = self.rdr.taken_since(mark).to_vec();
            let pos = self.time_pos;
            return Err(self.syntax_error_at(pos, DecodeErrorKind::InvalidTimestamp(text)));
        }
        self.rdr.take(self.acceptors().field_separator);
        if !self.rdr.ensure(1) {
            self.section = Section::End;
            return Ok(got_time.then(|| self.rdr.slice(span)));
        }
        if !self.take_eol() {
            let pos = self.rdr.pos();
            let extra = {
                let s = self.rdr.take(&NOT_EOL);
                self.rdr.slice(s).to_vec()
            };
            return Err(self.syntax_error_at(pos, DecodeErrorKind::TextAfterTimestamp(extra)));
        }
        self.section = Section::End;
        Ok(got_time.then(|| self.rdr.slice(span)))
    }

    /// Returns the entry's timestamp in nanoseconds, scaling a timestamp
    /// written at the given precision and range-checking the result.
    ///
    /// When the entry has no timestamp, returns `default` truncated to a
    /// whole tick of `prec`.
    pub fn time(&mut self, prec: Precision, default: Option<i64>) -> Result<Option<i64>, DecodeError> {
        let parsed = match self.time_bytes()? {
            None => return Ok(default.map(|d| prec.truncate_nanoseconds(d))),
            Some(data) => parse_timestamp(data),
        };
        // The line is already fully consumed, so unlike a syntax error
        // this must not trip the newline recovery state.
        match parsed {
            Err(e) => Err(self.error_at(self.time_pos, DecodeErrorKind::Timestamp(e))),
            Ok(ticks) => match prec.as_nanoseconds(ticks) {
                None => Err(self.error_at(
                    self.time_pos,
                    DecodeErrorKind::Timestamp(ValueError::OutOfRange),
                )),
                Some(ns) => Ok(Some(ns)),
            },
        }
    }

    // --------------------------------------------------------------------
    // Section plumbing
    // --------------------------------------------------------------------

    fn advance_to_section(&mut self, section: Section) -> Result<bool, DecodeError> {
        if self.section == section {
            return Ok(true);
        }
        if self.section > section {
            return Ok(false);
        }
        // Skipping elides unescape work for sections nobody will see.
        self.rdr.skipping = true;
        while self.section < section {
            if let Err(e) = self.consume_section() {
                self.rdr.skipping = false;
                return Err(e);
            }
        }
        self.rdr.skipping = false;
        Ok(true)
    }

    fn consume_section(&mut self) -> Result<(), DecodeError> {
        match self.section {
            Section::Measurement => self.measurement().map(|_| ()),
            Section::Tag => {
                while self.next_tag()?.is_some() {}
                Ok(())
            }
            Section::Field => {
                while self.next_field_spans()?.is_some() {}
                Ok(())
            }
            Section::Time => self.time_bytes().map(|_| ()),
            Section::Newline => {
                self.consume_line();
                Ok(())
            }
            Section::End => Ok(()),
        }
    }

    /// Consumes a comma after a measurement or tag value, requiring a tag
    /// key to follow it.
    fn advance_tag_comma(&mut self) -> Result<(), DecodeError> {
        if !self.rdr.ensure(1) || self.rdr.at(0) != b',' {
            return Ok(());
        }
        self.rdr.advance(1);
        if !self.rdr.ensure(1) {
            return Err(self.syntax_error(DecodeErrorKind::CommaThenEndOfInput));
        }
        if WHITESPACE.get(self.rdr.at(0)) {
            return Err(self.syntax_error(DecodeErrorKind::CommaThenWhitespace));
        }
        Ok(())
    }

    fn skip_blank_lines(&mut self) {
        loop {
            let start_line = self.rdr.mark();
            self.rdr.take(&FIELD_SEPARATOR_SPACE);
            match self.rdr.at(0) {
                b'\t' | 0x0c => {
                    // Tabs and form feeds only belong to blank lines; in
                    // front of content they are an error.
                    let mark = self.rdr.mark();
                    self.rdr.take(&BLANK_CHARS);
                    if !self.take_eol() {
                        self.rdr.r1 = self.rdr.r0 + mark;
                        return;
                    }
                }
                b'#' => {
                    self.stats.record(Stat::Comment);
                    self.rdr.take(&COMMENT_CHARS);
                    if !self.take_eol() {
                        // The comment holds an invalid character. Rewind to
                        // the start of the line so the measurement section
                        // reports the error there.
                        self.rdr.r1 = self.rdr.r0 + start_line;
                        return;
                    }
                }
                b'\n' => {
                    self.rdr.advance(1);
                    self.bump_line();
                }
                b'\r' => {
                    if !self.take_eol() {
                        // Solitary carriage return; the next section will
                        // report it.
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Consumes a line terminator: LF, CR LF, or end of input.
    fn take_eol(&mut self) -> bool {
        if !self.rdr.ensure(1) {
            return true;
        }
        match self.rdr.at(0) {
            b'\n' => {
                self.rdr.advance(1);
                self.bump_line();
                true
            }
            b'\r' => {
                if !self.rdr.ensure(2) {
                    // CR at end of input.
                    self.rdr.advance(1);
                    return true;
                }
                if self.rdr.at(1) == b'\n' {
                    self.rdr.advance(2);
                    self.bump_line();
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Reads an entire line regardless of content; the recovery path after
    /// a syntax error.
    fn consume_line(&mut self) {
        self.rdr.take(&NOT_NEWLINE);
        if self.rdr.at(0) == b'\n' {
            self.rdr.advance(1);
            self.bump_line();
        }
        self.rdr.reset();
        self.section = Section::End;
    }

    fn bump_line(&mut self) {
        self.line += 1;
        self.line_base = self.rdr.pos();
    }

    fn acceptors(&self) -> &'static Acceptors {
        if self.lax {
            &LAX_ACCEPTORS
        } else {
            &STRICT_ACCEPTORS
        }
    }

    fn note_name_stats(&mut self, name: Span) {
        if self.rdr.skipping {
            return;
        }
        let (quote, nonprint) = {
            let n = self.rdr.slice(name);
            (
                n.first() == Some(&b'"'),
                self.lax && n.iter().any(|&b| NON_PRINTABLE.get(b)),
            )
        };
        if quote {
            self.stats.record(Stat::QuoteAtStart);
        }
        if nonprint {
            self.stats.record(Stat::NonPrintable);
        }
    }

    // --------------------------------------------------------------------
    // Errors
    // --------------------------------------------------------------------

    fn error_at(&self, pos: usize, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            line: self.line,
            column: pos - self.line_base + 1,
            kind,
        }
    }

    fn syntax_error_at(&mut self, pos: usize, kind: DecodeErrorKind) -> DecodeError {
        // Recover by abandoning the rest of the line.
        self.section = Section::Newline;
        self.error_at(pos, kind)
    }

    fn syntax_error(&mut self, kind: DecodeErrorKind) -> DecodeError {
        self.syntax_error_at(self.rdr.pos(), kind)
    }
}

fn parse_timestamp(data: &[u8]) -> Result<i64, ValueError> {
    let s = core::str::from_utf8(data).map_err(|_| ValueError::InvalidSyntax)?;
    s.parse::<i64>().map_err(|e| match e.kind() {
        core::num::IntErrorKind::PosOverflow | core::num::IntErrorKind::NegOverflow => {
            ValueError::OutOfRange
        }
        _ => ValueError::InvalidSyntax,
    })
}
