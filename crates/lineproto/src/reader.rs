//! Buffered reading over a whole slice or an incremental pull source.
//!
//! The reader keeps three monotonically advancing indices into its buffer:
//! `r0 <= r1 <= buf.len()`. Bytes in `buf[r0..r1]` have been consumed but
//! are still addressable so that tokens can be returned without copying;
//! `buf[r1..]` is yet to be scanned. [`Reader::reset`] promotes `r1` to `r0`
//! and clears the escape scratch, invalidating previously returned spans.
//!
//! When reading from a pull source, the live window `[r0, len)` is slid to
//! the front of the buffer or the buffer is grown, but the window itself is
//! preserved bytewise between resets, so `r0`-relative span offsets stay
//! valid across reads.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::byteset::{ByteSet, Escaper};

/// The buffer is grown by at least this many bytes at a time.
const MIN_GROW: usize = 8192;
/// More data is read only into at least this much free space.
const MIN_READ: usize = MIN_GROW / 2;

/// The error type produced by a [`Source`].
pub type SourceError = Box<dyn core::error::Error + Send + Sync>;

/// An incremental byte source for the [`Decoder`](crate::Decoder).
///
/// `read` fills as much of `buf` as it likes and returns the number of
/// bytes written; `Ok(0)` signals end of input. Any `Err` ends decoding and
/// is reported by [`Decoder::err`](crate::Decoder::err).
///
/// With the `std` feature (on by default), every [`std::io::Read`]
/// implementor is a `Source`.
pub trait Source {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Source for R {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        std::io::Read::read(self, buf).map_err(|e| Box::new(e) as SourceError)
    }
}

/// A token produced by [`Reader::take`] or [`Reader::take_esc`].
///
/// Offsets in `Buf` are relative to `r0` so they survive buffer slides and
/// growth; `Esc` indexes the escape scratch. Spans stay resolvable until
/// the next [`Reader::reset`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum Span {
    Buf { start: usize, end: usize },
    Esc { start: usize, end: usize },
}

impl Span {
    pub(crate) fn is_empty(self) -> bool {
        match self {
            Span::Buf { start, end } | Span::Esc { start, end } => start == end,
        }
    }

    /// Drops the last `n` bytes, for trimming a type suffix off a token.
    pub(crate) fn shrink_end(self, n: usize) -> Span {
        match self {
            Span::Buf { start, end } => Span::Buf {
                start,
                end: end - n,
            },
            Span::Esc { start, end } => Span::Esc {
                start,
                end: end - n,
            },
        }
    }
}

enum Input<'a> {
    Slice(&'a [u8]),
    Stream { source: Box<dyn Source + 'a>, buf: Vec<u8> },
}

pub(crate) struct Reader<'a> {
    input: Input<'a>,
    pub(crate) r0: usize,
    pub(crate) r1: usize,
    /// Whether the buffer is known to hold all the data there is.
    pub(crate) complete: bool,
    /// When set, `take_esc` skips unescaping work; the caller is
    /// discarding the result.
    pub(crate) skipping: bool,
    esc: Vec<u8>,
    /// Offset of `buf[0]` within the overall input.
    base: usize,
    err: Option<SourceError>,
}

impl<'a> Reader<'a> {
    /// Adopts `data` as the whole input; no I/O will ever occur.
    pub(crate) fn from_slice(data: &'a [u8]) -> Reader<'a> {
        Reader {
            input: Input::Slice(data),
            r0: 0,
            r1: 0,
            complete: true,
            skipping: false,
            esc: Vec::with_capacity(512),
            base: 0,
            err: None,
        }
    }

    /// Reads incrementally from `source`.
    pub(crate) fn from_source(source: Box<dyn Source + 'a>) -> Reader<'a> {
        Reader {
            input: Input::Stream {
                source,
                buf: Vec::new(),
            },
            r0: 0,
            r1: 0,
            complete: false,
            skipping: false,
            esc: Vec::with_capacity(512),
            base: 0,
            err: None,
        }
    }

    #[inline]
    fn buf(&self) -> &[u8] {
        match &self.input {
            Input::Slice(s) => s,
            Input::Stream { buf, .. } => buf,
        }
    }

    #[inline]
    pub(crate) fn buf_len(&self) -> usize {
        self.buf().len()
    }

    #[inline]
    fn byte(&self, i: usize) -> u8 {
        self.buf()[i]
    }

    /// The absolute position of the read point within the overall input.
    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.base + self.r1
    }

    /// The read point relative to `r0`, for later use with
    /// [`Reader::taken_since`].
    #[inline]
    pub(crate) fn mark(&self) -> usize {
        self.r1 - self.r0
    }

    /// The raw bytes consumed since `mark`, escapes and all.
    pub(crate) fn taken_since(&self, mark: usize) -> &[u8] {
        &self.buf()[self.r0 + mark..self.r1]
    }

    /// Resolves a span to its bytes.
    pub(crate) fn slice(&self, span: Span) -> &[u8] {
        match span {
            Span::Buf { start, end } => &self.buf()[self.r0 + start..self.r0 + end],
            Span::Esc { start, end } => &self.esc[start..end],
        }
    }

    pub(crate) fn err(&self) -> Option<&SourceError> {
        self.err.as_ref()
    }

    /// Reports whether at least `n` bytes are available at the read point,
    /// pulling from the source as needed.
    #[inline]
    pub(crate) fn ensure(&mut self, n: usize) -> bool {
        if self.r1 + n <= self.buf_len() {
            return true;
        }
        self.ensure_slow(n)
    }

    fn ensure_slow(&mut self, n: usize) -> bool {
        loop {
            if self.complete {
                return false;
            }
            self.read_more();
            if self.r1 + n <= self.buf_len() {
                return true;
            }
        }
    }

    fn read_more(&mut self) {
        if self.complete {
            return;
        }
        let Input::Stream { source, buf } = &mut self.input else {
            return;
        };
        let spare = buf.capacity() - buf.len();
        if spare < MIN_READ {
            if self.r0 + spare >= MIN_READ {
                // Sliding the live window to the front regains enough room.
                buf.copy_within(self.r0.., 0);
                buf.truncate(buf.len() - self.r0);
                self.base += self.r0;
                self.r1 -= self.r0;
                self.r0 = 0;
            } else {
                // Grow. The discarded prefix buf[..r0] is not copied.
                let used = buf.len() - self.r0;
                let mut cap = buf.capacity() * 2;
                if cap - used < MIN_GROW {
                    cap = used + MIN_GROW;
                }
                let mut grown = Vec::with_capacity(cap);
                grown.extend_from_slice(&buf[self.r0..]);
                *buf = grown;
                self.base += self.r0;
                self.r1 -= self.r0;
                self.r0 = 0;
            }
        }
        let len = buf.len();
        buf.resize(buf.capacity(), 0);
        match source.read(&mut buf[len..]) {
            Ok(0) => {
                buf.truncate(len);
                self.complete = true;
            }
            Ok(n) => {
                let n = n.min(buf.len() - len);
                buf.truncate(len + n);
            }
            Err(e) => {
                buf.truncate(len);
                self.err = Some(e);
                self.complete = true;
            }
        }
    }

    /// Consumes the maximal prefix of bytes satisfying `set`, reading more
    /// data as needed, and returns it as a span.
    pub(crate) fn take(&mut self, set: &ByteSet) -> Span {
        let start = self.mark();
        loop {
            if !self.ensure(1) {
                break;
            }
            let (stop, len) = {
                let buf = self.buf();
                (
                    buf[self.r1..].iter().position(|&c| !set.get(c)),
                    buf.len(),
                )
            };
            match stop {
                Some(i) => {
                    self.r1 += i;
                    break;
                }
                None => self.r1 = len,
            }
        }
        Span::Buf {
            start,
            end: self.mark(),
        }
    }

    /// Like [`Reader::take`], but a backslash followed by a byte the
    /// escaper recognizes extends the run and contributes the unescaped
    /// byte. The unescaped result lives in the scratch buffer only if an
    /// escape actually occurred; otherwise the span aliases the input.
    ///
    /// A backslash before an unrecognized byte, or dangling at end of
    /// input, is passed through literally. With `skipping` set, no
    /// unescape work happens and the span covers the raw bytes.
    pub(crate) fn take_esc(&mut self, set: &ByteSet, escaper: &Escaper) -> Span {
        let start = self.mark();
        // Start, relative to r0, of the most recent segment that has not
        // been copied to the scratch buffer yet.
        let mut start_unesc = start;
        let esc_start = self.esc.len();
        'outer: loop {
            if !self.ensure(1) {
                break;
            }
            // i is relative to r1 so it survives buffer slides in ensure.
            let mut i = 0;
            loop {
                if self.r1 + i >= self.buf_len() {
                    self.r1 += i;
                    continue 'outer;
                }
                let c = self.byte(self.r1 + i);
                if c != b'\\' {
                    if !set.get(c) {
                        self.r1 += i;
                        break 'outer;
                    }
                    i += 1;
                    continue;
                }
                if self.r1 + i + 1 >= self.buf_len() && !self.ensure(i + 2) {
                    // Nothing to escape; the backslash stays intact.
                    self.r1 = self.buf_len();
                    break 'outer;
                }
                let replacement = escaper.unescape(self.byte(self.r1 + i + 1));
                if replacement == 0 {
                    i += 1;
                    continue;
                }
                if !self.skipping {
                    let from = self.r0 + start_unesc;
                    let to = self.r1 + i;
                    self.push_esc_range(from, to);
                    self.esc.push(replacement);
                    start_unesc = self.r1 - self.r0 + i + 2;
                }
                i += 2;
            }
        }
        if self.esc.len() > esc_start {
            let from = self.r0 + start_unesc;
            let to = self.r1;
            self.push_esc_range(from, to);
            Span::Esc {
                start: esc_start,
                end: self.esc.len(),
            }
        } else {
            Span::Buf {
                start,
                end: self.mark(),
            }
        }
    }

    fn push_esc_range(&mut self, from: usize, to: usize) {
        match &self.input {
            Input::Slice(s) => self.esc.extend_from_slice(&s[from..to]),
            Input::Stream { buf, .. } => self.esc.extend_from_slice(&buf[from..to]),
        }
    }

    /// The byte `i` places beyond the read point, or zero past the end.
    /// The caller is expected to have called `ensure` first.
    #[inline]
    pub(crate) fn at(&self, i: usize) -> u8 {
        let buf = self.buf();
        if self.r1 + i < buf.len() {
            buf[self.r1 + i]
        } else {
            0
        }
    }

    /// Moves the read point over `n` known-buffered bytes.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.r1 + n <= self.buf_len());
        self.r1 += n;
    }

    /// Discards everything before the read point and clears the escape
    /// scratch. Spans handed out earlier are no longer resolvable.
    pub(crate) fn reset(&mut self) {
        if self.r1 == self.buf_len() {
            // The buffer is drained; restart it from the front for better
            // cache behaviour.
            if let Input::Stream { buf, .. } = &mut self.input {
                self.base += self.r1;
                buf.clear();
                self.r1 = 0;
            }
        }
        self.r0 = self.r1;
        self.esc.clear();
    }
}
