//! Constant-time byte classification and escape substitution tables.
//!
//! A [`ByteSet`] is a 256-bit predicate packed into four 64-bit words; the
//! lexer asks it one question, [`ByteSet::get`], on every input byte, so it
//! has to stay branch-free and cache-resident. An [`Escaper`] is a pair of
//! 256-byte maps describing the single-character backslash escapes of one
//! lexical context: `table` maps a raw byte to the character written after a
//! backslash, `rev_table` is its inverse for decoding.
//!
//! All the concrete sets and escapers used by the codec are defined at the
//! bottom of this module; they are built in const context so the tables live
//! in rodata.

/// A set of byte values, queryable in constant time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteSet([u64; 4]);

impl ByteSet {
    /// Returns the set holding exactly the bytes of `bytes`.
    pub(crate) const fn of(bytes: &[u8]) -> Self {
        let mut set = ByteSet([0; 4]);
        let mut i = 0;
        while i < bytes.len() {
            set = set.with(bytes[i]);
            i += 1;
        }
        set
    }

    /// Returns the set holding every byte in `lo..=hi`.
    pub(crate) const fn range(lo: u8, hi: u8) -> Self {
        let mut set = ByteSet([0; 4]);
        let mut b = lo;
        loop {
            set = set.with(b);
            if b == hi {
                break;
            }
            b += 1;
        }
        set
    }

    const fn with(mut self, b: u8) -> Self {
        self.0[(b >> 6) as usize] |= 1 << (b & 63);
        self
    }

    /// Reports whether the set holds `b`.
    #[inline(always)]
    pub(crate) fn get(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] & (1 << (b & 63)) != 0
    }

    /// Returns the union of `self` and `other`.
    pub(crate) const fn union(self, other: Self) -> Self {
        let mut r = self;
        let mut i = 0;
        while i < 4 {
            r.0[i] |= other.0[i];
            i += 1;
        }
        r
    }

    /// Returns every byte not in `self`.
    pub(crate) const fn invert(self) -> Self {
        let mut r = self;
        let mut i = 0;
        while i < 4 {
            r.0[i] = !r.0[i];
            i += 1;
        }
        r
    }

    /// Returns `self` minus the bytes of `other`.
    pub(crate) const fn without(self, other: Self) -> Self {
        let mut r = self;
        let mut i = 0;
        while i < 4 {
            r.0[i] &= !other.0[i];
            i += 1;
        }
        r
    }
}

/// The single-character escapes of one lexical context.
pub(crate) struct Escaper {
    /// Maps a raw byte to the byte written after a backslash to escape it.
    /// Zero means the byte is not escaped in this context.
    table: [u8; 256],
    /// Maps an escape character back to the byte it stands for.
    rev_table: [u8; 256],
}

impl Escaper {
    /// Builds the escaper for the given escapable bytes. Control characters
    /// take their conventional text form (`\t`, `\n`, `\f`, `\r`); any other
    /// byte is escaped as itself after the backslash.
    pub(crate) const fn new(escapes: &[u8]) -> Self {
        let mut table = [0u8; 256];
        let mut rev_table = [0u8; 256];
        let mut i = 0;
        while i < escapes.len() {
            let b = escapes[i];
            let printable = match b {
                b'\t' => b't',
                b'\n' => b'n',
                0x0c => b'f',
                b'\r' => b'r',
                _ => b,
            };
            table[b as usize] = printable;
            rev_table[printable as usize] = b;
            i += 1;
        }
        Escaper { table, rev_table }
    }

    /// The byte that `escaped` stands for after a backslash, or zero if
    /// `\escaped` is not an escape sequence in this context.
    #[inline(always)]
    pub(crate) fn unescape(&self, escaped: u8) -> u8 {
        self.rev_table[escaped as usize]
    }

    /// Appends `src` to `buf` with every escapable byte backslash-escaped.
    pub(crate) fn append_escaped(&self, buf: &mut alloc::vec::Vec<u8>, src: &[u8]) {
        buf.reserve(src.len());
        for &b in src {
            let r = self.table[b as usize];
            if r != 0 {
                buf.push(b'\\');
                buf.push(r);
            } else {
                buf.push(b);
            }
        }
    }
}

// ------------------------------------------------------------------------
// Context tables
// ------------------------------------------------------------------------

pub(crate) const NON_PRINTABLE: ByteSet = ByteSet::range(0, 31).union(ByteSet::of(b"\x7f"));
pub(crate) const EOL_CHARS: ByteSet = ByteSet::of(b"\r\n");
pub(crate) const NOT_EOL: ByteSet = EOL_CHARS.invert();
pub(crate) const NOT_NEWLINE: ByteSet = ByteSet::of(b"\n").invert();

/// The separator between the tag, field and timestamp sections.
pub(crate) const FIELD_SEPARATOR_SPACE: ByteSet = ByteSet::of(b" ");
/// The legacy format also separated sections with tab, CR and form feed;
/// lax decoding honors that.
pub(crate) const LAX_FIELD_SEPARATOR_SPACE: ByteSet = ByteSet::of(b" \t\r\x0c");
/// Bytes a blank line may carry before its terminator.
pub(crate) const BLANK_CHARS: ByteSet = ByteSet::of(b" \t\x0c");
pub(crate) const WHITESPACE: ByteSet = FIELD_SEPARATOR_SPACE.union(EOL_CHARS);

pub(crate) const MEASUREMENT_CHARS: ByteSet =
    ByteSet::of(b", ").union(NON_PRINTABLE).invert();
pub(crate) const TAG_KEY_CHARS: ByteSet = ByteSet::of(b",= ").union(NON_PRINTABLE).invert();
pub(crate) const TAG_VAL_CHARS: ByteSet = ByteSet::of(b",=").union(WHITESPACE).invert();
pub(crate) const FIELD_KEY_CHARS: ByteSet = TAG_KEY_CHARS;
pub(crate) const FIELD_STRING_VAL_CHARS: ByteSet = ByteSet::of(b"\"").invert();
pub(crate) const FIELD_VAL_CHARS: ByteSet = ByteSet::of(b",").union(WHITESPACE).invert();
pub(crate) const TIME_CHARS: ByteSet = ByteSet::of(b"-0123456789");
/// Comment bodies accept printable bytes plus tab.
pub(crate) const COMMENT_CHARS: ByteSet = NON_PRINTABLE
    .invert()
    .without(EOL_CHARS)
    .union(ByteSet::of(b"\t"));

// Lax decoding admits non-printable and high bytes in names, but the
// structural characters, legacy separators and line terminators still end
// a token in every mode.
pub(crate) const LAX_MEASUREMENT_CHARS: ByteSet = ByteSet::of(b",")
    .union(LAX_FIELD_SEPARATOR_SPACE)
    .union(EOL_CHARS)
    .invert();
pub(crate) const LAX_TAG_KEY_CHARS: ByteSet = ByteSet::of(b",=")
    .union(LAX_FIELD_SEPARATOR_SPACE)
    .union(EOL_CHARS)
    .invert();

pub(crate) static MEASUREMENT_ESCAPES: Escaper = Escaper::new(b" ,");
pub(crate) static TAG_KEY_ESCAPES: Escaper = Escaper::new(b",= ");
pub(crate) static TAG_VAL_ESCAPES: Escaper = Escaper::new(b", =");
pub(crate) static FIELD_KEY_ESCAPES: Escaper = Escaper::new(b",= ");
pub(crate) static FIELD_STRING_VAL_ESCAPES: Escaper = Escaper::new(b"\\\"");
