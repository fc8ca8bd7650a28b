//! Timestamp precision scales.

use core::fmt;

/// The scale at which a line-protocol timestamp is written.
///
/// A timestamp on the wire is an integer count of ticks at some precision;
/// the codec itself always works in nanoseconds and scales at the edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    #[default]
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl Precision {
    /// The number of nanoseconds in one tick at this precision.
    #[must_use]
    pub fn tick_nanoseconds(self) -> i64 {
        match self {
            Precision::Nanosecond => 1,
            Precision::Microsecond => 1_000,
            Precision::Millisecond => 1_000_000,
            Precision::Second => 1_000_000_000,
        }
    }

    /// Scales a count of ticks at this precision to nanoseconds.
    ///
    /// Returns `None` when the scaled value does not fit in a signed 64-bit
    /// nanosecond count.
    #[must_use]
    pub fn as_nanoseconds(self, ticks: i64) -> Option<i64> {
        if self == Precision::Nanosecond {
            return Some(ticks);
        }
        ticks.checked_mul(self.tick_nanoseconds())
    }

    /// Rounds a nanosecond timestamp down to a whole tick at this precision.
    #[must_use]
    pub fn truncate_nanoseconds(self, ns: i64) -> i64 {
        ns - ns.rem_euclid(self.tick_nanoseconds())
    }

    /// The number of whole ticks at this precision in a nanosecond
    /// timestamp, rounding down.
    pub(crate) fn ticks_in(self, ns: i64) -> i64 {
        ns.div_euclid(self.tick_nanoseconds())
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Nanosecond => "ns",
            Precision::Microsecond => "µs",
            Precision::Millisecond => "ms",
            Precision::Second => "s",
        })
    }
}
