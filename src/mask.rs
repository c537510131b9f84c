//! Fixed-width bit-sets over calendar field indices, plus the nearest-set-bit
//! matcher the resolver is built on.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A bit-set where bit `i` means index `i` of a field's period is permitted.
///
/// Which indices are meaningful depends on the field: 12 for months, 7 for
/// weekdays, 24 for hours, up to 31 for month-days and custom periods. Width
/// is checked by [`Recurrence::validate`](crate::Recurrence::validate), not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitMask(u32);

impl BitMask {
    /// Widest period any field can use (month-days and custom periods).
    pub const MAX_WIDTH: u8 = 31;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Build a mask from individual indices. Indices past bit 31 are ignored.
    pub fn of(indices: &[u8]) -> Self {
        let mut bits = 0u32;
        for &i in indices {
            if i < 32 {
                bits |= 1 << i;
            }
        }
        Self(bits)
    }

    pub const fn contains(self, index: u8) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    /// True when every set bit lies below `width`.
    pub const fn fits_width(self, width: u8) -> bool {
        width >= 32 || self.0 >> width == 0
    }

    /// Iterate over set bit indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..32).filter(move |&i| self.contains(i))
    }
}

impl fmt::Display for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (n, i) in self.iter().enumerate() {
            if n > 0 {
                write!(f, ",")?;
            }
            write!(f, "{i}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<u8> for BitMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut bits = 0u32;
        for i in iter {
            if i < 32 {
                bits |= 1 << i;
            }
        }
        Self(bits)
    }
}

#[cfg(feature = "serde")]
impl Serialize for BitMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BitMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let indices = Vec::<u8>::deserialize(deserializer)?;
        for &i in &indices {
            if i >= 32 {
                return Err(serde::de::Error::custom(format!(
                    "bit index {i} out of range [0,31]"
                )));
            }
        }
        Ok(indices.into_iter().collect())
    }
}

/// How [`find_next`] walks a field's period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Scan `[start, period)` only. A miss means the rest of this period
    /// holds no match.
    Forward,
    /// Scan all `period` indices starting at `start`, wrapping past the
    /// boundary. A matched index below `start` tells the caller the match
    /// spilled into the next period.
    Wrapping,
}

/// Find the nearest set bit at or after `start` within a period of `period`
/// indices.
///
/// Returns `(matched_index, distance_from_start)`. The mask must already be
/// validated as non-zero and within `period` bits; no validation happens
/// here.
pub fn find_next(mask: BitMask, start: u8, period: u8, scan: Scan) -> Option<(u8, u8)> {
    match scan {
        Scan::Forward => (start..period)
            .find(|&i| mask.contains(i))
            .map(|i| (i, i - start)),
        Scan::Wrapping => (0..period)
            .map(|distance| ((start + distance) % period, distance))
            .find(|&(bit, _)| mask.contains(bit)),
    }
}
