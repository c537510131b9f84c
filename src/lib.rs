//! cronbit — bit-mask recurrence specs with a carry-propagating
//! next-occurrence resolver.
//!
//! A [`Recurrence`] describes allowed years, months, days (by day of month,
//! day of week, and/or a custom N-day cycle), hours, and a minute as bit
//! masks and explicit `Any`/value pairs. Resolution finds the next civil
//! instant at or after a reference date-time that satisfies every field,
//! along with its distance in minutes, or reports that no future instant
//! exists.
//!
//! # Examples
//!
//! ```
//! use cronbit::{MaskSpec, MinuteSpec, Recurrence};
//! use jiff::civil::datetime;
//!
//! // 06:30, 12:30, 18:30 and 23:30, every day.
//! let spec = Recurrence {
//!     month_days: Some(MaskSpec::Any),
//!     hours: MaskSpec::of(&[6, 12, 18, 23]),
//!     minute: MinuteSpec::At(30),
//!     ..Recurrence::default()
//! };
//!
//! let next = spec
//!     .next_from(datetime(2025, 1, 5, 20, 20, 0, 0))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(next.datetime(), datetime(2025, 1, 5, 23, 30, 0, 0));
//! assert_eq!(next.distance_minutes, 190);
//! ```

pub mod calendar;
pub mod display;
pub mod error;
pub mod mask;
pub mod resolve;
pub mod spec;

pub use error::RecurrenceError;
pub use mask::{find_next, BitMask, Scan};
pub use resolve::{Occurrence, Occurrences};
pub use spec::{CustomPeriod, MaskSpec, MinuteSpec, Recurrence, YearSpec};

use jiff::civil::DateTime;

// --- Recurrence convenience methods ---

impl Recurrence {
    /// Compute the next occurrence at or after `since`.
    ///
    /// `Ok(None)` means the spec has no future occurrence (an explicit year
    /// bound behind the reference); errors are structural problems with the
    /// spec itself.
    pub fn next_from(&self, since: DateTime) -> Result<Option<Occurrence>, RecurrenceError> {
        resolve::next_from(self, since)
    }

    /// Compute up to `n` occurrences starting at `since`, each measured one
    /// minute past its predecessor.
    pub fn next_n_from(
        &self,
        since: DateTime,
        n: usize,
    ) -> Result<Vec<Occurrence>, RecurrenceError> {
        self.occurrences(since).take(n).collect()
    }

    /// Lazy iterator over future occurrences starting at `since`.
    pub fn occurrences(&self, since: DateTime) -> Occurrences<'_> {
        Occurrences::new(self, since)
    }
}
