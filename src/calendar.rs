//! Pure Gregorian calendar arithmetic used by the resolver.
//!
//! `jiff` supplies the civil types; the day-difference and period-phase
//! computations the resolver depends on live here as plain functions so their
//! exact semantics (half-open signed differences, Euclidean phase) are pinned
//! by this crate's own tests.

use jiff::civil::{Date, DateTime};

const MONTH_DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap rule: every fourth year, except centuries not divisible by
/// 400.
pub fn is_leap_year(year: i16) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Days in month `month0` (0 = January) of `year`.
///
/// An out-of-range month index clamps to `[0,11]`; validated input never
/// takes that path.
pub fn days_in_month(year: i16, month0: i8) -> i8 {
    let m = month0.clamp(0, 11) as usize;
    if m == 1 && is_leap_year(year) {
        29
    } else {
        MONTH_DAYS[m]
    }
}

fn year_len(year: i16) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Days elapsed in the year up to and including `date`.
fn elapsed_days_in_year(date: Date) -> i64 {
    let mut days = 0i64;
    for m in 0..date.month() - 1 {
        days += days_in_month(date.year(), m) as i64;
    }
    days + date.day() as i64
}

/// Whole-year day count over `[start_year, end_year)`.
fn days_among_years(start_year: i16, end_year: i16) -> i64 {
    (start_year..end_year).map(year_len).sum()
}

/// Signed day count over the half-open interval `(start, end]`.
///
/// `diff_days(d, d) == 0` and `diff_days(d, d + 1 day) == 1`; the result is
/// negated when `end` precedes `start`.
pub fn diff_days(start: Date, end: Date) -> i64 {
    match end.year() - start.year() {
        0 => elapsed_days_in_year(end) - elapsed_days_in_year(start),
        d if d > 0 => {
            (year_len(start.year()) - elapsed_days_in_year(start))
                + days_among_years(start.year() + 1, end.year())
                + elapsed_days_in_year(end)
        }
        _ => -diff_days(end, start),
    }
}

/// Minutes from `start` to `end`.
///
/// The resolver only calls this with `end >= start`, once a result is pinned.
pub fn diff_minutes(start: DateTime, end: DateTime) -> i64 {
    diff_days(start.date(), end.date()).abs() * 1440
        + (end.hour() as i64 * 60 + end.minute() as i64)
        - (start.hour() as i64 * 60 + start.minute() as i64)
}

/// Index of `date` within a repeating `period`-day cycle anchored at
/// `anchor`, always in `[0, period)` even when `date` precedes the anchor.
pub fn period_phase(anchor: Date, date: Date, period: i8) -> i8 {
    // rem_euclid, not %: a truncating modulo goes negative for dates before
    // the anchor.
    diff_days(anchor, date).rem_euclid(period as i64) as i8
}

/// First day of the month after `(year, month)`, month in `[1,12]`.
pub(crate) fn first_of_next_month(year: i16, month: i8) -> (i16, i8) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
