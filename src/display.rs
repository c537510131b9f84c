//! Human-readable rendering of specs and occurrences.

use std::fmt;

use crate::resolve::Occurrence;
use crate::spec::{MaskSpec, MinuteSpec, Recurrence, YearSpec};

impl fmt::Display for MaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Only(mask) => write!(f, "{mask}"),
        }
    }
}

impl fmt::Display for YearSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::In(year) => write!(f, "{year}"),
        }
    }
}

impl fmt::Display for MinuteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::At(minute) => write!(f, "{minute}"),
        }
    }
}

/// Compact field summary, e.g.
/// `year 2025, months {0,1}, week days {0,2,4}, hours {6,12,18,23}, minute 30`.
///
/// Unused day selectors are omitted; masks print set bit indices, so months
/// and days appear zero-based here just as they are configured.
impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year {}, months {}", self.year, self.months)?;
        if let Some(month_days) = &self.month_days {
            write!(f, ", month days {month_days}")?;
        }
        if let Some(week_days) = &self.week_days {
            write!(f, ", week days {week_days}")?;
        }
        if let Some(custom) = &self.custom {
            write!(
                f,
                ", cycle days {} of {} from {}",
                custom.days, custom.period, custom.anchor
            )?;
        }
        write!(f, ", hours {}, minute {}", self.hours, self.minute)
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02} (+{} minutes)",
            self.year, self.month, self.day, self.hour, self.minute, self.distance_minutes
        )
    }
}
