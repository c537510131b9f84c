//! The recurrence data model: immutable field specs built by the caller.
//!
//! Every field is a two-variant type (`Any` versus a concrete mask or value)
//! rather than a sentinel integer, so "unconstrained" is explicit in the type
//! and range checks stay exhaustive.

use jiff::civil::Date;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;
use crate::mask::{find_next, BitMask, Scan};

/// jiff's supported civil year range.
const MIN_YEAR: i16 = -9999;
const MAX_YEAR: i16 = 9999;

/// Year constraint: unconstrained, or one specific absolute year.
///
/// Unlike the masked fields, year never wraps; an explicit year behind the
/// reference instant means no future occurrence exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum YearSpec {
    #[default]
    Any,
    In(i16),
}

/// A masked calendar field: unconstrained, or a bit-set of permitted indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MaskSpec {
    #[default]
    Any,
    Only(BitMask),
}

impl MaskSpec {
    /// Build a masked spec from permitted indices.
    pub fn of(indices: &[u8]) -> Self {
        Self::Only(BitMask::of(indices))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Matcher entry point: `Any` matches `start` itself at distance zero,
    /// otherwise defer to [`find_next`].
    pub fn next_match(&self, start: u8, period: u8, scan: Scan) -> Option<(u8, u8)> {
        match self {
            Self::Any => Some((start, 0)),
            Self::Only(mask) => find_next(*mask, start, period, scan),
        }
    }
}

/// Minute constraint: unconstrained, or one specific minute of the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MinuteSpec {
    #[default]
    Any,
    At(i8),
}

/// A repeating cycle of `period` days anchored at a fixed calendar date.
///
/// Bit `i` of `days` permits day `i` of the cycle; the anchor date is day 0.
/// A week is just a custom period with `period == 7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomPeriod {
    pub days: MaskSpec,
    /// Cycle length in days, `[1,31]` (the mask's bit-width bound).
    pub period: i8,
    /// First day of the cycle. Valid by construction as a jiff civil date.
    pub anchor: Date,
}

/// Bit-mask recurrence over calendar fields.
///
/// All fields are caller-constructed and never mutated by resolution, so a
/// single value is safely shared and reused across concurrent requests.
///
/// At least one of `month_days`, `week_days`, `custom` must be present; the
/// default value is invalid until one is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recurrence {
    pub year: YearSpec,
    /// 12-bit mask, bit 0 = January.
    pub months: MaskSpec,
    /// 31-bit mask, bit 0 = day 1 of the month. `None` means unused.
    pub month_days: Option<MaskSpec>,
    /// 7-bit mask, bit 0 = Monday. `None` means unused.
    pub week_days: Option<MaskSpec>,
    /// 24-bit mask, bit 0 = hour 0.
    pub hours: MaskSpec,
    pub minute: MinuteSpec,
    pub custom: Option<CustomPeriod>,
}

impl Recurrence {
    /// Check the structural invariants of this spec.
    ///
    /// Run automatically at the start of every resolution; exposed so callers
    /// can reject bad specs at construction time instead.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        if let YearSpec::In(year) = self.year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(RecurrenceError::validation(
                    "year",
                    format!("{year} is outside [{MIN_YEAR},{MAX_YEAR}]"),
                ));
            }
        }

        check_mask("month", &self.months, 12)?;
        check_mask("hour", &self.hours, 24)?;

        if let MinuteSpec::At(minute) = self.minute {
            if !(0..=59).contains(&minute) {
                return Err(RecurrenceError::validation(
                    "minute",
                    format!("{minute} is outside [0,59]"),
                ));
            }
        }

        if self.month_days.is_none() && self.week_days.is_none() && self.custom.is_none() {
            return Err(RecurrenceError::validation(
                "day",
                "at least one of month_days, week_days, custom must be set",
            ));
        }

        if let Some(month_days) = &self.month_days {
            check_mask("month_day", month_days, BitMask::MAX_WIDTH)?;
        }
        if let Some(week_days) = &self.week_days {
            check_mask("week_day", week_days, 7)?;
        }

        if let Some(custom) = &self.custom {
            if !(1..=BitMask::MAX_WIDTH as i8).contains(&custom.period) {
                return Err(RecurrenceError::validation(
                    "custom_period",
                    format!("period {} is outside [1,{}]", custom.period, BitMask::MAX_WIDTH),
                ));
            }
            check_mask("custom_period", &custom.days, custom.period as u8)?;
        }

        Ok(())
    }
}

fn check_mask(field: &'static str, spec: &MaskSpec, width: u8) -> Result<(), RecurrenceError> {
    if let MaskSpec::Only(mask) = spec {
        if mask.is_empty() {
            return Err(RecurrenceError::validation(field, "mask has no bits set"));
        }
        if !mask.fits_width(width) {
            return Err(RecurrenceError::validation(
                field,
                format!("mask {mask} sets bits outside [0,{width})"),
            ));
        }
    }
    Ok(())
}
