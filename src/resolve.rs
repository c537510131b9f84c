//! The cascading resolver.
//!
//! Resolution pins year, month, day, hour, and minute in that order, each
//! step either descending to the next finer field or carrying back to a
//! coarser one when the finer field has no match left in the current period.
//! The machine is a tagged [`State`] value driven by a plain loop: each
//! transition consumes the current state and produces the next, a success, or
//! an "out of future occurrences" terminal.

use jiff::civil::{Date, DateTime};
use jiff::Span;
use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calendar::{self, diff_minutes};
use crate::error::RecurrenceError;
use crate::mask::{find_next, Scan};
use crate::spec::{MaskSpec, MinuteSpec, Recurrence, YearSpec};

/// One resolved future instant, plus its distance from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Occurrence {
    pub year: i16,
    /// `[1,12]`
    pub month: i8,
    /// `[1,31]`
    pub day: i8,
    /// `[0,23]`
    pub hour: i8,
    /// `[0,59]`
    pub minute: i8,
    /// Minutes elapsed from the reference instant to this occurrence.
    pub distance_minutes: i64,
}

impl Occurrence {
    /// The occurrence as a civil datetime.
    ///
    /// # Panics
    ///
    /// Panics if the fields do not form a valid civil datetime. Resolver
    /// output always does; a hand-constructed value may not.
    pub fn datetime(&self) -> DateTime {
        DateTime::new(self.year, self.month, self.day, self.hour, self.minute, 0, 0)
            .expect("resolved fields form a valid civil datetime")
    }
}

/// Which field gets pinned next, with that field's search lower bound and
/// from-scratch flag.
///
/// From-scratch means a coarser field already advanced past the reference, so
/// this field (and everything finer) restarts at index 0 of its own period
/// instead of being bounded below by the reference instant.
#[derive(Debug, Clone, Copy)]
enum State {
    Year {
        since_year: i16,
        /// `None` only on the initial dispatch; carries always force `true`.
        from_scratch: Option<bool>,
    },
    Month {
        since_index: i8,
        from_scratch: bool,
    },
    Day {
        since_index: i8,
        from_scratch: bool,
    },
    Hour {
        since_index: i8,
        from_scratch: bool,
    },
    Minute {
        since_minute: i8,
        from_scratch: bool,
    },
}

/// Outcome of one transition.
enum Flow {
    Next(State),
    Found,
    /// The explicit year bound lies behind the search point: no future match.
    Exhausted,
}

/// Mutable in-flight context, created fresh per resolution request.
struct Resolver<'a> {
    spec: &'a Recurrence,
    since: DateTime,
    year: i16,
    month: i8,
    day: i8,
    hour: i8,
    minute: i8,
}

pub(crate) fn next_from(
    spec: &Recurrence,
    since: DateTime,
) -> Result<Option<Occurrence>, RecurrenceError> {
    spec.validate()?;
    Resolver {
        spec,
        since,
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
    }
    .run()
}

impl Resolver<'_> {
    fn run(&mut self) -> Result<Option<Occurrence>, RecurrenceError> {
        let mut state = State::Year {
            since_year: self.since.year(),
            from_scratch: None,
        };
        loop {
            trace!("step {state:?}");
            match self.step(state)? {
                Flow::Next(next) => state = next,
                Flow::Found => return Ok(Some(self.finish())),
                Flow::Exhausted => return Ok(None),
            }
        }
    }

    fn step(&mut self, state: State) -> Result<Flow, RecurrenceError> {
        match state {
            State::Year {
                since_year,
                from_scratch,
            } => self.year_step(since_year, from_scratch),
            State::Month {
                since_index,
                from_scratch,
            } => self.month_step(since_index, from_scratch),
            State::Day {
                since_index,
                from_scratch,
            } => self.day_step(since_index, from_scratch),
            State::Hour {
                since_index,
                from_scratch,
            } => self.hour_step(since_index, from_scratch),
            State::Minute {
                since_minute,
                from_scratch,
            } => self.minute_step(since_minute, from_scratch),
        }
    }

    fn finish(&self) -> Occurrence {
        let resolved = DateTime::new(self.year, self.month, self.day, self.hour, self.minute, 0, 0)
            .expect("resolved fields form a valid civil datetime");
        let distance_minutes = diff_minutes(self.since, resolved);
        trace!("resolved {resolved} at distance {distance_minutes} minutes");
        Occurrence {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            distance_minutes,
        }
    }

    // Descent helpers: entering a finer field from a pinned coarser one. A
    // from-scratch descent starts at index 0 of the finer period; otherwise
    // the reference instant's own value is the lower bound.

    fn month_entry(&self, from_scratch: bool) -> State {
        State::Month {
            since_index: if from_scratch { 0 } else { self.since.month() - 1 },
            from_scratch,
        }
    }

    fn day_entry(&self, from_scratch: bool) -> State {
        State::Day {
            since_index: if from_scratch { 0 } else { self.since.day() - 1 },
            from_scratch,
        }
    }

    fn hour_entry(&self, from_scratch: bool) -> State {
        State::Hour {
            since_index: if from_scratch { 0 } else { self.since.hour() },
            from_scratch,
        }
    }

    fn year_step(
        &mut self,
        since_year: i16,
        from_scratch: Option<bool>,
    ) -> Result<Flow, RecurrenceError> {
        match self.spec.year {
            YearSpec::Any => {
                self.year = since_year;
                Ok(Flow::Next(self.month_entry(from_scratch.unwrap_or(false))))
            }
            YearSpec::In(year) if year == since_year => {
                self.year = year;
                Ok(Flow::Next(self.month_entry(from_scratch.unwrap_or(false))))
            }
            YearSpec::In(year) if year > since_year => {
                // Jumping forward to the spec year frees every finer field
                // from the reference bound.
                self.year = year;
                Ok(Flow::Next(State::Month {
                    since_index: 0,
                    from_scratch: true,
                }))
            }
            YearSpec::In(year) => {
                trace!("year {year} is behind {since_year}; no future occurrence");
                Ok(Flow::Exhausted)
            }
        }
    }

    fn month_step(&mut self, since_index: i8, from_scratch: bool) -> Result<Flow, RecurrenceError> {
        let months = &self.spec.months;
        if from_scratch {
            match months.next_match(since_index as u8, 12, Scan::Forward) {
                Some((index, _)) => {
                    self.month = index as i8 + 1;
                    Ok(Flow::Next(State::Day {
                        since_index: 0,
                        from_scratch: true,
                    }))
                }
                None if since_index == 0 => Err(RecurrenceError::unsatisfiable(
                    "month",
                    format!("mask {months} matches no month"),
                )),
                None => {
                    // Nothing left this year. If the mask holds any month at
                    // all, the match lies in the next year.
                    if months.next_match(0, 12, Scan::Forward).is_none() {
                        return Err(RecurrenceError::unsatisfiable(
                            "month",
                            format!("mask {months} matches no month"),
                        ));
                    }
                    Ok(Flow::Next(State::Year {
                        since_year: self.year + 1,
                        from_scratch: Some(true),
                    }))
                }
            }
        } else {
            match months.next_match(since_index as u8, 12, Scan::Wrapping) {
                None => Err(RecurrenceError::unsatisfiable(
                    "month",
                    format!("mask {months} matches no month"),
                )),
                Some((index, _)) if (index as i8) < since_index => {
                    // Wrapped past December: the match is in the next year.
                    Ok(Flow::Next(State::Year {
                        since_year: self.year + 1,
                        from_scratch: Some(true),
                    }))
                }
                Some((index, distance)) => {
                    self.month = index as i8 + 1;
                    if distance == 0 {
                        Ok(Flow::Next(self.day_entry(false)))
                    } else {
                        Ok(Flow::Next(State::Day {
                            since_index: 0,
                            from_scratch: true,
                        }))
                    }
                }
            }
        }
    }

    /// The hardest state: up to three independent day selectors compete, and
    /// the nearest one wins. A selector set to `Any` short-circuits and pins
    /// the day in place.
    fn day_step(&mut self, since_index: i8, from_scratch: bool) -> Result<Flow, RecurrenceError> {
        let anchor = Date::new(self.year, self.month, since_index + 1)
            .expect("pinned year-month admits this day index");

        // Minimum distance from `anchor` over the configured selectors;
        // selectors left unset do not participate.
        let mut nearest: Option<i64> = None;

        if let Some(week_days) = &self.spec.week_days {
            match week_days {
                MaskSpec::Any => {
                    self.day = since_index + 1;
                    return Ok(Flow::Next(self.hour_entry(from_scratch)));
                }
                MaskSpec::Only(mask) => {
                    let start = anchor.weekday().to_monday_zero_offset() as u8;
                    let (_, distance) =
                        find_next(*mask, start, 7, Scan::Wrapping).ok_or_else(|| {
                            RecurrenceError::unsatisfiable(
                                "week_day",
                                format!("mask {mask} matches no weekday"),
                            )
                        })?;
                    trace!("weekday candidate at distance {distance} from {anchor}");
                    nearest = fold_min(nearest, distance as i64);
                }
            }
        }

        if let Some(custom) = &self.spec.custom {
            match &custom.days {
                MaskSpec::Any => {
                    self.day = since_index + 1;
                    return Ok(Flow::Next(self.hour_entry(from_scratch)));
                }
                MaskSpec::Only(mask) => {
                    let start = calendar::period_phase(custom.anchor, anchor, custom.period) as u8;
                    let (_, distance) = find_next(*mask, start, custom.period as u8, Scan::Wrapping)
                        .ok_or_else(|| {
                            RecurrenceError::unsatisfiable(
                                "custom_period",
                                format!("mask {mask} matches no cycle day"),
                            )
                        })?;
                    trace!("custom-period candidate at distance {distance} from phase {start}");
                    nearest = fold_min(nearest, distance as i64);
                }
            }
        }

        if let Some(month_days) = &self.spec.month_days {
            match month_days {
                MaskSpec::Any => {
                    self.day = since_index + 1;
                    return Ok(Flow::Next(self.hour_entry(from_scratch)));
                }
                MaskSpec::Only(mask) => {
                    let period = calendar::days_in_month(self.year, self.month - 1);
                    match find_next(*mask, since_index as u8, period as u8, Scan::Wrapping) {
                        Some((_, distance)) => {
                            trace!("month-day candidate at distance {distance} from {anchor}");
                            nearest = fold_min(nearest, distance as i64);
                        }
                        None if period == 31 => {
                            // Every bit already fell inside the scan; the
                            // mask asks for days no month has.
                            return Err(RecurrenceError::unsatisfiable(
                                "month_day",
                                format!("mask {mask} matches no day of any month"),
                            ));
                        }
                        None => {
                            // The month is too short for every requested day;
                            // retry from the first of the next month.
                            let (next_year, next_month) =
                                calendar::first_of_next_month(self.year, self.month);
                            return Ok(Flow::Next(if next_year != self.year {
                                State::Year {
                                    since_year: next_year,
                                    from_scratch: Some(true),
                                }
                            } else {
                                State::Month {
                                    since_index: next_month - 1,
                                    from_scratch: true,
                                }
                            }));
                        }
                    }
                }
            }
        }

        let Some(distance) = nearest else {
            return Err(RecurrenceError::unsatisfiable(
                "day",
                "no day selector is configured",
            ));
        };

        // Apply the winning distance; the date it lands on may spill into a
        // later month or year, in which case the coarser field re-resolves.
        let target = anchor
            .checked_add(Span::new().days(distance))
            .map_err(|_| out_of_range())?;
        if target.year() > self.year {
            Ok(Flow::Next(State::Year {
                since_year: target.year(),
                from_scratch: Some(true),
            }))
        } else if target.month() != self.month {
            Ok(Flow::Next(State::Month {
                since_index: target.month() - 1,
                from_scratch: true,
            }))
        } else {
            self.day = target.day();
            // The winning distance can be zero, leaving the day equal to the
            // reference day; only then does the hour stay bounded by `since`.
            let from_scratch = from_scratch || self.day != self.since.day();
            Ok(Flow::Next(self.hour_entry(from_scratch)))
        }
    }

    fn hour_step(&mut self, since_index: i8, from_scratch: bool) -> Result<Flow, RecurrenceError> {
        let hours = &self.spec.hours;
        if from_scratch {
            match hours.next_match(since_index as u8, 24, Scan::Forward) {
                Some((index, _)) => {
                    self.hour = index as i8;
                    Ok(Flow::Next(State::Minute {
                        since_minute: 0,
                        from_scratch: true,
                    }))
                }
                // From the top of a fresh day a miss means the mask itself is
                // empty, which validation already rejects.
                None if since_index == 0 => Err(RecurrenceError::unsatisfiable(
                    "hour",
                    format!("mask {hours} matches no hour"),
                )),
                // Entered mid-day by a minute carry: the rest of today has no
                // valid hour, so the match is tomorrow.
                None => {
                    let next = Date::new(self.year, self.month, self.day)
                        .expect("pinned date is valid")
                        .tomorrow()
                        .map_err(|_| out_of_range())?;
                    Ok(Flow::Next(self.carry_to(next)))
                }
            }
        } else {
            match hours.next_match(since_index as u8, 24, Scan::Wrapping) {
                None => Err(RecurrenceError::unsatisfiable(
                    "hour",
                    format!("mask {hours} matches no hour"),
                )),
                Some((index, _)) if (index as i8) < since_index => {
                    // Earliest matching hour is tomorrow; the day bump may
                    // spill into the next month or year.
                    let next = Date::new(self.year, self.month, self.day)
                        .expect("pinned date is valid")
                        .tomorrow()
                        .map_err(|_| out_of_range())?;
                    Ok(Flow::Next(self.carry_to(next)))
                }
                Some((index, _)) if (index as i8) == since_index => {
                    self.hour = index as i8;
                    Ok(Flow::Next(State::Minute {
                        since_minute: self.since.minute(),
                        from_scratch: false,
                    }))
                }
                Some((index, _)) => {
                    self.hour = index as i8;
                    Ok(Flow::Next(State::Minute {
                        since_minute: 0,
                        from_scratch: true,
                    }))
                }
            }
        }
    }

    fn minute_step(
        &mut self,
        since_minute: i8,
        from_scratch: bool,
    ) -> Result<Flow, RecurrenceError> {
        let target = match self.spec.minute {
            MinuteSpec::Any => {
                self.minute = since_minute;
                return Ok(Flow::Found);
            }
            MinuteSpec::At(minute) => minute,
        };

        if target >= since_minute || from_scratch {
            self.minute = target;
            return Ok(Flow::Found);
        }

        // The only valid minute already passed within this hour; move to the
        // top of the next hour and re-pin whatever fields it rolls over.
        let pinned = DateTime::new(self.year, self.month, self.day, self.hour, 0, 0, 0)
            .expect("pinned fields form a valid civil datetime");
        let next = pinned
            .checked_add(Span::new().hours(1))
            .map_err(|_| out_of_range())?;
        if next.date() == pinned.date() {
            // Still the same day: only hours after the current one are
            // candidates, so the hour search resumes mid-period. Restarting
            // the day instead could land back on an hour that already
            // passed.
            Ok(Flow::Next(State::Hour {
                since_index: next.hour(),
                from_scratch: true,
            }))
        } else {
            Ok(Flow::Next(self.carry_to(next.date())))
        }
    }

    /// Re-dispatch to the coarsest field that `date` rolled over, always from
    /// scratch.
    fn carry_to(&self, date: Date) -> State {
        if date.year() > self.year {
            State::Year {
                since_year: date.year(),
                from_scratch: Some(true),
            }
        } else if date.month() != self.month {
            State::Month {
                since_index: date.month() - 1,
                from_scratch: true,
            }
        } else {
            State::Day {
                since_index: date.day() - 1,
                from_scratch: true,
            }
        }
    }
}

fn fold_min(current: Option<i64>, candidate: i64) -> Option<i64> {
    Some(match current {
        Some(distance) if distance <= candidate => distance,
        _ => candidate,
    })
}

fn out_of_range() -> RecurrenceError {
    RecurrenceError::unsatisfiable("calendar", "the search left the supported date range")
}

/// Lazy stream of future occurrences, advancing one minute past each hit.
///
/// Each yielded occurrence's `distance_minutes` is measured from the stream's
/// current cursor, not from the original starting instant. The iterator fuses
/// after exhaustion or an error.
pub struct Occurrences<'a> {
    spec: &'a Recurrence,
    cursor: Option<DateTime>,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn new(spec: &'a Recurrence, since: DateTime) -> Self {
        Self {
            spec,
            cursor: Some(since),
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Result<Occurrence, RecurrenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let since = self.cursor?;
        match next_from(self.spec, since) {
            Ok(Some(occurrence)) => {
                self.cursor = occurrence
                    .datetime()
                    .checked_add(Span::new().minutes(1))
                    .ok();
                Some(Ok(occurrence))
            }
            Ok(None) => {
                self.cursor = None;
                None
            }
            Err(err) => {
                self.cursor = None;
                Some(Err(err))
            }
        }
    }
}
