//! End-to-end resolution scenarios: every day-selector combination, carry
//! chains across hour/day/month/year boundaries, short months, leap days,
//! custom periods anchored in the future, and explicit-year exhaustion.

use cronbit::{CustomPeriod, MaskSpec, MinuteSpec, Occurrence, Recurrence, RecurrenceError, YearSpec};
use jiff::civil::{date, datetime, DateTime};

fn next(spec: &Recurrence, since: DateTime) -> Occurrence {
    spec.next_from(since)
        .expect("spec is valid")
        .expect("a future occurrence exists")
}

fn none(spec: &Recurrence, since: DateTime) -> bool {
    spec.next_from(since).expect("spec is valid").is_none()
}

fn occ(year: i16, month: i8, day: i8, hour: i8, minute: i8, distance_minutes: i64) -> Occurrence {
    Occurrence {
        year,
        month,
        day,
        hour,
        minute,
        distance_minutes,
    }
}

/// 06:30, 12:30, 18:30 and 23:30.
const QUARTER_HOURS: &[u8] = &[6, 12, 18, 23];

#[test]
fn hour_minute_with_carries() {
    let spec = Recurrence {
        month_days: Some(MaskSpec::Any),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 20, 20, 0, 0)),
        occ(2025, 1, 5, 23, 30, 190)
    );
    // Minute behind the last slot of the day rolls the day.
    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 410)
    );
    // ... the month ...
    assert_eq!(
        next(&spec, datetime(2025, 1, 31, 23, 40, 0, 0)),
        occ(2025, 2, 1, 6, 30, 410)
    );
    // ... and the year.
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 23, 40, 0, 0)),
        occ(2025, 1, 1, 6, 30, 410)
    );
}

#[test]
fn weekday_selector() {
    // Monday, Wednesday, Friday.
    let spec = Recurrence {
        week_days: Some(MaskSpec::of(&[0, 2, 4])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    // 2025-01-05 is a Sunday.
    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 20, 20, 0, 0)),
        occ(2025, 1, 6, 6, 30, 610)
    );
    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 410)
    );
    // 2025-01-31 is a Friday; the match is next Monday.
    assert_eq!(
        next(&spec, datetime(2025, 1, 31, 23, 40, 0, 0)),
        occ(2025, 2, 3, 6, 30, 3290)
    );
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 23, 40, 0, 0)),
        occ(2025, 1, 1, 6, 30, 410)
    );
    // 2025-02-12 is a Wednesday: same-day hit.
    assert_eq!(
        next(&spec, datetime(2025, 2, 12, 10, 0, 0, 0)),
        occ(2025, 2, 12, 12, 30, 150)
    );
}

#[test]
fn custom_period_selector() {
    // 8-day cycle anchored 2025-02-07, days 0 and 1 of the cycle allowed.
    let spec = Recurrence {
        custom: Some(CustomPeriod {
            days: MaskSpec::of(&[0, 1]),
            period: 8,
            anchor: date(2025, 2, 7),
        }),
        hours: MaskSpec::of(&[6, 16]),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 2, 6, 6, 20, 0, 0)),
        occ(2025, 2, 7, 6, 30, 1450)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 7, 5, 40, 0, 0)),
        occ(2025, 2, 7, 6, 30, 50)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 8, 5, 40, 0, 0)),
        occ(2025, 2, 8, 6, 30, 50)
    );
    // Day 2 of the cycle: wait for the next cycle's day 0.
    assert_eq!(
        next(&spec, datetime(2025, 2, 9, 5, 40, 0, 0)),
        occ(2025, 2, 15, 6, 30, 6 * 24 * 60 + 50)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 6, 0, 0, 0)),
        occ(2025, 3, 3, 6, 30, 24 * 60 * 3 + 30)
    );
    // References before the anchor date still phase correctly.
    assert_eq!(
        next(&spec, datetime(2024, 12, 29, 6, 20, 0, 0)),
        occ(2024, 12, 29, 6, 30, 10)
    );
    assert_eq!(
        next(&spec, datetime(2024, 12, 29, 23, 40, 0, 0)),
        occ(2024, 12, 30, 6, 30, 410)
    );
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 24 * 60 * 5 + 410)
    );
}

#[test]
fn month_day_selector_skips_short_months() {
    // Days 29, 30, 31.
    let spec = Recurrence {
        month_days: Some(MaskSpec::of(&[28, 29, 30])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 29, 6, 30, 24 * 60 * 23 + 410)
    );
    // February 2025 has no day 29: skip to March.
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 40, 0, 0)),
        occ(2025, 3, 29, 6, 30, 24 * 60 * 28 + 410)
    );
    // February 2024 does.
    assert_eq!(
        next(&spec, datetime(2024, 2, 28, 23, 40, 0, 0)),
        occ(2024, 2, 29, 6, 30, 410)
    );
    assert_eq!(
        next(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)),
        occ(2025, 4, 29, 6, 30, 24 * 60 * 28 + 410)
    );
    // April has 30 days.
    assert_eq!(
        next(&spec, datetime(2024, 4, 30, 23, 40, 0, 0)),
        occ(2024, 5, 29, 6, 30, 24 * 60 * 28 + 410)
    );
}

#[test]
fn weekday_and_month_day_take_the_nearest() {
    let spec = Recurrence {
        month_days: Some(MaskSpec::of(&[28, 29, 30])),
        week_days: Some(MaskSpec::of(&[0, 2, 4])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    // Monday wins over day 29.
    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 410)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 40, 0, 0)),
        occ(2025, 3, 3, 6, 30, 24 * 60 * 2 + 410)
    );
    // Leap day 29 wins over next Friday.
    assert_eq!(
        next(&spec, datetime(2024, 2, 28, 23, 40, 0, 0)),
        occ(2024, 2, 29, 6, 30, 410)
    );
    assert_eq!(
        next(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)),
        occ(2025, 4, 2, 6, 30, 24 * 60 + 410)
    );
    assert_eq!(
        next(&spec, datetime(2024, 4, 30, 23, 40, 0, 0)),
        occ(2024, 5, 1, 6, 30, 410)
    );
    // Same-day hit: 2024-12-31 is a Tuesday but day 31 is allowed.
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 11, 40, 0, 0)),
        occ(2024, 12, 31, 12, 30, 50)
    );
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 23, 40, 0, 0)),
        occ(2025, 1, 1, 6, 30, 410)
    );
}

#[test]
fn month_mask_with_month_days_carries_into_next_year() {
    // January and February only, days 29-31.
    let spec = Recurrence {
        months: MaskSpec::of(&[0, 1]),
        month_days: Some(MaskSpec::of(&[28, 29, 30])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 28, 23, 40, 0, 0)),
        occ(2025, 1, 29, 6, 30, 410)
    );
    // No day 29 in Feb 2025 and no allowed month left this year.
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 20, 0, 0)),
        occ(2026, 1, 29, 6, 30, 24 * 60 * 334 + 430)
    );
    assert_eq!(
        next(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)),
        occ(2026, 1, 29, 6, 30, 24 * 60 * 303 + 410)
    );
}

#[test]
fn month_mask_with_weekdays() {
    let spec = Recurrence {
        months: MaskSpec::of(&[0, 1]),
        week_days: Some(MaskSpec::of(&[0, 2, 4])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 410)
    );
    // The last slot of the allowed months is still ahead.
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 20, 0, 0)),
        occ(2025, 2, 28, 23, 30, 10)
    );
    // ... and once past it, the next hit is in January of next year.
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 40, 0, 0)),
        occ(2026, 1, 2, 6, 30, 24 * 60 * 307 + 410)
    );
    assert_eq!(
        next(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)),
        occ(2026, 1, 2, 6, 30, 24 * 60 * 276 + 410)
    );
}

#[test]
fn explicit_year_with_custom_period() {
    let spec = Recurrence {
        year: YearSpec::In(2025),
        custom: Some(CustomPeriod {
            days: MaskSpec::of(&[0, 1]),
            period: 8,
            anchor: date(2025, 2, 7),
        }),
        hours: MaskSpec::of(&[6, 16]),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 2, 6, 6, 20, 0, 0)),
        occ(2025, 2, 7, 6, 30, 1450)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 9, 5, 40, 0, 0)),
        occ(2025, 2, 15, 6, 30, 6 * 24 * 60 + 50)
    );
    // A reference before the spec year searches from that year's start.
    assert_eq!(
        next(&spec, datetime(2024, 12, 29, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 24 * 60 * 7 + 410)
    );
    assert_eq!(
        next(&spec, datetime(2024, 12, 31, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 24 * 60 * 5 + 410)
    );
    // Past the spec year: no future occurrence, not an error.
    assert!(none(&spec, datetime(2026, 1, 2, 6, 20, 0, 0)));
}

#[test]
fn explicit_year_exhausts_after_the_last_in_year_match() {
    let spec = Recurrence {
        year: YearSpec::In(2025),
        months: MaskSpec::of(&[0, 1]),
        week_days: Some(MaskSpec::of(&[0, 2, 4])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 5, 23, 40, 0, 0)),
        occ(2025, 1, 6, 6, 30, 410)
    );
    assert_eq!(
        next(&spec, datetime(2025, 2, 28, 23, 20, 0, 0)),
        occ(2025, 2, 28, 23, 30, 10)
    );
    assert!(none(&spec, datetime(2025, 2, 28, 23, 40, 0, 0)));
    assert!(none(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)));
}

#[test]
fn explicit_year_with_month_days_exhausts_on_short_february() {
    let spec = Recurrence {
        year: YearSpec::In(2025),
        months: MaskSpec::of(&[0, 1]),
        month_days: Some(MaskSpec::of(&[28, 29, 30])),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    assert_eq!(
        next(&spec, datetime(2025, 1, 28, 23, 40, 0, 0)),
        occ(2025, 1, 29, 6, 30, 410)
    );
    assert!(none(&spec, datetime(2025, 2, 28, 23, 20, 0, 0)));
    assert!(none(&spec, datetime(2025, 3, 31, 23, 40, 0, 0)));
}

#[test]
fn resolving_from_a_result_plus_one_minute_moves_strictly_forward() {
    let spec = Recurrence {
        month_days: Some(MaskSpec::Any),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    let mut since = datetime(2025, 1, 5, 20, 20, 0, 0);
    let mut previous: Option<DateTime> = None;
    for _ in 0..10 {
        let hit = next(&spec, since);
        let instant = hit.datetime();
        if let Some(previous) = previous {
            assert!(instant > previous, "{instant} not after {previous}");
        }
        previous = Some(instant);
        since = instant.checked_add(jiff::Span::new().minutes(1)).unwrap();
    }
}

#[test]
fn next_n_from_collects_successive_hits() {
    let spec = Recurrence {
        month_days: Some(MaskSpec::Any),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    let hits = spec
        .next_n_from(datetime(2025, 1, 5, 20, 20, 0, 0), 4)
        .unwrap();
    let instants: Vec<DateTime> = hits.iter().map(|h| h.datetime()).collect();
    assert_eq!(
        instants,
        vec![
            datetime(2025, 1, 5, 23, 30, 0, 0),
            datetime(2025, 1, 6, 6, 30, 0, 0),
            datetime(2025, 1, 6, 12, 30, 0, 0),
            datetime(2025, 1, 6, 18, 30, 0, 0),
        ]
    );
}

#[test]
fn carry_past_the_civil_date_range_is_unsatisfiable() {
    // The minute carry from the last valid hour of 9999-12-31 steps past
    // jiff's maximum civil date; that surfaces as an error, not a panic.
    let spec = Recurrence {
        month_days: Some(MaskSpec::Any),
        hours: MaskSpec::of(&[23]),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    let err = spec
        .next_from(datetime(9999, 12, 31, 23, 40, 0, 0))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::Unsatisfiable { .. }));
    assert_eq!(err.field(), "calendar");

    // One field short of the boundary still resolves normally.
    assert_eq!(
        next(&spec, datetime(9999, 12, 31, 23, 20, 0, 0)),
        occ(9999, 12, 31, 23, 30, 10)
    );
}

#[cfg(feature = "serde")]
#[test]
fn recurrence_round_trips_through_json() {
    let spec = Recurrence {
        year: YearSpec::In(2025),
        months: MaskSpec::of(&[0, 1]),
        week_days: Some(MaskSpec::of(&[0, 2, 4])),
        custom: Some(CustomPeriod {
            days: MaskSpec::of(&[0, 1]),
            period: 8,
            anchor: date(2025, 2, 7),
        }),
        hours: MaskSpec::of(QUARTER_HOURS),
        minute: MinuteSpec::At(30),
        ..Recurrence::default()
    };

    let json = serde_json::to_string(&spec).unwrap();
    let back: Recurrence = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}
