//! Home stays between trips and inclusive day counting.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::TripGroup;

/// Number of calendar days in `start..=end`. A same-day span counts as one
/// day; an inverted span yields zero or less.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: i64,
}

/// Home stay following a trip.
///
/// When the next trip begins before this window opens, both dates are `None`
/// and `duration_days` keeps the raw, non-positive day count.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeSpan {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub duration_days: i64,
}

impl HomeSpan {
    fn between(start: NaiveDate, end: NaiveDate) -> Self {
        let duration_days = inclusive_days(start, end);
        if end < start {
            return Self {
                start: None,
                end: None,
                duration_days,
            };
        }
        Self {
            start: Some(start),
            end: Some(end),
            duration_days,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalRow {
    pub trip: TripSpan,
    pub home: HomeSpan,
}

/// One row per trip: the trip itself and the home stay up to the next trip,
/// or up to `as_of` for the last trip.
pub fn build_rows(groups: &[TripGroup], as_of: NaiveDate) -> Vec<IntervalRow> {
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let home_start = day_after(group.end);
            let home_end = match groups.get(idx + 1) {
                Some(next) => day_before(next.start),
                None => as_of,
            };
            IntervalRow {
                trip: TripSpan {
                    start: group.start,
                    end: group.end,
                    duration_days: inclusive_days(group.start, group.end),
                },
                home: HomeSpan::between(home_start, home_end),
            }
        })
        .collect()
}

// Saturates at the NaiveDate range limits.
fn day_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

fn day_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}
