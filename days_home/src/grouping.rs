//! Merging of adjacent stays into trips.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::StayInterval;

/// Consecutive stays separated by at most the merge range.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripGroup {
    /// Cities in visiting order. A city is only repeated when another city
    /// was visited in between.
    pub cities: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TripGroup {
    fn open(stay: &StayInterval) -> Self {
        Self {
            cities: vec![stay.city.clone()],
            start: stay.start,
            end: stay.end,
        }
    }

    fn absorb(&mut self, stay: &StayInterval) {
        if self.cities.last() != Some(&stay.city) {
            self.cities.push(stay.city.clone());
        }
        self.end = stay.end;
    }
}

/// Fold stays (sorted by start) into trips.
///
/// A stay joins the previous trip when it starts no more than
/// `merge_range_days` after that trip ends. Overlapping stays are not
/// reconciled: the trip end simply moves to the latest absorbed stay's end.
pub fn group_trips(stays: &[StayInterval], merge_range_days: u32) -> Vec<TripGroup> {
    let merge_range = i64::from(merge_range_days);
    let mut groups: Vec<TripGroup> = Vec::new();

    for stay in stays {
        if let Some(last) = groups.last_mut() {
            if (stay.start - last.end).num_days() <= merge_range {
                last.absorb(stay);
                continue;
            }
        }
        groups.push(TripGroup::open(stay));
    }
    groups
}
