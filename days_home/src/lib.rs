//! Core trip/home interval computation for a history of overnight stays.
//!
//! Stays are normalized into dated intervals, merged into trips, and the
//! gaps between trips become home stays. Everything downstream (analytics,
//! chart layout, console text) reads the resulting [`IntervalRow`] sequence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod analytics;
pub mod chart;
pub mod grouping;
pub mod records;
pub mod report;
pub mod rows;

pub use analytics::{
    longest_home, longest_trip, most_recent_comparable_home, ranked_home_stays,
    top_home_stays_until_current,
};
pub use chart::{layout_chart, BoxKind, ChartDocument, ChartStyle, DayBox, HexColor};
pub use grouping::{group_trips, TripGroup};
pub use records::{normalize_stays, parse_records, RawStay, StayInterval};
pub use rows::{build_rows, inclusive_days, HomeSpan, IntervalRow, TripSpan};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StaysError {
    #[error("failed to read stay records: {0}")]
    RecordSource(String),
    #[error("malformed record {record}: invalid {field} '{value}'")]
    MalformedRecord {
        record: usize,
        field: &'static str,
        value: String,
    },
    #[error("stay interval ends before it starts ({start} > {end})")]
    InvertedInterval { start: NaiveDate, end: NaiveDate },
    #[error("no stays available to analyse")]
    EmptyInput,
    #[error("no earlier home stay is at least as long as the current one")]
    NoComparableStay,
    #[error("invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Params {
    /// Largest gap in days between one stay's checkout and the next stay's
    /// arrival that still counts as the same trip.
    pub merge_range_days: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            merge_range_days: 1,
        }
    }
}

/// Trips and interval rows computed for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StayHistory {
    pub as_of: NaiveDate,
    pub groups: Vec<TripGroup>,
    pub rows: Vec<IntervalRow>,
}

/// Group normalized stays into trips and derive the home stays between them.
///
/// `as_of` bounds the final home stay; callers wanting "today" must supply it.
pub fn build_history(
    stays: &[StayInterval],
    params: &Params,
    as_of: NaiveDate,
) -> Result<StayHistory, StaysError> {
    if stays.is_empty() {
        return Err(StaysError::EmptyInput);
    }

    let groups = group_trips(stays, params.merge_range_days);
    let rows = build_rows(&groups, as_of);
    debug!(
        stays = stays.len(),
        trips = groups.len(),
        %as_of,
        "built stay history"
    );

    Ok(StayHistory {
        as_of,
        groups,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = build_history(&[], &Params::default(), date("2024-01-10")).unwrap_err();
        assert_eq!(err, StaysError::EmptyInput);
    }

    #[test]
    fn single_stay_history() {
        let raw = vec![RawStay::new("X", "2", "2024-01-05")];
        let stays = normalize_stays(&raw).unwrap();
        let history = build_history(&stays, &Params::default(), date("2024-01-10")).unwrap();

        assert_eq!(history.groups.len(), 1);
        assert_eq!(history.rows.len(), 1);
        let row = &history.rows[0];
        assert_eq!(row.trip.start, date("2024-01-03"));
        assert_eq!(row.trip.end, date("2024-01-05"));
        assert_eq!(row.trip.duration_days, 3);
        assert_eq!(row.home.start, Some(date("2024-01-06")));
        assert_eq!(row.home.end, Some(date("2024-01-10")));
        assert_eq!(row.home.duration_days, 5);
    }

    #[test]
    fn history_serializes_to_json() {
        let raw = vec![RawStay::new("Oslo", "1", "2024-03-02")];
        let stays = normalize_stays(&raw).unwrap();
        let history = build_history(&stays, &Params::default(), date("2024-03-04")).unwrap();
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["as_of"], "2024-03-04");
        assert_eq!(json["groups"][0]["cities"][0], "Oslo");
        assert_eq!(json["rows"][0]["home"]["duration_days"], 2);
    }
}
